//! DAG Model (§3): a validated, immutable graph built from a [`RawWorkflow`],
//! with dependants and roots precomputed once at load time.

use std::collections::HashMap;

use crate::error::SpecError;
use crate::spec::model::{RawWorkflow, Task};

/// Task ids that must never appear in a task id (§3).
const FORBIDDEN_SUBSTRINGS: &[&str] = &[":", "/", "|", "arn"];

fn validate_task_id(workflow: &str, id: &str) -> Result<(), SpecError> {
    if id.is_empty() {
        return Err(SpecError::InvalidTaskId {
            workflow: workflow.to_string(),
            task_id: id.to_string(),
            reason: "task id must not be empty",
        });
    }
    if id.chars().any(|c| c.is_control()) {
        return Err(SpecError::InvalidTaskId {
            workflow: workflow.to_string(),
            task_id: id.to_string(),
            reason: "task id must not contain control characters",
        });
    }
    for needle in FORBIDDEN_SUBSTRINGS {
        if id.contains(needle) {
            return Err(SpecError::InvalidTaskId {
                workflow: workflow.to_string(),
                task_id: id.to_string(),
                reason: "task id must not contain `:`, `/`, `|`, or the substring `arn`",
            });
        }
    }
    Ok(())
}

/// The dependants-index key (§3): either a specific task id, or the
/// synthetic `Root` bucket collecting every task with no dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependantsKey {
    Root,
    Task(String),
}

/// A validated DAG workflow: tasks keyed by id, in declaration order, plus
/// a precomputed dependants index.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    /// Tasks in declaration order — ordering ties throughout the Decision
    /// Builder break on this order (§4.5).
    pub tasks: Vec<Task>,
    tasks_by_id: HashMap<String, usize>,
    dependants: HashMap<DependantsKey, Vec<String>>,
}

impl TaskGraph {
    /// Build and validate a `TaskGraph` from a raw, deserialized workflow.
    /// Checks: unique ids, legal id characters, dependencies exist, no
    /// self-loops, and the graph is acyclic.
    pub fn build(raw: RawWorkflow) -> Result<Self, SpecError> {
        if raw.spec_type != "dag" {
            return Err(SpecError::UnknownSpecType(raw.spec_type));
        }

        let mut tasks_by_id = HashMap::with_capacity(raw.tasks.len());
        for (idx, task) in raw.tasks.iter().enumerate() {
            validate_task_id(&raw.name, &task.id)?;
            if tasks_by_id.insert(task.id.clone(), idx).is_some() {
                return Err(SpecError::DuplicateTaskId {
                    workflow: raw.name.clone(),
                    task_id: task.id.clone(),
                });
            }
        }

        for task in &raw.tasks {
            for dep in &task.dependencies {
                if dep == &task.id {
                    return Err(SpecError::SelfDependency {
                        workflow: raw.name.clone(),
                        task_id: task.id.clone(),
                    });
                }
                if !tasks_by_id.contains_key(dep) {
                    return Err(SpecError::UnknownDependency {
                        workflow: raw.name.clone(),
                        task_id: task.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        detect_cycle(&raw)?;

        let mut dependants: HashMap<DependantsKey, Vec<String>> = HashMap::new();
        for task in &raw.tasks {
            let key = if task.dependencies.is_empty() {
                DependantsKey::Root
            } else {
                // A task with dependencies is registered as a dependant of
                // each of its upstream tasks below; it is never itself a
                // member of the Root bucket.
                continue;
            };
            dependants.entry(key).or_default().push(task.id.clone());
        }
        for task in &raw.tasks {
            for dep in &task.dependencies {
                dependants
                    .entry(DependantsKey::Task(dep.clone()))
                    .or_default()
                    .push(task.id.clone());
            }
        }
        // Declaration order within each dependants bucket, regardless of
        // insertion order above.
        for ids in dependants.values_mut() {
            ids.sort_by_key(|id| tasks_by_id[id]);
        }

        Ok(TaskGraph {
            name: raw.name,
            version: raw.version,
            description: raw.description,
            tasks: raw.tasks,
            tasks_by_id,
            dependants,
        })
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks_by_id.get(id).map(|&idx| &self.tasks[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks_by_id.contains_key(id)
    }

    /// Root tasks (no dependencies), in declaration order.
    pub fn roots(&self) -> &[String] {
        self.dependants
            .get(&DependantsKey::Root)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dependants of `task_id`, in declaration order.
    pub fn dependants_of(&self, task_id: &str) -> &[String] {
        self.dependants
            .get(&DependantsKey::Task(task_id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Declaration-order index of a task id, used to sort ready-sets.
    pub fn declaration_index(&self, task_id: &str) -> Option<usize> {
        self.tasks_by_id.get(task_id).copied()
    }
}

fn detect_cycle(raw: &RawWorkflow) -> Result<(), SpecError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let by_id: HashMap<&str, &Task> = raw.tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut marks: HashMap<&str, Mark> =
        raw.tasks.iter().map(|t| (t.id.as_str(), Mark::Unvisited)).collect();

    fn visit<'a>(
        id: &'a str,
        by_id: &HashMap<&'a str, &'a Task>,
        marks: &mut HashMap<&'a str, Mark>,
        workflow: &str,
    ) -> Result<(), SpecError> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(SpecError::Cycle {
                    workflow: workflow.to_string(),
                    task_id: id.to_string(),
                })
            }
            _ => {}
        }
        marks.insert(id, Mark::InProgress);
        if let Some(task) = by_id.get(id) {
            for dep in &task.dependencies {
                visit(dep, by_id, marks, workflow)?;
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    for task in &raw.tasks {
        visit(&task.id, &by_id, &mut marks, &raw.name)?;
    }
    Ok(())
}
