//! Decision Builder (§4.5): the state machine that turns one reduced
//! [`History`] into the decisions for a single decision task.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::condition;
use crate::dag::TaskGraph;
use crate::decision::Decision;
use crate::error::{BuilderError, DeciderError};
use crate::history::History;
use crate::input::{self, Results};
use crate::swf::types::{DecisionFailureCause, EventType, TimeoutType};

fn as_results(map: &HashMap<String, Value>) -> Results<'_> {
    map.iter().map(|(k, v)| (k.clone(), v)).collect()
}

/// Walk a just-completed (or just-skipped) task's dependants and add any
/// whose every dependency is now complete to `ready`, unless it has already
/// been scheduled in an earlier pass (§4.5 step 6).
fn consider_dependants(
    task_id: &str,
    graph: &TaskGraph,
    history: &History,
    logically_completed: &HashMap<String, Value>,
    ready: &mut Vec<String>,
    ready_set: &mut HashSet<String>,
) {
    for dependant in graph.dependants_of(task_id) {
        if history.is_scheduled(dependant) || ready_set.contains(dependant) {
            continue;
        }
        let task = match graph.task(dependant) {
            Some(t) => t,
            None => continue,
        };
        let deps_met = task.dependencies.iter().all(|d| logically_completed.contains_key(d));
        if deps_met {
            ready.push(dependant.clone());
            ready_set.insert(dependant.clone());
        }
    }
}

/// Build the decisions for one decision task (§4.5). `identity` is this
/// decider's own identity, used to tell whether an `OPERATION_NOT_PERMITTED`
/// rejection is this decider's own mistake or another decider's problem.
pub fn build(
    graph: &TaskGraph,
    history: &History,
    identity: &str,
) -> Result<Vec<Decision>, BuilderError> {
    // Step 1: cancellation always wins.
    if history.cancel_requested() {
        return Ok(vec![Decision::cancel_workflow_execution(None)]);
    }

    let new_failures: Vec<_> = history
        .new_events()
        .iter()
        .copied()
        .filter(|e| e.decision_failed_attrs().is_some())
        .collect();

    // Step 2: a rejection caused by this decider's own permissions is fatal.
    for event in &new_failures {
        let attrs = event.decision_failed_attrs().unwrap();
        if attrs.cause != DecisionFailureCause::OperationNotPermitted {
            continue;
        }
        if let Some(offender) =
            history.decider_identity_for_decision(attrs.decision_task_completed_event_id)
        {
            if offender == identity {
                return Err(BuilderError::Decider(DeciderError::PermissionDenied {
                    identity: identity.to_string(),
                }));
            }
        }
    }

    // Step 3: rescue rejected cancel/complete decisions.
    let rescue_cancel = new_failures.iter().any(|e| {
        e.event_type == EventType::CancelWorkflowExecutionFailed
            && e.decision_failed_attrs().unwrap().cause == DecisionFailureCause::UnhandledDecision
    });
    if rescue_cancel {
        return Ok(vec![Decision::cancel_workflow_execution(None)]);
    }

    let rescue_complete = new_failures.iter().any(|e| {
        e.event_type == EventType::CompleteWorkflowExecutionFailed
            && e.decision_failed_attrs().unwrap().cause == DecisionFailureCause::UnhandledDecision
    });

    let completed = completed_results(graph, history)?;

    // Step 4: fail the workflow on accumulated errors from this pass. A
    // rescued complete takes precedence — it recomputes completion via step
    // 7 below instead, rather than racing the same rejected pass's own
    // failure events.
    if !rescue_complete {
        if let Some(decision) = fail_on_accumulated_errors(history) {
            return Ok(vec![decision]);
        }
    }

    let workflow_input: Value = history
        .workflow_input()
        .map(|s| serde_json::from_str(s))
        .transpose()
        .map_err(|e: serde_json::Error| {
            BuilderError::Decider(DeciderError::MalformedHistory(format!(
                "workflow input is not valid JSON: {e}"
            )))
        })?
        .unwrap_or(Value::Null);

    let mut ready: Vec<String> = Vec::new();
    let mut ready_set: HashSet<String> = HashSet::new();

    // Step 5: first decision task of the execution schedules the roots.
    let is_first_pass = history
        .new_events()
        .iter()
        .any(|e| e.event_type == EventType::WorkflowExecutionStarted);
    if is_first_pass {
        for root in graph.roots() {
            if ready_set.insert(root.clone()) {
                ready.push(root.clone());
            }
        }
    }

    // Step 6: a completion unlocks its dependants.
    let mut logically_completed = completed.clone();
    for event in history.new_events() {
        if event.event_type != EventType::ActivityTaskCompleted {
            continue;
        }
        let scheduled_id = event.activity_task_completed.as_ref().unwrap().scheduled_event_id;
        let Some(task_id) = history.scheduled_activity_id(scheduled_id) else {
            continue;
        };
        consider_dependants(task_id, graph, history, &logically_completed, &mut ready, &mut ready_set);
    }

    // Step 8 (skip_if resolution): expand the ready set through any
    // skip_if-true tasks before deciding whether the workflow is complete.
    let mut to_schedule: Vec<String> = Vec::new();
    let mut processed: HashSet<String> = HashSet::new();
    loop {
        ready.sort_by_key(|id| graph.declaration_index(id).unwrap_or(usize::MAX));
        let Some(next) = ready.iter().find(|id| !processed.contains(*id)).cloned() else {
            break;
        };
        processed.insert(next.clone());

        let task = match graph.task(&next) {
            Some(t) => t,
            None => continue,
        };
        let skip = match &task.skip_if {
            Some(cond) => condition::evaluate(cond, &workflow_input, &as_results(&logically_completed))?,
            None => false,
        };
        if skip {
            logically_completed.insert(next.clone(), Value::Null);
            consider_dependants(&next, graph, history, &logically_completed, &mut ready, &mut ready_set);
        } else {
            to_schedule.push(next);
        }
    }

    // Step 7: workflow completion, checked after all skip_if cascades settle.
    let all_complete = graph.tasks.iter().all(|t| logically_completed.contains_key(&t.id));
    if all_complete {
        return Ok(vec![complete_decision(graph, &completed)]);
    }

    // Step 8: schedule whatever is left, in declaration order.
    to_schedule.sort_by_key(|id| graph.declaration_index(id).unwrap_or(usize::MAX));
    let mut decisions = Vec::with_capacity(to_schedule.len());
    for id in to_schedule {
        let task = graph.task(&id).expect("ready task must exist in graph");
        let input_value = match &task.input {
            Some(spec) => input::build(spec, &workflow_input, &as_results(&completed))?,
            None => None,
        };
        let input_json = input_value.map(|v| v.to_string());
        decisions.push(Decision::schedule_activity_task(
            &id,
            task.activity_type.clone(),
            input_json,
            task.task_list.clone(),
            task.priority,
            task.heartbeat,
            task.timeout,
        ));
    }
    Ok(decisions)
}

/// Parsed results of every task that has actually completed, anywhere in
/// the history (not just this pass). A task with an empty/absent result
/// string is recorded as `Value::Null`.
fn completed_results(
    graph: &TaskGraph,
    history: &History,
) -> Result<HashMap<String, Value>, BuilderError> {
    let mut completed = HashMap::new();
    for task in &graph.tasks {
        for event in history.task_events(&task.id) {
            if event.event_type != EventType::ActivityTaskCompleted {
                continue;
            }
            let raw = event.activity_task_completed.as_ref().and_then(|a| a.result.as_deref());
            let value = match raw {
                Some(s) if !s.is_empty() => serde_json::from_str(s).map_err(|e| {
                    BuilderError::Decider(DeciderError::MalformedHistory(format!(
                        "task `{}` produced a result that is not valid JSON: {e}",
                        task.id
                    )))
                })?,
                _ => Value::Null,
            };
            completed.insert(task.id.clone(), value);
        }
    }
    Ok(completed)
}

fn complete_decision(graph: &TaskGraph, completed: &HashMap<String, Value>) -> Decision {
    let mut result_map = serde_json::Map::new();
    for task in &graph.tasks {
        if let Some(value) = completed.get(&task.id) {
            if !value.is_null() {
                result_map.insert(task.id.clone(), value.clone());
            }
        }
    }
    let result = if result_map.is_empty() {
        None
    } else {
        Some(Value::Object(result_map).to_string())
    };
    Decision::complete_workflow_execution(result)
}

/// Step 4: classify every event in this pass per §4.6 and, if any fall into
/// the failing classes, build the `FailWorkflowExecution` decision.
fn fail_on_accumulated_errors(history: &History) -> Option<Decision> {
    let mut activities = 0u32;
    let mut decisions = 0u32;
    let mut timeouts = 0u32;
    let mut other = 0u32;

    for event in history.new_events() {
        match event.event_type {
            EventType::ActivityTaskFailed => activities += 1,
            EventType::ActivityTaskTimedOut => {
                match event.activity_task_timed_out.as_ref().map(|a| a.timeout_type) {
                    Some(TimeoutType::StartToClose) | Some(TimeoutType::Heartbeat) => {
                        activities += 1
                    }
                    Some(TimeoutType::ScheduleToStart) | Some(TimeoutType::ScheduleToClose) => {
                        timeouts += 1
                    }
                    None => {}
                }
            }
            EventType::DecisionTaskTimedOut | EventType::WorkflowExecutionTimedOut => {
                timeouts += 1
            }
            EventType::RecordMarkerFailed => other += 1,
            EventType::ScheduleActivityTaskFailed
            | EventType::RequestCancelActivityTaskFailed
            | EventType::StartTimerFailed
            | EventType::CancelTimerFailed
            | EventType::StartChildWorkflowExecutionFailed
            | EventType::SignalExternalWorkflowExecutionFailed
            | EventType::RequestCancelExternalWorkflowExecutionFailed
            | EventType::CancelWorkflowExecutionFailed
            | EventType::CompleteWorkflowExecutionFailed
            | EventType::ContinueAsNewWorkflowExecutionFailed
            | EventType::FailWorkflowExecutionFailed => decisions += 1,
            _ => {}
        }
    }

    if activities + decisions + timeouts + other == 0 {
        return None;
    }

    let mut parts = Vec::new();
    if activities > 0 {
        parts.push(format!("{activities} activities failed"));
    }
    if decisions > 0 {
        parts.push(format!("{decisions} decisions failed"));
    }
    if timeouts > 0 {
        parts.push(format!("{timeouts} actions timed-out"));
    }
    if other > 0 {
        parts.push(format!("{other} other actions failed"));
    }

    Some(Decision::fail_workflow_execution(
        "accumulatedErrors".to_string(),
        Some(parts.join(", ")),
    ))
}
