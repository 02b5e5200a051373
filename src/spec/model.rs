//! DAG workflow data model (§3, §6).
//!
//! These types mirror the wire schema of a workflow-specification document
//! almost exactly via `serde`; the one departure is that [`Workflow`]
//! carries a precomputed [`crate::dag::TaskGraph`] once loaded, rather than
//! re-deriving dependants/roots on every decision pass.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `heartbeat`/`timeout` field: either a number of seconds, or the
/// literal string `"NONE"` (no timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutSpec {
    Seconds(u64),
    None,
}

impl TimeoutSpec {
    /// Render as the decimal string the SWF wire format expects, or `None`
    /// if this is the `"NONE"` literal (meaning: omit the field).
    pub fn as_wire_string(&self) -> Option<String> {
        match self {
            TimeoutSpec::Seconds(s) => Some(s.to_string()),
            TimeoutSpec::None => None,
        }
    }
}

impl Serialize for TimeoutSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            TimeoutSpec::Seconds(s) => serializer.serialize_u64(*s),
            TimeoutSpec::None => serializer.serialize_str("NONE"),
        }
    }
}

impl<'de> Deserialize<'de> for TimeoutSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(TimeoutSpec::Seconds(n)),
            Wire::Text(s) if s == "NONE" => Ok(TimeoutSpec::None),
            Wire::Text(s) => Err(serde::de::Error::custom(format!(
                "expected an integer or the literal \"NONE\", got \"{s}\""
            ))),
        }
    }
}

/// An activity or workflow type identity on the service side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId {
    pub name: String,
    pub version: String,
}

/// A `TaskInput` tree (§3, §6): describes how to materialize one activity's
/// input (or one operand of a `Condition`) from the workflow's input and
/// already-completed upstream results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TaskInput {
    /// Omit the `input` attribute entirely.
    None,

    /// A literal JSON value, used verbatim.
    Constant { value: Value },

    /// Read from the execution's parsed input.
    #[serde(rename = "workflow-input")]
    WorkflowInput {
        #[serde(default = "default_root_path")]
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },

    /// Read from an upstream task's parsed result.
    #[serde(rename = "dependency-result")]
    DependencyResult {
        id: String,
        #[serde(default = "default_root_path")]
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },

    /// Recursively compose a JSON object from named sub-expressions.
    Object { items: BTreeMap<String, TaskInput> },
}

fn default_root_path() -> String {
    "$".to_string()
}

/// A `Condition` tree (§3, §6): evaluated at scheduling time against
/// already-completed dependency results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    #[serde(rename = "=")]
    Eq { lhs: TaskInput, rhs: TaskInput },
    #[serde(rename = "!=")]
    Ne { lhs: TaskInput, rhs: TaskInput },
    #[serde(rename = "<")]
    Lt { lhs: TaskInput, rhs: TaskInput },
    #[serde(rename = "<=")]
    Le { lhs: TaskInput, rhs: TaskInput },
    #[serde(rename = "in")]
    In { lhs: TaskInput, rhs: TaskInput },
    #[serde(rename = "and")]
    And {
        lhs: Box<Condition>,
        rhs: Box<Condition>,
    },
    #[serde(rename = "or")]
    Or {
        lhs: Box<Condition>,
        rhs: Box<Condition>,
    },
    #[serde(rename = "not")]
    Not { value: Box<Condition> },
}

/// A single DAG node (§3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    #[serde(rename = "type")]
    pub activity_type: TypeId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<TaskInput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<TimeoutSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_list: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default)]
    pub dependencies: HashSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_if: Option<Condition>,
}

/// A loaded, still-unvalidated DAG workflow (§3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWorkflow {
    pub spec_type: String,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<Value>,
    pub tasks: Vec<Task>,
}

/// The outer document loaded from a spec file (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecDocument {
    pub version: String,
    pub workflows: Vec<RawWorkflow>,
}
