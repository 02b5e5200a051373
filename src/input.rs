//! Input Builder (§4.2): materializes a [`TaskInput`] tree into a JSON value
//! or "no value", given the workflow's parsed input and the parsed results
//! of already-completed upstream tasks.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::InputError;
use crate::path;
use crate::spec::model::TaskInput;

/// Upstream results available to the Input Builder, keyed by task id.
pub type Results<'a> = HashMap<String, &'a Value>;

/// Materialize `input` into a JSON value, or `None` ("no value") if it
/// resolves to nothing. Object entries that resolve to "no value" are
/// omitted from the produced object, never nulled (§4.2).
pub fn build(
    input: &TaskInput,
    workflow_input: &Value,
    results: &Results,
) -> Result<Option<Value>, InputError> {
    match input {
        TaskInput::None => Ok(None),

        TaskInput::Constant { value } => Ok(Some(value.clone())),

        TaskInput::WorkflowInput { path: p, default } => {
            Ok(path::resolve(p, workflow_input, default.as_ref())?)
        }

        TaskInput::DependencyResult { id, path: p, default } => {
            let result = results
                .get(id)
                .ok_or_else(|| InputError::MissingDependency(id.clone()))?;
            Ok(path::resolve(p, result, default.as_ref())?)
        }

        TaskInput::Object { items } => {
            let mut obj = serde_json::Map::with_capacity(items.len());
            for (key, sub) in items {
                if let Some(value) = build(sub, workflow_input, results)? {
                    obj.insert(key.clone(), value);
                }
            }
            Ok(Some(Value::Object(obj)))
        }
    }
}
