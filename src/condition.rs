//! Condition Evaluator (§4.3): evaluates a [`Condition`] tree at scheduling
//! time, used for `skip_if`.

use serde_json::Value;

use crate::error::ConditionError;
use crate::input::{self, Results};
use crate::spec::model::{Condition, TaskInput};

/// An operand that resolved to "no value" behaves as JSON `null` for
/// comparison purposes — this keeps evaluation total without introducing a
/// third truth value. (Open question, resolved in DESIGN.md.)
fn resolve_operand(
    operand: &TaskInput,
    workflow_input: &Value,
    results: &Results,
) -> Result<Value, ConditionError> {
    Ok(input::build(operand, workflow_input, results)?.unwrap_or(Value::Null))
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn compare_ordered(op: &'static str, lhs: &Value, rhs: &Value) -> Result<bool, ConditionError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            Ok(match op {
                "<" => a < b,
                "<=" => a <= b,
                _ => unreachable!(),
            })
        }
        (Value::String(a), Value::String(b)) => Ok(match op {
            "<" => a < b,
            "<=" => a <= b,
            _ => unreachable!(),
        }),
        _ => Err(ConditionError::TypeMismatch {
            op,
            lhs: type_name(lhs),
            rhs: type_name(rhs),
        }),
    }
}

fn membership(lhs: &Value, rhs: &Value) -> bool {
    match rhs {
        Value::Array(items) => items.contains(lhs),
        Value::Object(map) => match lhs {
            Value::String(key) => map.contains_key(key),
            _ => false,
        },
        Value::String(haystack) => match lhs {
            Value::String(needle) => haystack.contains(needle.as_str()),
            _ => false,
        },
        _ => false,
    }
}

/// Evaluate `condition` against the workflow's parsed input and the parsed
/// results of already-completed dependencies.
pub fn evaluate(
    condition: &Condition,
    workflow_input: &Value,
    results: &Results,
) -> Result<bool, ConditionError> {
    match condition {
        Condition::Eq { lhs, rhs } => {
            let (l, r) = (
                resolve_operand(lhs, workflow_input, results)?,
                resolve_operand(rhs, workflow_input, results)?,
            );
            Ok(l == r)
        }
        Condition::Ne { lhs, rhs } => {
            let (l, r) = (
                resolve_operand(lhs, workflow_input, results)?,
                resolve_operand(rhs, workflow_input, results)?,
            );
            Ok(l != r)
        }
        Condition::Lt { lhs, rhs } => {
            let (l, r) = (
                resolve_operand(lhs, workflow_input, results)?,
                resolve_operand(rhs, workflow_input, results)?,
            );
            Ok(compare_ordered("<", &l, &r)?)
        }
        Condition::Le { lhs, rhs } => {
            let (l, r) = (
                resolve_operand(lhs, workflow_input, results)?,
                resolve_operand(rhs, workflow_input, results)?,
            );
            Ok(compare_ordered("<=", &l, &r)?)
        }
        Condition::In { lhs, rhs } => {
            let (l, r) = (
                resolve_operand(lhs, workflow_input, results)?,
                resolve_operand(rhs, workflow_input, results)?,
            );
            Ok(membership(&l, &r))
        }
        Condition::And { lhs, rhs } => {
            let l = evaluate(lhs, workflow_input, results)?;
            let r = evaluate(rhs, workflow_input, results)?;
            Ok(l && r)
        }
        Condition::Or { lhs, rhs } => {
            let l = evaluate(lhs, workflow_input, results)?;
            let r = evaluate(rhs, workflow_input, results)?;
            Ok(l || r)
        }
        Condition::Not { value } => Ok(!evaluate(value, workflow_input, results)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constant(v: Value) -> TaskInput {
        TaskInput::Constant { value: v }
    }

    fn empty_results<'a>() -> Results<'a> {
        Results::new()
    }

    #[test]
    fn eq_structural_equality() {
        let cond = Condition::Eq {
            lhs: constant(json!({"a": 1})),
            rhs: constant(json!({"a": 1})),
        };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn lt_numeric() {
        let cond = Condition::Lt { lhs: constant(json!(1)), rhs: constant(json!(2)) };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn lt_lexicographic_strings() {
        let cond = Condition::Lt {
            lhs: constant(json!("apple")),
            rhs: constant(json!("banana")),
        };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn lt_type_mismatch_errors() {
        let cond = Condition::Lt { lhs: constant(json!(1)), rhs: constant(json!("a")) };
        let err = evaluate(&cond, &Value::Null, &empty_results()).unwrap_err();
        assert!(matches!(err, ConditionError::TypeMismatch { .. }));
    }

    #[test]
    fn in_array_membership() {
        let cond = Condition::In {
            lhs: constant(json!(2)),
            rhs: constant(json!([1, 2, 3])),
        };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn in_object_key_membership() {
        let cond = Condition::In {
            lhs: constant(json!("a")),
            rhs: constant(json!({"a": 1})),
        };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn in_substring_membership() {
        let cond = Condition::In {
            lhs: constant(json!("ell")),
            rhs: constant(json!("hello")),
        };
        assert!(evaluate(&cond, &Value::Null, &empty_results()).unwrap());
    }

    #[test]
    fn and_or_not_compose() {
        let t = Condition::Eq { lhs: constant(json!(1)), rhs: constant(json!(1)) };
        let f = Condition::Eq { lhs: constant(json!(1)), rhs: constant(json!(2)) };

        let and = Condition::And { lhs: Box::new(t.clone()), rhs: Box::new(f.clone()) };
        assert!(!evaluate(&and, &Value::Null, &empty_results()).unwrap());

        let or = Condition::Or { lhs: Box::new(t.clone()), rhs: Box::new(f.clone()) };
        assert!(evaluate(&or, &Value::Null, &empty_results()).unwrap());

        let not = Condition::Not { value: Box::new(f) };
        assert!(evaluate(&not, &Value::Null, &empty_results()).unwrap());
    }
}
