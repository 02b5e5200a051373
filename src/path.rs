//! JSON-path sublanguage (§4.1).
//!
//! Grammar: `$` (`.KEY` | `[INDEX]`)*, where `KEY` is a non-empty run of
//! ASCII letters, digits, and `_`, and `INDEX` is a non-negative decimal
//! integer. The leading `$` is required; there is no bare-key shorthand,
//! no wildcards, no filters, no slices.

use serde_json::Value;

use crate::error::PathError;

/// A single parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.key` — requires the current value to be an object.
    Field(String),
    /// `[index]` — requires the current value to be an array.
    Index(usize),
}

/// Parse a path expression into segments. Fails with
/// [`PathError::InvalidPath`] for anything outside the grammar.
pub fn parse(path: &str) -> Result<Vec<Segment>, PathError> {
    let mut chars = path.chars().peekable();
    if chars.next() != Some('$') {
        return Err(PathError::InvalidPath(path.to_string()));
    }

    let mut segments = Vec::new();
    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let mut key = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_ascii_alphanumeric() || c2 == '_' {
                        key.push(c2);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if key.is_empty() {
                    return Err(PathError::InvalidPath(path.to_string()));
                }
                segments.push(Segment::Field(key));
            }
            '[' => {
                chars.next();
                let mut digits = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_ascii_digit() {
                        digits.push(c2);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() || chars.next() != Some(']') {
                    return Err(PathError::InvalidPath(path.to_string()));
                }
                let index: usize = digits
                    .parse()
                    .map_err(|_| PathError::InvalidPath(path.to_string()))?;
                segments.push(Segment::Index(index));
            }
            _ => return Err(PathError::InvalidPath(path.to_string())),
        }
    }

    Ok(segments)
}

/// Apply already-parsed segments to a JSON value. The only failure mode
/// here is [`PathError::MissingKey`] — syntax errors are caught by
/// [`parse`] before this runs.
pub fn apply(value: &Value, path: &str, segments: &[Segment]) -> Result<Value, PathError> {
    let mut current = value;
    let mut traversed = String::new();

    for segment in segments {
        current = match segment {
            Segment::Field(name) => {
                traversed.push('.');
                traversed.push_str(name);
                current
                    .as_object()
                    .and_then(|obj| obj.get(name))
                    .ok_or_else(|| PathError::MissingKey {
                        path: path.to_string(),
                        at: traversed.clone(),
                    })?
            }
            Segment::Index(idx) => {
                traversed.push_str(&format!("[{idx}]"));
                current
                    .as_array()
                    .and_then(|arr| arr.get(*idx))
                    .ok_or_else(|| PathError::MissingKey {
                        path: path.to_string(),
                        at: traversed.clone(),
                    })?
            }
        };
    }

    Ok(current.clone())
}

/// Resolve `path` against `value`, falling back to `default` on a
/// [`PathError::MissingKey`]. A missing key with no default resolves to
/// "no value" (`Ok(None)`), never an error. An [`PathError::InvalidPath`]
/// is always propagated — defaults never suppress it.
pub fn resolve(
    path: &str,
    value: &Value,
    default: Option<&Value>,
) -> Result<Option<Value>, PathError> {
    let segments = parse(path)?;
    match apply(value, path, &segments) {
        Ok(v) => Ok(Some(v)),
        Err(PathError::MissingKey { .. }) => Ok(default.cloned()),
        Err(e) => Err(e),
    }
}
