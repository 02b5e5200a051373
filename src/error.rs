//! # Error Taxonomy
//!
//! Every layer of the decider gets its own `thiserror` enum so a caller can
//! match on exactly what went wrong without parsing strings. [`SeddyError`]
//! is the top-level sum type the CLI unwraps; everything else converts into
//! it with `?`.
//!
//! Each error additionally implements [`FixSuggestion`], giving the CLI a
//! one-line operator hint to print under the error message.

use thiserror::Error;

/// Trait for errors that can provide a fix suggestion.
pub trait FixSuggestion {
    /// A short, actionable hint for resolving this error, if one exists.
    fn fix_suggestion(&self) -> Option<&'static str>;
}

// ============================================================================
// PATH RESOLVER
// ============================================================================

/// Errors from the JSON-path sublanguage (§4.1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path expression itself is malformed.
    #[error("invalid path expression `{0}`")]
    InvalidPath(String),

    /// The expression parsed fine but traversal hit a missing key, an
    /// out-of-range index, or a type mismatch (object-access on a
    /// non-object, index-access on a non-array).
    #[error("path `{path}` has no value at `{at}`")]
    MissingKey { path: String, at: String },
}

impl FixSuggestion for PathError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            PathError::InvalidPath(_) => Some(
                "paths must start with `$` and use `.key` or `[index]` segments only",
            ),
            PathError::MissingKey { .. } => {
                Some("add a `default` to this reference, or check the upstream task's result shape")
            }
        }
    }
}

// ============================================================================
// INPUT BUILDER
// ============================================================================

/// Errors from materializing a `TaskInput` tree (§4.2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error(transparent)]
    Path(#[from] PathError),

    /// A `dependency-result` input referenced a task id that has not (yet)
    /// produced a parsed result. This is a spec bug: the Decision Builder
    /// never evaluates a task's input before its dependencies completed.
    #[error("task `{0}` has no parsed result available")]
    MissingDependency(String),
}

impl FixSuggestion for InputError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            InputError::Path(e) => e.fix_suggestion(),
            InputError::MissingDependency(_) => {
                Some("dependency-result inputs may only reference tasks listed in `dependencies`")
            }
        }
    }
}

// ============================================================================
// CONDITION EVALUATOR
// ============================================================================

/// Errors from evaluating a `Condition` tree (§4.3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// `<` or `<=` applied to operands that are not both numbers or both
    /// strings.
    #[error("cannot compare {lhs} and {rhs} with `{op}`")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
}

impl FixSuggestion for ConditionError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            ConditionError::Input(e) => e.fix_suggestion(),
            ConditionError::TypeMismatch { .. } => {
                Some("`<`/`<=` only compare two numbers or two strings")
            }
        }
    }
}

// ============================================================================
// SPEC LOADER / DAG MODEL
// ============================================================================

/// Errors surfaced while loading a workflow spec file or validating the DAG
/// it describes. The two phases collapse into one kind at the operator
/// boundary (§4.8) since a spec author cannot usefully tell them apart.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("unsupported spec version `{0}`, this decider only reads major version 1")]
    UnsupportedVersion(String),

    #[error("unknown spec_type `{0}`, only `dag` is supported")]
    UnknownSpecType(String),

    #[error("workflow `{workflow}` declares duplicate task id `{task_id}`")]
    DuplicateTaskId { workflow: String, task_id: String },

    #[error("workflow `{workflow}`, task `{task_id}`: invalid task id ({reason})")]
    InvalidTaskId {
        workflow: String,
        task_id: String,
        reason: &'static str,
    },

    #[error("workflow `{workflow}`, task `{task_id}` depends on itself")]
    SelfDependency { workflow: String, task_id: String },

    #[error("workflow `{workflow}`, task `{task_id}` depends on unknown task `{dependency}`")]
    UnknownDependency {
        workflow: String,
        task_id: String,
        dependency: String,
    },

    #[error("workflow `{workflow}` has a dependency cycle involving task `{task_id}`")]
    Cycle { workflow: String, task_id: String },

    #[error("duplicate workflow (name, version) = ({name}, {version})")]
    DuplicateWorkflow { name: String, version: String },

    #[error("failed to read spec file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{path}` as YAML: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse `{path}` as JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FixSuggestion for SpecError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            SpecError::UnsupportedVersion(_) => Some("set `version` to a 1.x string"),
            SpecError::UnknownSpecType(_) => Some("set `spec_type` to \"dag\""),
            SpecError::DuplicateTaskId { .. } => Some("task ids must be unique within a workflow"),
            SpecError::InvalidTaskId { .. } => {
                Some("task ids may not contain `:`, `/`, `|`, the substring `arn`, or control characters")
            }
            SpecError::SelfDependency { .. } => Some("remove the task from its own `dependencies`"),
            SpecError::UnknownDependency { .. } => {
                Some("every id in `dependencies` must name a task declared in the same workflow")
            }
            SpecError::Cycle { .. } => Some("break the cycle: the dependency graph must be a DAG"),
            SpecError::DuplicateWorkflow { .. } => {
                Some("workflows are identified by (name, version); make one of them unique")
            }
            SpecError::Io { .. } => Some("check the spec file path and permissions"),
            SpecError::Yaml { .. } | SpecError::Json { .. } => {
                Some("check the spec file's syntax against the documented schema")
            }
        }
    }
}

// ============================================================================
// DECIDER / BUILDER
// ============================================================================

/// Fatal errors raised while building decisions for one decision task.
/// Unlike [`InputError`]/[`ConditionError`], these abort the Decider Loop
/// (§4.5 step 2, §5).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeciderError {
    #[error("decision rejected as not permitted for this decider's identity (`{identity}`)")]
    PermissionDenied { identity: String },

    #[error("malformed event history: {0}")]
    MalformedHistory(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl FixSuggestion for DeciderError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            DeciderError::PermissionDenied { .. } => {
                Some("this decider's IAM identity lacks permission for this domain/task-list")
            }
            DeciderError::MalformedHistory(_) | DeciderError::ProtocolViolation(_) => {
                Some("this indicates a service-side protocol change; file a bug")
            }
        }
    }
}

/// Errors from the Decision Builder (§4.5). `Input`/`Condition` failures are
/// converted to a `FailWorkflowExecution` decision by the builder itself
/// (§7) before being re-raised here for the loop to record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Decider(#[from] DeciderError),
}

impl FixSuggestion for BuilderError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            BuilderError::Input(e) => e.fix_suggestion(),
            BuilderError::Condition(e) => e.fix_suggestion(),
            BuilderError::Decider(e) => e.fix_suggestion(),
        }
    }
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// Errors talking to the SWF service. Always retried by the Decider Loop
/// with backoff (§7); never surfaced to the CLI unless retries are
/// exhausted by the caller.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("SWF `{operation}` failed: {message}")]
    Request { operation: &'static str, message: String },

    #[error("SWF `{operation}` returned an unexpected response: {message}")]
    UnexpectedResponse { operation: &'static str, message: String },
}

impl FixSuggestion for TransportError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        Some("check connectivity to the SWF endpoint and that credentials/signing are configured")
    }
}

// ============================================================================
// TOP-LEVEL
// ============================================================================

/// Top-level error type for the `seddy` CLI and library entry points.
#[derive(Error, Debug)]
pub enum SeddyError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Decider(#[from] DeciderError),

    /// A decision task arrived for a `(name, version)` this decider does
    /// not have loaded (§4.7 step d, §7).
    #[error("workflow `{name}` version `{version}` is not registered with this decider")]
    UnsupportedWorkflow { name: String, version: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl FixSuggestion for SeddyError {
    fn fix_suggestion(&self) -> Option<&'static str> {
        match self {
            SeddyError::Spec(e) => e.fix_suggestion(),
            SeddyError::Builder(e) => e.fix_suggestion(),
            SeddyError::Decider(e) => e.fix_suggestion(),
            SeddyError::UnsupportedWorkflow { .. } => {
                Some("register this workflow version, or point the decider at the right spec file")
            }
            SeddyError::Transport(e) => e.fix_suggestion(),
            SeddyError::Io(_) => Some("check the file path and permissions"),
            SeddyError::Other(_) => None,
        }
    }
}

/// Print an error with its fix suggestion to stderr.
pub fn print_error(error: &SeddyError) {
    eprintln!("error: {error}");
    if let Some(hint) = error.fix_suggestion() {
        eprintln!("  hint: {hint}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_error_has_suggestion() {
        let e = PathError::InvalidPath("a.b".into());
        assert!(e.fix_suggestion().is_some());
    }

    #[test]
    fn builder_error_wraps_input_error_transparently() {
        let path_err = PathError::MissingKey {
            path: "$.a".into(),
            at: "a".into(),
        };
        let input_err: InputError = path_err.clone().into();
        let builder_err: BuilderError = input_err.into();
        assert!(matches!(builder_err, BuilderError::Input(InputError::Path(e)) if e == path_err));
    }

    #[test]
    fn seddy_error_wraps_unsupported_workflow() {
        let e = SeddyError::UnsupportedWorkflow {
            name: "demo".into(),
            version: "1.0".into(),
        };
        assert!(e.to_string().contains("demo"));
        assert!(e.fix_suggestion().is_some());
    }
}
