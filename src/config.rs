//! Environment resolution (§6 Environment): endpoint, identity, and log
//! level, each overridable by an environment variable.

use std::env;

pub const SWF_ENDPOINT_VAR: &str = "SEDDY_SWF_ENDPOINT";
pub const IDENTITY_VAR: &str = "SEDDY_IDENTITY";

const DEFAULT_SWF_ENDPOINT: &str = "https://swf.us-east-1.amazonaws.com";

/// The SWF endpoint to talk to: `SEDDY_SWF_ENDPOINT` if set, else the
/// public `us-east-1` endpoint.
pub fn swf_endpoint() -> String {
    env::var(SWF_ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_SWF_ENDPOINT.to_string())
}

/// This decider's identity: `SEDDY_IDENTITY` if set, else a generated
/// `FQDN + "-" + short-uuid` (§4.7).
pub fn identity(override_value: Option<String>) -> String {
    override_value
        .or_else(|| env::var(IDENTITY_VAR).ok())
        .unwrap_or_else(crate::decider::generate_identity)
}

/// Install a `tracing-subscriber` filtered by `RUST_LOG`, defaulting to
/// `info` when unset. `-v`/`-q` CLI flags nudge the default floor.
pub fn init_tracing(verbosity: i8) {
    let default_level = match verbosity {
        i8::MIN..=-1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_prefers_explicit_override() {
        assert_eq!(identity(Some("explicit".into())), "explicit");
    }
}
