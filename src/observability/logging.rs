//! Structured logging.
//!
//! # Responsibilities
//! - Install the process-wide tracing subscriber
//! - Take the level from the environment first, then from settings
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level so operators can debug a
//!   single run without editing settings

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: this crate at `level`, everything
/// else at `warn`.
pub fn default_filter(level: &str) -> String {
    format!("warn,directive_compiler={level}")
}

/// Install the global subscriber. Returns an error if one is already set.
pub fn init_logging(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("debug");
        assert_eq!(filter, "warn,directive_compiler=debug");
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
