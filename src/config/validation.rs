//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the log level and port options are usable
//! - Check matcher aliases are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: CompilerSettings → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::CompilerSettings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const PORT_OPTIONS: [&str; 2] = ["http_port", "https_port"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("option {name} must be a port number between 1 and 65535")]
    Port { name: String },

    #[error("matcher name '{0}' must be non-empty and must not start with '@'")]
    MatcherName(String),

    #[error("matcher @{name} has no matchers")]
    EmptyMatcher { name: String },

    #[error("matcher @{name}: kind '{kind}' has no arguments")]
    EmptyMatcherKind { name: String, kind: String },

    #[error("output path must not be empty")]
    OutputPath,
}

pub fn validate_settings(settings: &CompilerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&settings.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(settings.logging.level.clone()));
    }

    for name in PORT_OPTIONS {
        if let Some(value) = settings.options.get(name) {
            let valid = value.as_u64().is_some_and(|port| (1..=65535).contains(&port));
            if !valid {
                errors.push(ValidationError::Port {
                    name: name.to_string(),
                });
            }
        }
    }

    for (name, kinds) in &settings.matchers {
        if name.is_empty() || name.starts_with('@') {
            errors.push(ValidationError::MatcherName(name.clone()));
        }
        if kinds.is_empty() {
            errors.push(ValidationError::EmptyMatcher { name: name.clone() });
        }
        for (kind, args) in kinds {
            if args.is_empty() {
                errors.push(ValidationError::EmptyMatcherKind {
                    name: name.clone(),
                    kind: kind.clone(),
                });
            }
        }
    }

    if settings
        .output
        .path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        errors.push(ValidationError::OutputPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
