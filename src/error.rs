//! Fatal error types.
//!
//! Everything in this module aborts a compilation pass. Non-fatal problems are
//! recorded as [`Warning`](crate::directives::Warning)s instead.

use thiserror::Error;

/// Fatal compilation error. Every variant identifies the offending file and line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A segment named a directive nobody registered.
    #[error("{file}:{line}: unrecognized directive: {directive}")]
    UnknownDirective {
        file: String,
        line: usize,
        directive: String,
    },

    /// A directive was given too few (or too many) arguments.
    #[error("{file}:{line} - Error during parsing: Wrong argument count or unexpected line ending after '{after}'")]
    ArgumentCount {
        file: String,
        line: usize,
        after: String,
    },

    /// Generic syntax error raised by a directive's unmarshaler.
    #[error("{file}:{line} - Error during parsing: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    /// A matcher token or definition that cannot be parsed at all.
    #[error("{file}:{line}: malformed matcher: {message}")]
    MalformedMatcher {
        file: String,
        line: usize,
        message: String,
    },

    /// A `@name` reference to a matcher that was never defined.
    #[error("{file}:{line}: unrecognized matcher name: {name}")]
    UnknownMatcher {
        file: String,
        line: usize,
        name: String,
    },
}

impl CompileError {
    /// Source file the error points at.
    pub fn file(&self) -> &str {
        match self {
            CompileError::UnknownDirective { file, .. }
            | CompileError::ArgumentCount { file, .. }
            | CompileError::Syntax { file, .. }
            | CompileError::MalformedMatcher { file, .. }
            | CompileError::UnknownMatcher { file, .. } => file,
        }
    }

    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            CompileError::UnknownDirective { line, .. }
            | CompileError::ArgumentCount { line, .. }
            | CompileError::Syntax { line, .. }
            | CompileError::MalformedMatcher { line, .. }
            | CompileError::UnknownMatcher { line, .. } => *line,
        }
    }
}

/// Errors raised while populating or installing a registry.
///
/// These indicate a defect in how the program was assembled, not a bad config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("directive {0} already registered")]
    Duplicate(String),

    #[error("module {0} already registered")]
    DuplicateModule(String),

    #[error("{0} registry already installed")]
    AlreadyInstalled(&'static str),
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
