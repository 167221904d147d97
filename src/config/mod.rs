//! Compiler settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CompilerSettings (validated, immutable)
//!     → global options + matcher aliases for every compilation pass
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Settings never change mid-pass; a new file means a new `Reloader`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{CompilerSettings, LoggingSettings, OutputSettings};
pub use validation::{validate_settings, ValidationError};
