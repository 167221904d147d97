//! Directive-to-route compiler.
//!
//! Turns tokenized site configuration into an ordered HTTP route
//! configuration: each directive segment is handed to its registered
//! unmarshaler, handler output is wrapped into routes, and the routes of every
//! server block are sorted into serve-time order.
//!
//! ```text
//!  tokens ──▶ compiler ──▶ directives::registry ──▶ handlers::*
//!                │                │
//!                │                ▼
//!                │         directives::helper ──▶ matchers, modules
//!                ▼
//!         directives::order (sort) ──▶ compiler::assemble ──▶ reload
//! ```

// Core pipeline
pub mod compiler;
pub mod directives;
pub mod error;
pub mod handlers;
pub mod matchers;
pub mod modules;
pub mod tokens;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod reload;

pub use compiler::{CompileInput, Compiled, Compiler};
pub use directives::{ConfigValue, DirectiveRegistry, Helper, Route, Warning};
pub use error::{CompileError, CompileResult, RegistryError};
pub use modules::{MiddlewareHandler, ModuleTable};
pub use tokens::{AdapterInput, ServerBlock, Token};
