//! Directive compilation subsystem.
//!
//! # Data Flow
//! ```text
//! registry.rs (directive name → unmarshaler, filled at startup)
//!     → helper.rs (one Helper per directive occurrence)
//!     → value.rs (ConfigValue fragments, keyed by class into a Pile)
//!     → order.rs (route fragments sorted by directive priority, then path)
//! ```
//!
//! # Design Decisions
//! - Handler directives are sugar: the registry adds matcher parsing and
//!   route construction around a function that only builds the handler
//! - Broken values (unresolvable module, unserializable config) become
//!   warnings; broken directive invocations abort the pass
//! - Warnings and group labels are scoped to one pass

pub mod helper;
pub mod order;
pub mod registry;
pub mod value;
pub mod warning;

pub use helper::{BlockContext, GroupCounter, Helper, Options, PassState};
pub use order::{directive_is_ordered, directive_priority, DIRECTIVE_ORDER};
pub use registry::{DirectiveRegistry, UnmarshalFn, UnmarshalHandlerFn};
pub use value::{ConfigValue, Payload, Pile, Route, BIND_CLASS, ROUTE_CLASS};
pub use warning::Warning;
