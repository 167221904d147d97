//! Tokenized configuration input.
//!
//! # Data Flow
//! ```text
//! config text
//!     → external lexer (not part of this crate)
//!     → AdapterInput (JSON: server blocks → segments → positioned tokens)
//!     → dispenser.rs (per-directive cursor handed to unmarshalers)
//! ```
//!
//! # Design Decisions
//! - One segment per directive occurrence; its first token names the directive
//! - Tokens carry file and line so every fatal error can point at its source
//! - Server blocks own their segments; nothing is shared between blocks

pub mod dispenser;
pub mod token;

pub use dispenser::Dispenser;
pub use token::{AdapterInput, Segment, ServerBlock, Token};
