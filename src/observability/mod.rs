//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! compiler, directives, reload:
//!     → logging.rs (structured tracing events, one subscriber per process)
//!     → metrics.rs (pass outcomes, warnings, route counts)
//! ```
//!
//! # Design Decisions
//! - Structured fields (file, line, directive) rather than formatted strings
//! - Metrics go through the `metrics` facade; installing an exporter is the
//!   embedding program's choice
//! - Per-directive events are `debug`, per-pass events are `info`

pub mod logging;
pub mod metrics;
