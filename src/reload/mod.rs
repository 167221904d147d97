//! Reload boundary.
//!
//! # Data Flow
//! ```text
//! token file changes
//!     → watcher.rs (notify event → AdapterInput over mpsc)
//!     → reloader.rs (fresh compilation pass → JSON blob)
//!     → applier.rs (hand the blob to whatever runs it)
//!     → atomic swap of the active Arc<Compiled>
//! ```
//!
//! # Design Decisions
//! - The active config only changes after the applier accepts the new one
//! - Any failure leaves the previous config active and running
//! - Each reload is a complete pass; nothing is carried over from the last one

pub mod applier;
pub mod reloader;
pub mod watcher;

pub use applier::{ApplyError, ConfigApplier, FileApplier};
pub use reloader::{ReloadError, Reloader};
pub use watcher::InputWatcher;
