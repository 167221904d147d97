//! Token file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::tokens::AdapterInput;

/// Watches one tokenized input file and sends each successfully loaded
/// version downstream.
pub struct InputWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AdapterInput>,
}

impl InputWatcher {
    /// Returns the watcher and a receiver for loaded inputs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AdapterInput>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Events arrive on notify's thread; dropping the returned
    /// handle stops the watch.
    ///
    /// The parent directory is watched rather than the file so that editors
    /// which save by rename are still seen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_input = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_input || !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    match AdapterInput::from_path(&path) {
                        Ok(input) => {
                            tracing::info!(path = ?path, blocks = input.server_blocks.len(), "Input change detected");
                            let _ = tx.send(input);
                        }
                        // Often a half-written file; the next event will carry the rest.
                        Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to load input, keeping current configuration"),
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Input watcher started");
        Ok(watcher)
    }
}
