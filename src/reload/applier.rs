//! Handing compiled configs to the process that serves them.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to write config to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config rejected: {0}")]
    Rejected(String),
}

/// Receives each new serialized config. Returning an error keeps the
/// previous config active.
pub trait ConfigApplier: Send + Sync {
    fn apply(&self, blob: &[u8]) -> Result<(), ApplyError>;
}

impl<F> ConfigApplier for F
where
    F: Fn(&[u8]) -> Result<(), ApplyError> + Send + Sync,
{
    fn apply(&self, blob: &[u8]) -> Result<(), ApplyError> {
        self(blob)
    }
}

/// Writes each config to a file. Readers never see a partial write: the blob
/// lands in a sibling temp file first and is renamed over the target.
#[derive(Debug, Clone)]
pub struct FileApplier {
    path: PathBuf,
}

impl FileApplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ConfigApplier for FileApplier {
    fn apply(&self, blob: &[u8]) -> Result<(), ApplyError> {
        let temp = self.temp_path();
        fs::write(&temp, blob).map_err(|source| ApplyError::Io {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &self.path).map_err(|source| ApplyError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = ?self.path, bytes = blob.len(), "Config written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_applier_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.json");
        let applier = FileApplier::new(&target);

        applier.apply(b"{\"first\":true}").unwrap();
        applier.apply(b"{\"second\":true}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"second\":true}");
        assert!(!applier.temp_path().exists());
    }

    #[test]
    fn test_file_applier_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let applier = FileApplier::new(dir.path().join("missing").join("config.json"));
        assert!(matches!(applier.apply(b"{}"), Err(ApplyError::Io { .. })));
    }

    #[test]
    fn test_closure_applier() {
        let reject = |_: &[u8]| -> Result<(), ApplyError> { Err(ApplyError::Rejected("busy".into())) };
        let err = reject.apply(b"{}").unwrap_err();
        assert_eq!(err.to_string(), "config rejected: busy");
    }
}
