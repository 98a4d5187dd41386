use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Error, Result};

const DEFAULT_PREFIX: &str = "arcio-";

/// A directory that exists for exactly as long as this value.
///
/// Removal is recursive and happens on drop regardless of how the owning
/// scope exits. Use [`ScopedTempDir::close`] to observe removal errors.
pub struct ScopedTempDir {
    path: PathBuf,
    dir:  Option<TempDir>,
}

impl ScopedTempDir {
    pub fn new() -> Result<Self> { Self::with_prefix(DEFAULT_PREFIX) }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|source| Error::Create { source })?;
        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "created staging directory");

        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf { self.path.join(name) }

    /// Remove the directory now, reporting failure instead of logging it.
    pub fn close(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|source| Error::Remove {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedTempDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}
