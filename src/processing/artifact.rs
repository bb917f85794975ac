//! Ownership of uploaded files staged on disk for the duration of one request.
//!
//! A [`TemporaryArtifact`] is created by the inbound boundary under a random name and handed to
//! the pipeline inside the submission. The pipeline releases it once it reaches a terminal
//! state; releasing consumes the guard, so deletion is attempted exactly once. A guard that is
//! dropped without being released (an early return at the boundary, a panic) deletes the file
//! from its `Drop` implementation instead.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Failure to delete a temporary artifact. Logged, never returned to callers.
#[derive(Debug, Error)]
#[error("failed to delete temporary artifact {}: {source}", .path.display())]
pub struct CleanupError {
    /// Location that could not be removed.
    pub path: PathBuf,
    /// Underlying filesystem error.
    #[source]
    pub source: io::Error,
}

/// Guard owning an on-disk upload.
#[derive(Debug)]
pub struct TemporaryArtifact {
    path: PathBuf,
    released: bool,
}

impl TemporaryArtifact {
    /// Write `bytes` to a uniquely named file inside `dir`, creating the directory if needed.
    pub async fn create(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let artifact = Self::adopt(dir.join(Uuid::new_v4().to_string()));
        // On a failed write the guard is dropped and removes any partial file.
        tokio::fs::write(&artifact.path, bytes).await?;
        tracing::debug!(path = %artifact.path.display(), bytes = bytes.len(), "Staged upload");
        Ok(artifact)
    }

    /// Take ownership of an existing file; it will be deleted when the guard is released.
    pub fn adopt(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the staged bytes back.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Delete the backing file. Failures are logged and swallowed.
    pub async fn release(mut self) {
        self.released = true;
        let result = match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CleanupError {
                path: self.path.clone(),
                source,
            }),
        };
        log_cleanup(&self.path, result);
    }
}

impl Drop for TemporaryArtifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let result = match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CleanupError {
                path: self.path.clone(),
                source,
            }),
        };
        log_cleanup(&self.path, result);
    }
}

fn log_cleanup(path: &Path, result: Result<bool, CleanupError>) {
    match result {
        Ok(true) => tracing::debug!(path = %path.display(), "Deleted temporary artifact"),
        Ok(false) => tracing::debug!(path = %path.display(), "Temporary artifact already absent"),
        Err(error) => tracing::warn!(error = %error, "Temporary artifact cleanup failed"),
    }
}
