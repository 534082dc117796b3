//! Local persistence of downloaded documents.
//!
//! Files are named `<name>.json` (pretty-printed) or `<name>.<ext>` for raw
//! archives, directly under the store root. Existing files are overwritten:
//! a re-run of the same range replaces what an earlier run wrote.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while writing files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error (create directory, write file).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized to JSON.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        /// The file the value was destined for.
        path: PathBuf,
        /// The serialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialize(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialize {
            path: path.into(),
            source,
        }
    }
}

/// Writes documents into one output directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a document called `name` with extension `ext` is written to.
    #[must_use]
    pub fn path_for(&self, name: &str, ext: &str) -> PathBuf {
        self.root
            .join(format!("{}.{ext}", sanitize_filename_component(name)))
    }

    /// Writes `value` as pretty JSON to `<root>/<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name, "json");
        let mut body =
            serde_json::to_vec_pretty(value).map_err(|e| StoreError::serialize(&path, e))?;
        body.push(b'\n');
        self.write(path, &body).await
    }

    /// Writes raw bytes to `<root>/<name>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the write fails.
    pub async fn write_bytes(
        &self,
        name: &str,
        ext: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name, ext);
        self.write(path, bytes).await
    }

    async fn write(&self, path: PathBuf, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "file written");
        Ok(path)
    }
}

/// Maps anything outside `[A-Za-z0-9._-]` to `_`, collapsing runs.
fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.') {
            out.push(ch);
            prev_sep = false;
        } else if !prev_sep {
            out.push('_');
            prev_sep = true;
        }
    }
    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
