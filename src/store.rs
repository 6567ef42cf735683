//! Resumable on-disk list of discovered page URLs.
//!
//! One plain-text file per document, `content-{id}.txt`, holding one image
//! URL per line in discovery order. When the file exists the stored list is
//! authoritative and discovery is skipped entirely.
//!
//! Writes go to a sibling temporary file that is renamed into place only
//! after every line has been flushed, so an interrupted run never leaves a
//! truncated list under the final name.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use crate::discovery::DiscoveryMap;
use crate::download::filename::sanitize_filename;

/// Errors raised while reading or writing a discovery file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error on the given path.
    #[error("discovery file error at {path}: {source}")]
    Io {
        /// File that could not be read, written or removed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Discovery files stored in one output directory.
#[derive(Debug, Clone)]
pub struct DiscoveryStore {
    dir: PathBuf,
}

impl DiscoveryStore {
    /// Creates a store rooted at `dir` (created lazily on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the discovery file for `document_id`.
    #[must_use]
    pub fn path_for(&self, document_id: &str) -> PathBuf {
        self.dir
            .join(format!("content-{}.txt", sanitize_filename(document_id)))
    }

    /// Loads the stored URL list, or `None` when no file exists.
    ///
    /// Blank lines are ignored; surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read.
    #[instrument(skip(self))]
    pub async fn try_load(&self, document_id: &str) -> Result<Option<Vec<String>>, StoreError> {
        let path = self.path_for(document_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored discovery file");
                return Ok(None);
            }
            Err(error) => return Err(StoreError::io(path, error)),
        };

        let urls: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        info!(path = %path.display(), pages = urls.len(), "loaded stored page list");
        Ok(Some(urls))
    }

    /// Writes the resolved URLs of `map` in first-seen order and returns the file path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory, temporary file or rename fails.
    #[instrument(skip(self, map), fields(pages = map.len()))]
    pub async fn save(&self, document_id: &str, map: &DiscoveryMap) -> Result<PathBuf, StoreError> {
        let unresolved = map.len() - map.resolved_count();
        if unresolved > 0 {
            warn!(unresolved, "saving page list without unresolved pages");
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(self.dir.clone(), e))?;

        let path = self.path_for(document_id);
        let temp_path = path.with_extension("txt.tmp");

        if let Err(error) = write_lines(&temp_path, map.resolved_urls()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(error);
        }
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StoreError::io(path.clone(), e))?;

        info!(path = %path.display(), pages = map.resolved_count(), "saved page list");
        Ok(path)
    }

    /// Deletes the discovery file; returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for failures other than a missing file.
    pub async fn remove(&self, document_id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(document_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(StoreError::io(path, error)),
        }
    }
}

async fn write_lines<'a>(
    path: &Path,
    lines: impl Iterator<Item = &'a str>,
) -> Result<(), StoreError> {
    let file = File::create(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::io(path, e))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| StoreError::io(path, e))?;
    }
    writer.flush().await.map_err(|e| StoreError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
