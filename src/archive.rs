//! `.cbz` packaging of downloaded pages.
//!
//! A `.cbz` is a plain zip container; each page becomes one deflated entry
//! named after its file, in page order.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors raised while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Reading a page or writing the archive file failed.
    #[error("IO error packaging {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The zip encoder rejected an entry or could not finish the container.
    #[error("zip error writing {path}: {source}")]
    Zip {
        /// Archive being written.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The blocking packaging task panicked or was cancelled.
    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Packages `pages` into `archive_path` on a blocking thread and returns the path.
///
/// A partially written archive is removed on failure.
///
/// # Errors
///
/// Returns [`ArchiveError`] when a page cannot be read or the archive cannot be written.
#[instrument(skip(pages), fields(pages = pages.len(), archive = %archive_path.display()))]
pub async fn package_pages(
    pages: Vec<PathBuf>,
    archive_path: PathBuf,
) -> Result<PathBuf, ArchiveError> {
    tokio::task::spawn_blocking(move || {
        let result = write_archive(&pages, &archive_path);
        if result.is_err() {
            debug!(path = %archive_path.display(), "removing partial archive");
            let _ = std::fs::remove_file(&archive_path);
        }
        result.map(|()| archive_path)
    })
    .await?
}

fn write_archive(pages: &[PathBuf], archive_path: &Path) -> Result<(), ArchiveError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArchiveError::Io { path, source }
    };
    let zip_error = |source| ArchiveError::Zip {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::create(archive_path).map_err(io_error(archive_path))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for page in pages {
        let name = page
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| page.to_string_lossy().into_owned());
        zip.start_file(name, options).map_err(zip_error)?;
        let mut source = File::open(page).map_err(io_error(page))?;
        io::copy(&mut source, &mut zip).map_err(io_error(archive_path))?;
    }

    let mut writer = zip.finish().map_err(zip_error)?;
    writer.flush().map_err(io_error(archive_path))?;

    info!(entries = pages.len(), "archive written");
    Ok(())
}
