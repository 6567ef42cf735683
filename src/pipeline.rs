//! Per-document orchestration.
//!
//! Runs one document end to end: bootstrap, load or discover the page list,
//! persist it, download the pages, and optionally package and clean up.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::archive::{ArchiveError, package_pages};
use crate::discovery::{HttpNeighborSource, discover};
use crate::download::filename::sanitize_filename;
use crate::download::{DownloadError, HttpClient, PolitenessGate};
use crate::fetch::{FetchReport, materialize_pages};
use crate::progress::ProgressObserver;
use crate::session::{BootstrapError, Session, bootstrap};
use crate::store::{DiscoveryStore, StoreError};

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Knobs controlling what happens after pages are downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Root directory for page folders, archives and discovery files.
    pub output_dir: PathBuf,
    /// Package saved pages into `{title}.cbz`.
    pub create_archive: bool,
    /// After packaging, delete the page folder and the discovery file.
    pub cleanup: bool,
    /// Carry cookies from the previous document into the next bootstrap.
    pub reuse_session: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            create_archive: true,
            cleanup: true,
            reuse_session: false,
        }
    }
}

/// Summary of one processed document.
#[derive(Debug)]
pub struct DocumentReport {
    /// Document identifier as given on input.
    pub document_id: String,
    /// Title scraped from the landing page (or the id).
    pub title: String,
    /// Pages in the URL list.
    pub pages_total: usize,
    /// Pages written to disk.
    pub pages_saved: usize,
    /// Pages skipped during fetch.
    pub pages_skipped: usize,
    /// `true` when the page list came from a stored discovery file.
    pub resumed: bool,
    /// `false` when discovery stopped at its iteration ceiling.
    pub discovery_complete: bool,
    /// Folder holding the page images (removed on cleanup).
    pub page_dir: PathBuf,
    /// Written archive, when packaging ran.
    pub archive_path: Option<PathBuf>,
    /// Session used for this document, for reuse by the next one.
    pub session: Session,
}

/// Errors that abort a single document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Landing-page handshake failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Discovery file could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Page directory could not be prepared.
    #[error(transparent)]
    Fetch(#[from] DownloadError),

    /// Archive could not be written.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Discovery resolved no page URLs, so nothing was stored.
    #[error("no pages discovered for {document_id}")]
    NoPages {
        /// Document that yielded nothing.
        document_id: String,
    },

    /// Output directory could not be created or cleaned.
    #[error("output directory error at {path}: {source}")]
    Io {
        /// Directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Processes one document end to end.
///
/// `previous_session` is only used when [`PipelineOptions::reuse_session`]
/// is set; the session actually used is returned in the report.
///
/// # Errors
///
/// Returns [`PipelineError`] when bootstrap fails, discovery resolves no
/// pages, the output directory or discovery file cannot be written, or
/// packaging fails. Individual page failures are not errors; see [`DocumentReport::pages_skipped`].
#[instrument(skip(client, gate, observer, options, previous_session))]
pub async fn process_document(
    client: &HttpClient,
    gate: &PolitenessGate,
    observer: &dyn ProgressObserver,
    options: &PipelineOptions,
    document_id: &str,
    previous_session: Option<&Session>,
) -> Result<DocumentReport, PipelineError> {
    let reuse = previous_session.filter(|_| options.reuse_session);
    let handshake = bootstrap(client, gate, observer, document_id, reuse).await?;
    let title = handshake.title;
    let session = handshake.session;

    tokio::fs::create_dir_all(&options.output_dir)
        .await
        .map_err(|e| PipelineError::io(&options.output_dir, e))?;

    let store = DiscoveryStore::new(&options.output_dir);
    let stored = match store.try_load(document_id).await? {
        Some(urls) if urls.is_empty() => {
            warn!("stored page list is empty; discovering again");
            None
        }
        other => other,
    };
    let (urls, resumed, discovery_complete) = match stored {
        Some(urls) => {
            info!(pages = urls.len(), "resuming from stored page list");
            observer.discovery_finished(urls.len(), urls.len());
            (urls, true, true)
        }
        None => {
            let source = HttpNeighborSource::new(client.clone(), session.clone(), document_id);
            let outcome = discover(&source, gate, observer).await;
            if outcome.map.resolved_count() == 0 {
                return Err(PipelineError::NoPages {
                    document_id: document_id.to_string(),
                });
            }
            store.save(document_id, &outcome.map).await?;
            let urls: Vec<String> = outcome.map.resolved_urls().map(str::to_string).collect();
            (urls, false, outcome.is_complete())
        }
    };

    let safe_title = sanitize_filename(&title);
    let page_dir = options.output_dir.join(&safe_title);
    reset_dir(&page_dir).await?;

    let fetched = materialize_pages(client, &session, &urls, &page_dir, gate, observer).await?;

    let archive_path = if options.create_archive {
        finish_archive(&store, options, document_id, &safe_title, &page_dir, &fetched).await?
    } else {
        None
    };

    Ok(DocumentReport {
        document_id: document_id.to_string(),
        title,
        pages_total: urls.len(),
        pages_saved: fetched.saved.len(),
        pages_skipped: fetched.skipped.len(),
        resumed,
        discovery_complete,
        page_dir,
        archive_path,
        session,
    })
}

async fn finish_archive(
    store: &DiscoveryStore,
    options: &PipelineOptions,
    document_id: &str,
    safe_title: &str,
    page_dir: &Path,
    fetched: &FetchReport,
) -> Result<Option<PathBuf>, PipelineError> {
    if fetched.saved.is_empty() {
        warn!("no pages saved, skipping archive");
        return Ok(None);
    }

    let archive_path = options.output_dir.join(format!("{safe_title}.cbz"));
    let written = package_pages(fetched.saved.clone(), archive_path).await?;
    info!(archive = %written.display(), "archive created");

    if options.cleanup {
        tokio::fs::remove_dir_all(page_dir)
            .await
            .map_err(|e| PipelineError::io(page_dir, e))?;
        store.remove(document_id).await?;
        info!("removed page folder and discovery file");
    }

    Ok(Some(written))
}

/// Empties `dir` so stale pages from an earlier run never reach the archive.
async fn reset_dir(dir: &Path) -> Result<(), PipelineError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(PipelineError::io(dir, error)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipelineError::io(dir, e))
}
