//! Page image download and validation.
//!
//! Each discovered URL is requested in its large variant and written as
//! `page{N}.{png|jpg}`, where `N` is the URL's zero-based position in the
//! list. Pages that fail (bad status, unexpected content type, transport
//! error) are skipped with a warning; the rest of the document continues.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use crate::download::filename::{page_file_name, page_image_extension};
use crate::download::{DownloadError, HttpClient, LARGE_PAGE_WIDTH, PolitenessGate, stream_to_file};
use crate::progress::ProgressObserver;
use crate::session::Session;

/// A page that could not be materialized.
#[derive(Debug)]
pub struct PageSkip {
    /// Zero-based position of the page in the URL list.
    pub index: usize,
    /// URL that was requested (large variant).
    pub url: String,
    /// Why the page was skipped.
    pub reason: DownloadError,
}

/// Outcome of downloading every page of a document.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Written page files, in page order.
    pub saved: Vec<PathBuf>,
    /// Pages that were skipped, in page order.
    pub skipped: Vec<PageSkip>,
}

/// Appends the large-width parameter to a page image URL.
///
/// ```
/// use pagegrab_core::fetch::large_variant_url;
///
/// assert_eq!(
///     large_variant_url("https://books.example/content?id=x&pg=PA1"),
///     "https://books.example/content?id=x&pg=PA1&w=1280"
/// );
/// ```
#[must_use]
pub fn large_variant_url(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}w={LARGE_PAGE_WIDTH}")
}

/// Downloads every URL into `dir`, waiting at the gate between pages.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] only when `dir` cannot be created; per-page
/// failures are collected in [`FetchReport::skipped`].
#[instrument(skip_all, fields(pages = urls.len(), dir = %dir.display()))]
pub async fn materialize_pages(
    client: &HttpClient,
    session: &Session,
    urls: &[String],
    dir: &Path,
    gate: &PolitenessGate,
    observer: &dyn ProgressObserver,
) -> Result<FetchReport, DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::io(dir.to_path_buf(), e))?;

    let total = urls.len();
    let mut report = FetchReport::default();
    observer.fetch_started(total);

    for (index, url) in urls.iter().enumerate() {
        let resource = large_variant_url(url);
        match fetch_page(client, session, &resource, dir, index).await {
            Ok(path) => {
                debug!(index, path = %path.display(), "page saved");
                report.saved.push(path);
            }
            Err(reason) => {
                warn!(index, url = %resource, error = %reason, "skipping page");
                report.skipped.push(PageSkip {
                    index,
                    url: resource,
                    reason,
                });
            }
        }
        observer.page_fetched(index + 1, total);

        if index + 1 < total {
            gate.wait(observer).await;
        }
    }

    info!(
        saved = report.saved.len(),
        skipped = report.skipped.len(),
        "page download finished"
    );
    observer.fetch_finished(report.saved.len(), total);
    Ok(report)
}

async fn fetch_page(
    client: &HttpClient,
    session: &Session,
    resource: &str,
    dir: &Path,
    index: usize,
) -> Result<PathBuf, DownloadError> {
    let response = client.get(resource, Some(session)).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(resource, status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    let Some(extension) = page_image_extension(&content_type) else {
        return Err(DownloadError::unsupported_content_type(resource, content_type));
    };

    let path = dir.join(page_file_name(index, extension));
    let bytes = stream_to_file(response, resource, &path).await?;
    debug!(index, bytes, "page body written");
    Ok(path)
}
