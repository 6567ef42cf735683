//! Neighbor-listing sources.
//!
//! [`NeighborSource`] is the seam between the frontier walk and the network:
//! the engine only ever asks "which pages surround this pivot?". The HTTP
//! implementation talks to the book viewer's `jscmd=click3` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::DiscoveryError;
use super::map::PageEntry;
use crate::download::HttpClient;
use crate::session::Session;

/// Answers neighbor-listing queries for one document.
#[async_trait]
pub trait NeighborSource: Send + Sync {
    /// Returns the entries reported around `pivot`, in response order.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the query fails or the payload is malformed.
    async fn fetch_neighbors(&self, pivot: &str) -> Result<Vec<PageEntry>, DiscoveryError>;
}

/// Neighbor source backed by the book host's page viewer endpoint.
#[derive(Debug, Clone)]
pub struct HttpNeighborSource {
    client: HttpClient,
    session: Session,
    document_id: String,
}

impl HttpNeighborSource {
    /// Creates a source for `document_id` that sends `session` with every query.
    pub fn new(client: HttpClient, session: Session, document_id: impl Into<String>) -> Self {
        Self {
            client,
            session,
            document_id: document_id.into(),
        }
    }
}

#[async_trait]
impl NeighborSource for HttpNeighborSource {
    #[instrument(skip(self), fields(document_id = %self.document_id))]
    async fn fetch_neighbors(&self, pivot: &str) -> Result<Vec<PageEntry>, DiscoveryError> {
        let url = self
            .client
            .endpoint(
                "/books",
                &[
                    ("id", self.document_id.as_str()),
                    ("lpg", "PP1"),
                    ("hl", "sv"),
                    ("pg", pivot),
                    ("jscmd", "click3"),
                ],
            )
            .map_err(|e| DiscoveryError::request(pivot, e))?;

        let body = self
            .client
            .get_text(url.as_str(), Some(&self.session))
            .await
            .map_err(|e| DiscoveryError::request(pivot, e))?;

        let entries = parse_neighbor_payload(&body).map_err(|e| DiscoveryError::malformed(pivot, e))?;
        debug!(entries = entries.len(), "neighbor payload parsed");
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct NeighborPayload {
    #[serde(default, alias = "Page")]
    page: Option<Vec<RawPage>>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default, alias = "Pid")]
    pid: Option<String>,
    #[serde(default, alias = "Src")]
    src: Option<String>,
}

/// Parses a `{ "page": [ { "pid": .., "src": .. }, .. ] }` payload.
///
/// Capitalized keys are accepted too. Entries without a page id are dropped;
/// a missing or empty `src` yields an unresolved entry.
///
/// # Errors
///
/// Returns the JSON error when the body is not a JSON object of that shape.
pub fn parse_neighbor_payload(body: &str) -> Result<Vec<PageEntry>, serde_json::Error> {
    let payload: NeighborPayload = serde_json::from_str(body)?;
    Ok(payload
        .page
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| {
            let pid = raw.pid.filter(|pid| !pid.trim().is_empty())?;
            Some(PageEntry::new(pid, raw.src))
        })
        .collect())
}
