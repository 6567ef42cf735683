//! Error types for neighbor-listing queries.
//!
//! None of these abort discovery: the engine logs them and treats the
//! response as carrying no new information.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors raised by a [`NeighborSource`](super::NeighborSource) for one pivot.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The neighbor-listing request failed (transport or status).
    #[error("neighbor request for pivot {pivot} failed: {source}")]
    Request {
        /// Pivot page id that was queried.
        pivot: String,
        /// Underlying transport error.
        #[source]
        source: DownloadError,
    },

    /// The response body was not a neighbor-listing payload.
    #[error("malformed neighbor payload for pivot {pivot}: {source}")]
    Malformed {
        /// Pivot page id that was queried.
        pivot: String,
        /// JSON decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl DiscoveryError {
    /// Creates a request error.
    pub fn request(pivot: impl Into<String>, source: DownloadError) -> Self {
        Self::Request {
            pivot: pivot.into(),
            source,
        }
    }

    /// Creates a malformed payload error.
    pub fn malformed(pivot: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            pivot: pivot.into(),
            source,
        }
    }
}
