//! Pagegrab Core Library
//!
//! This library provides the core functionality for the pagegrab tool,
//! which turns a single book identifier into an ordered set of page images
//! and bundles them into one archive.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - HTTP client, politeness gate, transport errors
//! - [`session`] - Landing-page handshake (cookies + title)
//! - [`discovery`] - Frontier walk over the neighbor-listing endpoint
//! - [`store`] - Resumable on-disk list of discovered page URLs
//! - [`fetch`] - Page image download and validation
//! - [`archive`] - `.cbz` packaging
//! - [`pipeline`] - Per-document orchestration of all of the above
//! - [`progress`] - Optional progress observer hooks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod discovery;
pub mod download;
pub mod fetch;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveError, package_pages};
pub use discovery::{
    DiscoveryError, DiscoveryMap, DiscoveryOutcome, HttpNeighborSource, NeighborSource,
    PageEntry, SEED_PAGE_ID, StopReason, discover,
};
pub use download::{DEFAULT_BASE_URL, DEFAULT_MAX_DELAY, DownloadError, HttpClient, PolitenessGate};
pub use fetch::{FetchReport, PageSkip, materialize_pages};
pub use pipeline::{
    DEFAULT_OUTPUT_DIR, DocumentReport, PipelineError, PipelineOptions, process_document,
};
pub use progress::{NoopObserver, ProgressObserver};
pub use session::{Bootstrap, BootstrapError, Session, bootstrap};
pub use store::{DiscoveryStore, StoreError};
