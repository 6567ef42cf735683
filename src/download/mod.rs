//! HTTP plumbing shared by the bootstrap, discovery and fetch stages.
//!
//! # Features
//!
//! - One pooled client with browser-like default headers
//! - Explicit session (cookies + referer) attached per request
//! - Streaming writes of response bodies to disk
//! - Randomized politeness gate observable in 200ms ticks
//! - Structured error types with full context

mod client;
mod constants;
mod error;
pub mod filename;
pub mod gate;

pub use client::HttpClient;
pub(crate) use client::stream_to_file;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DEFAULT_MAX_DELAY, LARGE_PAGE_WIDTH,
    READ_TIMEOUT_SECS, WAIT_TICK,
};
pub use error::DownloadError;
pub use gate::PolitenessGate;

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
