//! Page-URL discovery.
//!
//! Converts a document id into an ordered map of page id → image URL by
//! walking the neighbor-listing endpoint one pivot at a time.
//!
//! # Architecture
//!
//! - [`DiscoveryMap`] - First-seen ordered map, visited-set and result in one
//! - [`NeighborSource`] - Async trait answering "which pages surround this pivot?"
//! - [`HttpNeighborSource`] - Source backed by the book viewer endpoint
//! - [`discover`] - Bounded frontier walk producing a [`DiscoveryOutcome`]
//!
//! # Example
//!
//! ```no_run
//! use pagegrab_core::discovery::{HttpNeighborSource, discover};
//! use pagegrab_core::download::{HttpClient, PolitenessGate};
//! use pagegrab_core::progress::NoopObserver;
//! use pagegrab_core::session::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://books.google.se")?;
//! let session = Session::new("NID=abc", "https://books.google.se/books?id=abc");
//! let source = HttpNeighborSource::new(client, session, "abc");
//! let outcome = discover(&source, &PolitenessGate::default(), &NoopObserver).await;
//! println!("{} pages", outcome.map.len());
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod map;
mod source;

pub use engine::{DiscoveryOutcome, SEED_PAGE_ID, StopReason, discover};
pub use error::DiscoveryError;
pub use map::{DiscoveryMap, PageEntry, Recorded};
pub use source::{HttpNeighborSource, NeighborSource, parse_neighbor_payload};
