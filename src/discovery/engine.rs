//! Frontier walk that assembles the complete page map.
//!
//! The neighbor endpoint only reveals a few pages around a pivot, so the
//! engine repeatedly queries the first unresolved page (the frontier) until
//! nothing is left unresolved. The number of pivot queries is capped by the
//! number of pages known when each pass starts; hitting the cap returns the
//! partial map instead of looping on a pivot the endpoint never resolves.

use tracing::{debug, info, instrument, warn};

use super::map::{DiscoveryMap, PageEntry, Recorded};
use super::source::NeighborSource;
use crate::download::PolitenessGate;
use crate::progress::ProgressObserver;

/// Page token of the front cover, used as the first pivot.
pub const SEED_PAGE_ID: &str = "PP1";

/// Why the frontier walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every known page is resolved.
    Complete,
    /// The iteration ceiling was reached with unresolved pages left.
    CeilingReached,
}

/// Result of [`discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// Pages in first-seen order.
    pub map: DiscoveryMap,
    /// Number of pivot queries issued after the seed query.
    pub iterations: usize,
    /// Why the walk stopped.
    pub stop: StopReason,
}

impl DiscoveryOutcome {
    /// Returns whether every known page was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stop == StopReason::Complete
    }
}

/// Discovers every page reachable from [`SEED_PAGE_ID`].
///
/// Never fails: failed or malformed neighbor responses count as empty and
/// are logged, and the iteration ceiling guarantees termination.
#[instrument(skip_all)]
pub async fn discover(
    source: &dyn NeighborSource,
    gate: &PolitenessGate,
    observer: &dyn ProgressObserver,
) -> DiscoveryOutcome {
    let mut map = DiscoveryMap::new();

    for entry in query_neighbors(source, gate, observer, SEED_PAGE_ID).await {
        map.record(entry);
    }
    debug!(known = map.len(), resolved = map.resolved_count(), "seed recorded");
    observer.discovery_progress(map.resolved_count(), map.len());

    let mut iterations = 0usize;
    let stop = loop {
        let Some(pivot) = map.frontier().map(str::to_owned) else {
            break StopReason::Complete;
        };
        if iterations >= map.len() {
            break StopReason::CeilingReached;
        }

        let mut newly_resolved = 0usize;
        for entry in query_neighbors(source, gate, observer, &pivot).await {
            if map.record_resolved(entry) != Recorded::Unchanged {
                newly_resolved += 1;
            }
        }
        iterations += 1;

        debug!(
            pivot = %pivot,
            iteration = iterations,
            newly_resolved,
            known = map.len(),
            "pivot processed"
        );
        observer.discovery_progress(map.resolved_count(), map.len());
    };

    let resolved = map.resolved_count();
    match stop {
        StopReason::Complete => {
            info!(pages = map.len(), iterations, "page discovery complete");
        }
        StopReason::CeilingReached => {
            warn!(
                pages = map.len(),
                resolved,
                unresolved = map.len() - resolved,
                iterations,
                "page discovery stopped at iteration ceiling; page set may be incomplete"
            );
        }
    }
    if map.is_empty() {
        warn!("seed query returned no pages");
    }
    observer.discovery_finished(resolved, map.len());

    DiscoveryOutcome {
        map,
        iterations,
        stop,
    }
}

/// Waits at the gate, then queries `pivot`; errors become an empty response.
async fn query_neighbors(
    source: &dyn NeighborSource,
    gate: &PolitenessGate,
    observer: &dyn ProgressObserver,
    pivot: &str,
) -> Vec<PageEntry> {
    gate.wait(observer).await;
    match source.fetch_neighbors(pivot).await {
        Ok(entries) => entries,
        Err(error) => {
            warn!(pivot, error = %error, "neighbor query failed; treating as empty");
            Vec::new()
        }
    }
}
