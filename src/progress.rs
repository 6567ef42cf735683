//! Progress observer hooks.
//!
//! Core operations report progress through [`ProgressObserver`] at a few
//! well-defined points. Every method has a no-op default, so callers that do
//! not care about progress pass [`NoopObserver`].

use std::time::Duration;

/// Receives progress notifications from the gate, discovery and fetch loops.
pub trait ProgressObserver: Send + Sync {
    /// A politeness wait of `total` has started.
    fn wait_started(&self, _total: Duration) {}

    /// One tick of the current politeness wait has elapsed.
    fn wait_tick(&self, _elapsed: Duration, _total: Duration) {}

    /// Discovery is walking a map that currently knows `known` pages.
    fn discovery_progress(&self, _resolved: usize, _known: usize) {}

    /// Discovery is done (or was skipped because a stored list was loaded).
    fn discovery_finished(&self, _resolved: usize, _known: usize) {}

    /// Page downloads are about to start.
    fn fetch_started(&self, _total: usize) {}

    /// A page has been handled (saved or skipped).
    fn page_fetched(&self, _done: usize, _total: usize) {}

    /// All pages have been handled.
    fn fetch_finished(&self, _saved: usize, _total: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
