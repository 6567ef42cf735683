//! Ordered page map that doubles as visited-set and result accumulator.

use std::collections::HashMap;

/// One page known to discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Opaque page token (for example `PP1`, `PA12`).
    pub page_id: String,
    /// Image resource URL; `None` until resolved.
    pub resource_url: Option<String>,
}

impl PageEntry {
    /// Creates an entry, treating an empty or whitespace-only URL as unresolved.
    pub fn new(page_id: impl Into<String>, resource_url: Option<String>) -> Self {
        Self {
            page_id: page_id.into(),
            resource_url: resource_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Returns whether the entry carries a non-empty resource URL.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resource_url.is_some()
    }
}

/// Effect of recording one response entry in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The page id was new and has been appended.
    Inserted,
    /// The page id was known but unresolved and now carries a URL.
    Filled,
    /// Nothing changed.
    Unchanged,
}

/// Page ids in first-seen order, each mapped to its (possibly unresolved) URL.
///
/// Every page id appears at most once, and a resolved entry never loses or
/// changes its URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryMap {
    entries: Vec<PageEntry>,
    index: HashMap<String, usize>,
}

impl DiscoveryMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known page ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no page id is known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a page by id.
    #[must_use]
    pub fn get(&self, page_id: &str) -> Option<&PageEntry> {
        self.index.get(page_id).map(|&position| &self.entries[position])
    }

    /// Entries in first-seen order.
    #[must_use]
    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    /// First unresolved page id in first-seen order.
    #[must_use]
    pub fn frontier(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| !entry.is_resolved())
            .map(|entry| entry.page_id.as_str())
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_resolved()).count()
    }

    /// Resolved URLs in first-seen order; unresolved entries are omitted.
    pub fn resolved_urls(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.resource_url.as_deref())
    }

    /// Records an entry: appends unknown ids (resolved or not) and fills
    /// known unresolved ones. Used for the seed response.
    pub fn record(&mut self, entry: PageEntry) -> Recorded {
        if let Some(&position) = self.index.get(&entry.page_id) {
            let existing = &mut self.entries[position];
            if !existing.is_resolved() && entry.is_resolved() {
                existing.resource_url = entry.resource_url;
                return Recorded::Filled;
            }
            return Recorded::Unchanged;
        }

        self.index.insert(entry.page_id.clone(), self.entries.len());
        self.entries.push(entry);
        Recorded::Inserted
    }

    /// Records an entry only if it carries a URL. Used for pivot responses,
    /// where unresolved neighbors carry no new information.
    pub fn record_resolved(&mut self, entry: PageEntry) -> Recorded {
        if entry.is_resolved() {
            self.record(entry)
        } else {
            Recorded::Unchanged
        }
    }
}
