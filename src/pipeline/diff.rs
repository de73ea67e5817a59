//! Diff calculation for listing notifications.
//!
//! Finds the listings in the current crawl that were never seen before.

use std::collections::HashSet;

use crate::models::Listing;

/// Result of comparing a crawl against the stored history.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Listings not seen before, in discovery order
    pub added: Vec<Listing>,
    /// Crawled listings that were already known or repeated within the crawl
    pub known_count: usize,
}

impl DiffResult {
    /// Check if there are any new listings.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Calculate which listings in `current` are new relative to `previous`.
///
/// Identity is the listing `href`. A listing repeated within `current` is new
/// only at its first occurrence.
pub fn calculate_diff(previous: &[Listing], current: &[Listing]) -> DiffResult {
    let mut seen: HashSet<&str> = previous.iter().map(|l| l.href.as_str()).collect();
    let mut result = DiffResult::default();

    for listing in current {
        if seen.insert(listing.href.as_str()) {
            result.added.push(listing.clone());
        } else {
            result.known_count += 1;
        }
    }

    result
}
