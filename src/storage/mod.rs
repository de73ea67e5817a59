//! Storage abstractions for seen-listing persistence.
//!
//! The store is a single JSON array of `{ "content", "href" }` objects holding
//! every listing that has been reported so far, oldest first.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Listing;

// Re-export for convenience
pub use local::LocalStore;

/// Trait for seen-listing storage backends.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Load stored listings, distinguishing a missing store (empty) from an
    /// unreadable or corrupt one (error).
    async fn load_checked(&self) -> Result<Vec<Listing>>;

    /// Load stored listings, falling back to an empty history on any error.
    async fn load(&self) -> Vec<Listing> {
        match self.load_checked().await {
            Ok(listings) => listings,
            Err(e) => {
                log::error!("Error loading previous results: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the stored listings.
    async fn save(&self, listings: &[Listing]) -> Result<()>;

    /// Human-readable location of the store, for logging.
    fn location(&self) -> String;
}
