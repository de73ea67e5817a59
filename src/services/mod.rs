//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Listing scraping (`ListingCrawler`)
//! - Telegram delivery (`TelegramNotifier`)

mod listings;
mod notifier;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Listing;

pub use listings::{ListingCrawler, ListingParser};
pub use notifier::TelegramNotifier;

/// A source of listings for a search page URL.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch and parse one search page.
    async fn fetch(&self, url: &str) -> Result<Vec<Listing>>;
}

/// Outcome of a single notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Endpoint answered 200
    Sent,
    /// Endpoint answered with another status
    Rejected(u16),
    /// Request did not complete
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Trait for notification backends.
///
/// Implementations report failures through [`Delivery`] and never abort the
/// caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Delivery;
}
