// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod listing;
mod selectors;

// Re-export all public types
pub use config::{
    BOT_TOKEN_VAR, CHAT_ID_VAR, Config, CrawlerConfig, Credentials, NotificationConfig,
    StoreConfig, TelegramConfig,
};
pub use listing::Listing;
pub use selectors::{CompiledSelectors, ListingSelectors};
