// src/services/listings.rs

//! Listing crawler service.
//!
//! Fetches a search page and extracts listings using configured CSS selectors.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::Result;
use crate::models::{CompiledSelectors, Config, Listing};
use crate::services::ListingSource;
use crate::utils::http::fetch_page_async;
use crate::utils::resolve_url;

/// Service for scraping listings from search pages.
pub struct ListingCrawler {
    client: Client,
    parser: ListingParser,
}

impl ListingCrawler {
    /// Create a new listing crawler with the given configuration.
    pub fn new(config: &Config, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            parser: ListingParser::new(config)?,
        })
    }
}

#[async_trait]
impl ListingSource for ListingCrawler {
    async fn fetch(&self, url: &str) -> Result<Vec<Listing>> {
        let html = fetch_page_async(&self.client, url).await?;
        let listings = self.parser.parse(&html);
        log::info!("Parsed {} listings from {}", listings.len(), url);
        Ok(listings)
    }
}

/// Extracts listings from a search page document.
#[derive(Debug, Clone)]
pub struct ListingParser {
    selectors: CompiledSelectors,
    origin: Url,
}

impl ListingParser {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            selectors: config.selectors.compile()?,
            origin: Url::parse(&config.crawler.origin)?,
        })
    }

    /// Parse every listing item in `html`, in document order.
    ///
    /// Items without a link element, or whose link lacks the configured
    /// attribute, are skipped.
    pub fn parse(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let mut listings = Vec::new();
        let mut items = 0;

        for item in document.select(&self.selectors.item) {
            items += 1;
            if let Some(listing) = self.parse_item(&item) {
                listings.push(listing);
            }
        }

        if items == 0 {
            log::warn!("No listing items matched; the page layout may have changed");
        } else if listings.len() < items {
            log::debug!(
                "Skipped {} of {} listing items without a link",
                items - listings.len(),
                items
            );
        }

        listings
    }

    fn parse_item(&self, item: &ElementRef) -> Option<Listing> {
        let link = item.select(&self.selectors.link).next()?;
        let raw_href = link.value().attr(&self.selectors.attr_name)?;

        let content: String = item.text().collect();
        Some(Listing::new(
            content.trim(),
            resolve_url(&self.origin, raw_href),
        ))
    }
}
