// src/models/selectors.rs

//! CSS selectors for scraping a listing search page.

use scraper::Selector;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// CSS selectors for scraping a listing search page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each listing item on the search page
    #[serde(default = "default_item_selector")]
    pub item_selector: String,

    /// Selector for the link element within an item
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "default_attr_name")]
    pub attr_name: String,
}

fn default_item_selector() -> String {
    "li.search-list__item.search-list__item--listing".to_string()
}

fn default_link_selector() -> String {
    "a.listing-search-item__link".to_string()
}

fn default_attr_name() -> String {
    "href".to_string()
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item_selector: default_item_selector(),
            link_selector: default_link_selector(),
            attr_name: default_attr_name(),
        }
    }
}

impl ListingSelectors {
    /// Parse the configured selector strings.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            item: parse_selector(&self.item_selector)?,
            link: parse_selector(&self.link_selector)?,
            attr_name: self.attr_name.clone(),
        })
    }
}

/// Parsed selectors, ready to run against a document.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub item: Selector,
    pub link: Selector,
    pub attr_name: String,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_compile() {
        let compiled = ListingSelectors::default().compile().unwrap();
        assert_eq!(compiled.attr_name, "href");
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let selectors = ListingSelectors {
            item_selector: "[[invalid".to_string(),
            ..ListingSelectors::default()
        };
        match selectors.compile() {
            Err(AppError::Selector { selector, .. }) => assert_eq!(selector, "[[invalid"),
            other => panic!("expected selector error, got {other:?}"),
        }
    }
}
