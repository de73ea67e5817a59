//! Listing data structure.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An apartment listing scraped from a search page.
///
/// Two listings are equal when their `href` is equal; `content` is ignored so
/// that a listing whose text changed is still recognised as already seen.
#[derive(Debug, Clone, Serialize, Deserialize, Eq)]
pub struct Listing {
    /// Visible text of the listing node, trimmed
    pub content: String,

    /// Absolute URL of the listing
    pub href: String,
}

impl Listing {
    pub fn new(content: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            href: href.into(),
        }
    }

    /// Format the listing for a notification using a template.
    ///
    /// Supported placeholders: `{index}`, `{content}`, `{href}`.
    pub fn format(&self, template: &str, index: usize) -> String {
        template
            .replace("{index}", &index.to_string())
            .replace("{content}", &self.content)
            .replace("{href}", &self.href)
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.href == other.href
    }
}

impl Hash for Listing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.href.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample_listing() -> Listing {
        Listing::new(
            "Apartment Biltstraat\n3572 AP Utrecht\n€ 1,150 per month",
            "https://www.pararius.com/apartment-for-rent/utrecht/1a2b3c4d/biltstraat",
        )
    }

    #[test]
    fn test_format() {
        let listing = sample_listing();
        let result = listing.format("New search result {index}: {content}\nLink: {href}", 2);
        assert_eq!(
            result,
            "New search result 2: Apartment Biltstraat\n3572 AP Utrecht\n€ 1,150 per month\n\
             Link: https://www.pararius.com/apartment-for-rent/utrecht/1a2b3c4d/biltstraat"
        );
    }

    #[test]
    fn test_equality_ignores_content() {
        let a = sample_listing();
        let b = Listing::new("Price reduced!", a.href.clone());
        assert_eq!(a, b);

        let set: HashSet<Listing> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serializes_as_two_field_object() {
        let listing = Listing::new("Studio", "https://www.pararius.com/studio/1");
        let json = serde_json::to_string(&listing).unwrap();
        assert_eq!(
            json,
            r#"{"content":"Studio","href":"https://www.pararius.com/studio/1"}"#
        );
    }
}
