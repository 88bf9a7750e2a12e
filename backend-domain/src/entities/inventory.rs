// Inventory entities
// Keyword suggestions and sponsored listings produced per request

use serde::{Deserialize, Serialize};

use crate::value_objects::InventorySource;

pub const DEFAULT_KEYWORDS: [&str; 3] = [
    "Best deals online",
    "Top rated products",
    "Compare prices now",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub text: String,
    /// `None` when the provider assigned no identifier (zero on the wire).
    pub id: Option<i64>,
}

impl InventoryItem {
    pub fn new(text: impl Into<String>, id: i64) -> Self {
        Self {
            text: text.into(),
            id: (id != 0).then_some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdListing {
    pub title: String,
    pub description: String,
    pub link: String,
    pub host: String,
}

impl AdListing {
    fn example(title: &str, description: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            link: format!("https://example.com/{}", path),
            host: "example.com".to_string(),
        }
    }
}

/// Items returned by an upstream fetcher together with where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub source: InventorySource,
}

impl<T> Fetched<T> {
    pub fn upstream(items: Vec<T>) -> Self {
        Self {
            items,
            source: InventorySource::Upstream,
        }
    }

    pub fn fallback(items: Vec<T>) -> Self {
        Self {
            items,
            source: InventorySource::Fallback,
        }
    }
}

pub fn default_keywords() -> Vec<InventoryItem> {
    DEFAULT_KEYWORDS
        .iter()
        .map(|text| InventoryItem::new(*text, 0))
        .collect()
}

pub fn default_ads() -> Vec<AdListing> {
    vec![
        AdListing::example(
            "Shop Top Deals Today",
            "Find amazing discounts on popular products. Limited time offers available now.",
            "deals",
        ),
        AdListing::example(
            "Compare Best Prices",
            "Get the best prices from trusted retailers. Save money on your next purchase.",
            "compare",
        ),
        AdListing::example(
            "Exclusive Online Offers",
            "Special offers only available online. Don't miss out on these savings.",
            "offers",
        ),
    ]
}
