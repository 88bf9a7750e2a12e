// Inventory normalization
// Turns provider payloads into keyword items and ad listings

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use backend_domain::{AdListing, InventoryItem};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("keyword payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ad payload is not valid xml: {0}")]
    Xml(#[from] quick_xml::DeError),
}

#[derive(Debug, Deserialize)]
struct StrictKeywordResponse {
    k: Vec<StrictKeyword>,
}

#[derive(Debug, Deserialize)]
struct StrictKeyword {
    #[serde(default)]
    t: String,
    #[serde(default)]
    i: Option<StrictKeywordId>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrictKeywordId {
    Number(serde_json::Number),
    Text(String),
}

impl StrictKeywordId {
    fn as_i64(&self) -> i64 {
        match self {
            StrictKeywordId::Number(number) => number.as_i64().unwrap_or(0),
            StrictKeywordId::Text(text) => text.trim().parse().unwrap_or(0),
        }
    }
}

/// Parses a keyword provider body.
///
/// The documented `{"k":[{"t":..,"i":..}]}` shape is tried first. When it does not
/// decode or yields nothing usable, every `"k"` array found anywhere in the document
/// is harvested in document order, deduplicated by trimmed text (first wins).
pub fn normalize_keywords(body: &[u8]) -> Result<Vec<InventoryItem>, NormalizeError> {
    if let Ok(strict) = serde_json::from_slice::<StrictKeywordResponse>(body) {
        let items: Vec<InventoryItem> = strict
            .k
            .iter()
            .filter_map(|item| {
                let text = item.t.trim();
                if text.is_empty() {
                    return None;
                }
                let id = item.i.as_ref().map(StrictKeywordId::as_i64).unwrap_or(0);
                Some(InventoryItem::new(text, id))
            })
            .collect();
        if !items.is_empty() {
            return Ok(items);
        }
    }

    let root: Value = serde_json::from_slice(body)?;
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    walk(&root, &mut seen, &mut items);
    Ok(items)
}

fn walk(value: &Value, seen: &mut HashSet<String>, items: &mut Vec<InventoryItem>) {
    match value {
        Value::Array(values) => {
            for nested in values {
                walk(nested, seen, items);
            }
        }
        Value::Object(map) => {
            if let Some(Value::Array(candidates)) = map.get("k") {
                for candidate in candidates {
                    if let Value::Object(fields) = candidate {
                        harvest(fields, seen, items);
                    }
                }
            }
            for nested in map.values() {
                walk(nested, seen, items);
            }
        }
        _ => {}
    }
}

fn harvest(
    fields: &Map<String, Value>,
    seen: &mut HashSet<String>,
    items: &mut Vec<InventoryItem>,
) {
    let text = coerce_text(fields.get("t"));
    let text = text.trim();
    if text.is_empty() || seen.contains(text) {
        return;
    }
    seen.insert(text.to_string());
    items.push(InventoryItem::new(text, coerce_id(fields.get("i"))));
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_id(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Default, Deserialize)]
struct AdFeedDocument {
    #[serde(rename = "ResultSet", default)]
    result_set: AdResultSet,
}

#[derive(Debug, Default, Deserialize)]
struct AdResultSet {
    #[serde(rename = "Listing", default)]
    listings: Vec<AdFeedListing>,
}

#[derive(Debug, Deserialize)]
struct AdFeedListing {
    #[serde(rename = "@title", default)]
    title: String,
    #[serde(rename = "@description", default)]
    description: String,
    #[serde(rename = "@siteHost", default)]
    site_host: String,
    #[serde(rename = "ClickUrl", default)]
    click_url: Option<AdClickUrl>,
    #[serde(rename = "Extensions", default)]
    extensions: Option<AdExtensions>,
}

#[derive(Debug, Default, Deserialize)]
struct AdClickUrl {
    #[serde(rename = "$text", default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct AdExtensions {
    #[serde(rename = "actionExtension", default)]
    action_extension: Option<AdActionExtension>,
}

#[derive(Debug, Default, Deserialize)]
struct AdActionExtension {
    #[serde(rename = "actionItem", default)]
    items: Vec<AdActionItem>,
}

#[derive(Debug, Default, Deserialize)]
struct AdActionItem {
    #[serde(default)]
    link: String,
}

impl AdFeedListing {
    fn link(&self) -> Option<String> {
        let click = self
            .click_url
            .as_ref()
            .map(|click| click.url.trim())
            .filter(|url| !url.is_empty());
        let action = || {
            self.extensions
                .as_ref()
                .and_then(|ext| ext.action_extension.as_ref())
                .and_then(|action| action.items.first())
                .map(|item| item.link.trim())
                .filter(|url| !url.is_empty())
        };
        click.or_else(action).map(str::to_string)
    }
}

/// Parses the sponsored listing feed. Listings without any link are dropped.
pub fn normalize_ads(body: &[u8]) -> Result<Vec<AdListing>, NormalizeError> {
    let text = String::from_utf8_lossy(body);
    let document: AdFeedDocument = quick_xml::de::from_str(&text)?;
    Ok(document
        .result_set
        .listings
        .into_iter()
        .filter_map(|listing| {
            let link = listing.link()?;
            Some(AdListing {
                title: unescape(&listing.title),
                description: unescape(&listing.description),
                link,
                host: listing.site_host.trim().to_string(),
            })
        })
        .collect())
}

fn unescape(value: &str) -> String {
    html_escape::decode_html_entities(value.trim()).into_owned()
}
