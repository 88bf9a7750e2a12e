// Publisher config entity
// Legacy per-publisher layout settings used to build provider requests

use serde::{Deserialize, Serialize};

use crate::entities::targeting_rule::{
    DEFAULT_COUNTRY_CODE, DEFAULT_KEYWORD_TEMPLATE, DEFAULT_SERP_TEMPLATE,
};

pub const DEFAULT_LAYOUT_ID: i64 = 224;
pub const DEFAULT_TEMPLATE_SIZE: &str = "300x250";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    pub publisher_id: i64,
    #[serde(default = "default_layout_id")]
    pub layout_id: i64,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub template_size: String,
    #[serde(default)]
    pub serp_template: String,
    #[serde(default)]
    pub keyword_template: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            publisher_id: 0,
            layout_id: DEFAULT_LAYOUT_ID,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            template_size: DEFAULT_TEMPLATE_SIZE.to_string(),
            serp_template: DEFAULT_SERP_TEMPLATE.to_string(),
            keyword_template: DEFAULT_KEYWORD_TEMPLATE.to_string(),
        }
    }
}

impl PublisherConfig {
    /// Trims values and fills blanks from the built-in default.
    pub fn normalized(&self) -> Self {
        let fallback = PublisherConfig::default();
        Self {
            publisher_id: self.publisher_id,
            layout_id: if self.layout_id > 0 {
                self.layout_id
            } else {
                fallback.layout_id
            },
            country_code: non_blank(&self.country_code)
                .map(|value| value.to_uppercase())
                .unwrap_or(fallback.country_code),
            template_size: non_blank(&self.template_size).unwrap_or(fallback.template_size),
            serp_template: non_blank(&self.serp_template).unwrap_or(fallback.serp_template),
            keyword_template: non_blank(&self.keyword_template)
                .unwrap_or(fallback.keyword_template),
        }
    }
}

fn default_layout_id() -> i64 {
    DEFAULT_LAYOUT_ID
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_fills_blank_fields() {
        let config = PublisherConfig {
            publisher_id: 200,
            layout_id: 0,
            country_code: " gb ".to_string(),
            template_size: String::new(),
            serp_template: "SerpTemplate3.html".to_string(),
            keyword_template: " ".to_string(),
        }
        .normalized();
        assert_eq!(config.layout_id, DEFAULT_LAYOUT_ID);
        assert_eq!(config.country_code, "GB");
        assert_eq!(config.template_size, DEFAULT_TEMPLATE_SIZE);
        assert_eq!(config.serp_template, "SerpTemplate3.html");
        assert_eq!(config.keyword_template, DEFAULT_KEYWORD_TEMPLATE);
    }
}
