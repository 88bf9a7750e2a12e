// Decision request entities
// Inbound parameters after transport-level parsing

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRequest {
    pub slot: String,
    pub publisher_id: i64,
    pub user_agent: String,
    pub country_code: Option<String>,
    pub layout_id: Option<i64>,
    pub template_size: Option<String>,
    pub domain: Option<String>,
    pub referrer_url: Option<String>,
    pub page_title: Option<String>,
    pub keyword_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRequest {
    pub slot: String,
    pub publisher_id: i64,
    pub user_agent: String,
    pub query: Option<String>,
    pub keyword_id: Option<i64>,
    pub country_code: Option<String>,
    /// Upper bound carried over from the keyword page; only ever lowers capacity.
    pub max_ads: Option<usize>,
}

/// Values sent to the keyword provider for one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFetchParams {
    pub country_code: String,
    pub layout_id: i64,
    pub template_size: String,
    pub domain: Option<String>,
    pub referrer_url: Option<String>,
    pub page_title: Option<String>,
    pub keyword_ref: Option<String>,
    pub max_results: usize,
}
