// Telemetry entities
// Append-only impression and click rows handed to the telemetry store

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordImpression {
    pub event_id: String,
    pub event_time_ms: i64,
    pub publisher_id: i64,
    pub keyword_id: Option<i64>,
    pub keyword_title: String,
    pub slot: String,
    pub client_ip: String,
    pub user_agent: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordClick {
    pub event_id: String,
    pub event_time_ms: i64,
    pub publisher_id: i64,
    pub slot: String,
    pub keyword_id: Option<i64>,
    pub keyword_title: String,
    pub client_ip: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdClick {
    pub event_id: String,
    pub event_time_ms: i64,
    pub publisher_id: i64,
    pub keyword_id: Option<i64>,
    pub keyword_title: String,
    pub ad_title: String,
    pub ad_host: String,
    pub target_url: String,
    pub slot: String,
    pub client_ip: String,
    pub user_agent: String,
    pub country_code: String,
}
