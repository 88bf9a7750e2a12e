// Runtime configuration shared by every layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub keyword_api_base: String,
    pub ad_feed_url: String,
    pub upstream_timeout_seconds: u64,
    pub template_dir: String,
    pub rules_path: Option<String>,
    pub publisher_configs_path: Option<String>,
    pub cache_sweep_seconds: u64,
    pub min_keyword_slots: usize,
    pub min_ad_slots: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub keyword_provider: KeywordProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub clickhouse_url: Option<String>,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

/// Partner identifiers and tags sent on every keyword provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordProviderConfig {
    pub csid: String,
    pub pid: String,
    pub partner_id: String,
    pub fpid: String,
    pub crid: String,
    pub pstag: String,
    pub stags: String,
    pub mtags: String,
    pub calling_source: String,
}

impl Default for KeywordProviderConfig {
    fn default() -> Self {
        Self {
            csid: "8CUJM46V5".to_string(),
            pid: "8POJDA6W3".to_string(),
            partner_id: "7PRFT79UO".to_string(),
            fpid: "800015395".to_string(),
            crid: "849176236".to_string(),
            pstag: "skenzo_test".to_string(),
            stags: "skenzo_test".to_string(),
            mtags: "{perform,BT1_sp},{sem,app,dmsedo,mva,stm,conndigi,pdeal,audext,conn,ginsu}"
                .to_string(),
            calling_source: "cm".to_string(),
        }
    }
}
