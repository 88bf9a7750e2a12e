// Click statistics key
// Dimensions of the in-process click counter

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClickStatKey {
    pub slot: String,
    pub keyword_id: String,
    pub query: String,
    pub ad_host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickStat {
    #[serde(flatten)]
    pub key: ClickStatKey,
    pub count: u64,
}
