use async_trait::async_trait;

use crate::entities::{AdListing, Fetched, InventoryItem, KeywordFetchParams};

/// Keyword provider client. Never fails: upstream problems yield the default set.
#[async_trait]
pub trait KeywordFetcher: Send + Sync {
    async fn fetch_keywords(&self, params: &KeywordFetchParams) -> Fetched<InventoryItem>;
}

/// Sponsored listing feed client. Never fails: upstream problems yield the default set.
#[async_trait]
pub trait AdFetcher: Send + Sync {
    async fn fetch_ads(&self) -> Fetched<AdListing>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_telemetry(&self) -> anyhow::Result<bool>;
    async fn check_templates(&self) -> anyhow::Result<bool>;
}
