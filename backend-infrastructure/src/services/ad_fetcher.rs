use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use backend_domain::{default_ads, AdFetcher, AdListing, Fetched};

use crate::services::inventory_normalizer::normalize_ads;
use crate::services::upstream::{build_client, read_body, UpstreamError};

const USER_AGENT: &str = "AdService/1.0";

/// Sponsored listing feed client. Any failure degrades to the built-in listings.
pub struct HttpAdFetcher {
    client: Client,
    feed_url: String,
}

impl HttpAdFetcher {
    pub fn new(feed_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout, USER_AGENT)?,
            feed_url: feed_url.into(),
        })
    }

    async fn try_fetch(&self) -> Result<Vec<AdListing>, UpstreamError> {
        let response = self.client.get(&self.feed_url).send().await?;
        let body = read_body(response).await?;
        let ads = normalize_ads(&body)?;
        if ads.is_empty() {
            return Err(UpstreamError::Empty);
        }
        Ok(ads)
    }
}

#[async_trait]
impl AdFetcher for HttpAdFetcher {
    async fn fetch_ads(&self) -> Fetched<AdListing> {
        match self.try_fetch().await {
            Ok(ads) => Fetched::upstream(ads),
            Err(err) => {
                warn!(error = %err, "ad feed unavailable, using default listings");
                Fetched::fallback(default_ads())
            }
        }
    }
}
