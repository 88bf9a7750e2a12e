use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use backend_domain::utils::top_level_domain;
use backend_domain::{
    default_keywords, Fetched, InventoryItem, KeywordFetchParams, KeywordFetcher,
    KeywordProviderConfig, DEFAULT_COUNTRY_CODE, DEFAULT_LAYOUT_ID, DEFAULT_TEMPLATE_SIZE,
};

use crate::services::inventory_normalizer::normalize_keywords;
use crate::services::upstream::{build_client, read_body, UpstreamError};

const USER_AGENT: &str = "KeywordService/1.0";
const DEFAULT_MAX_RESULTS: usize = 5;

/// Keyword provider client. Any failure degrades to the built-in keyword set.
pub struct HttpKeywordFetcher {
    client: Client,
    base_url: String,
    provider: KeywordProviderConfig,
}

impl HttpKeywordFetcher {
    pub fn new(
        base_url: impl Into<String>,
        provider: KeywordProviderConfig,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout, USER_AGENT)?,
            base_url: base_url.into(),
            provider,
        })
    }

    pub fn request_url(&self, params: &KeywordFetchParams) -> Result<Url, UpstreamError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| UpstreamError::Url(err.to_string()))?;
        let max_results = if params.max_results > 0 {
            params.max_results
        } else {
            DEFAULT_MAX_RESULTS
        }
        .to_string();
        {
            let provider = &self.provider;
            let mut query = url.query_pairs_mut();
            query
                .append_pair("maxno", &max_results)
                .append_pair("actno", &max_results)
                .append_pair("json", "1")
                .append_pair("type", "1")
                .append_pair("https", "1")
                .append_pair("csid", &provider.csid)
                .append_pair("pid", &provider.pid)
                .append_pair("partnerid", &provider.partner_id)
                .append_pair("fpid", &provider.fpid)
                .append_pair("crid", &provider.crid)
                .append_pair("combineExpired", "1")
                .append_pair("fm_skc", "1")
                .append_pair("lmsc", "1")
                .append_pair("hs", "3")
                .append_pair("kf", "0")
                .append_pair("kwrd", "0")
                .append_pair("py", "1")
                .append_pair("pt", "60")
                .append_pair("uftr", "0")
                .append_pair("ugd", "4")
                .append_pair("ykf", "1")
                .append_pair("stag_tq_block", "1")
                .append_pair("calling_source", &provider.calling_source)
                .append_pair("pstag", &provider.pstag)
                .append_pair("stags", &provider.stags)
                .append_pair("mtags", &provider.mtags)
                .append_pair("cc", or_default(&params.country_code, DEFAULT_COUNTRY_CODE))
                .append_pair(
                    "lid",
                    &if params.layout_id > 0 {
                        params.layout_id
                    } else {
                        DEFAULT_LAYOUT_ID
                    }
                    .to_string(),
                )
                .append_pair("tsize", or_default(&params.template_size, DEFAULT_TEMPLATE_SIZE));
            if let Some(domain) = params.domain.as_deref() {
                query.append_pair("d", domain);
                if let Some(tld) = top_level_domain(domain) {
                    query.append_pair("dtld", tld);
                }
            }
            if let Some(title) = params.page_title.as_deref() {
                query.append_pair("ptitle", title);
            }
            if let Some(referrer) = params.referrer_url.as_deref() {
                query.append_pair("rurl", referrer);
            }
            if let Some(keyword_ref) = params.keyword_ref.as_deref() {
                query.append_pair("kwrf", keyword_ref);
            }
        }
        Ok(url)
    }

    async fn try_fetch(
        &self,
        params: &KeywordFetchParams,
    ) -> Result<Vec<InventoryItem>, UpstreamError> {
        let url = self.request_url(params)?;
        debug!(url = %url, "keyword provider request");
        let response = self.client.get(url).send().await?;
        let body = read_body(response).await?;
        let items = normalize_keywords(&body)?;
        if items.is_empty() {
            return Err(UpstreamError::Empty);
        }
        Ok(items)
    }
}

#[async_trait]
impl KeywordFetcher for HttpKeywordFetcher {
    async fn fetch_keywords(&self, params: &KeywordFetchParams) -> Fetched<InventoryItem> {
        match self.try_fetch(params).await {
            Ok(items) => Fetched::upstream(items),
            Err(err) => {
                warn!(error = %err, "keyword provider unavailable, using default keywords");
                Fetched::fallback(default_keywords())
            }
        }
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
