use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use backend_application::commands::telemetry_commands::{self, ImpressionBatch};
use backend_application::decision::{self, capacity_hint};
use backend_application::AppState;
use backend_domain::utils::{parse_i64_or_zero, parse_tile_size};
use backend_domain::{AdListing, AdRequest, Decision, InventoryItem, KeywordRequest, TemplateKind};

use crate::error::HttpError;
use crate::middleware::{user_agent, visitor};

/// Query vocabulary shared by the keyword and ad decision endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionQuery {
    pub slot: Option<String>,
    pub pid: Option<String>,
    pub cc: Option<String>,
    pub lid: Option<String>,
    pub tsize: Option<String>,
    pub d: Option<String>,
    pub rurl: Option<String>,
    pub ptitle: Option<String>,
    pub kwrf: Option<String>,
    pub q: Option<String>,
    pub kid: Option<String>,
    pub maxads: Option<String>,
}

impl DecisionQuery {
    fn publisher_id(&self) -> i64 {
        self.pid.as_deref().map(parse_i64_or_zero).unwrap_or(0)
    }

    fn keyword_request(&self, user_agent: String) -> KeywordRequest {
        KeywordRequest {
            slot: self.slot.clone().unwrap_or_default(),
            publisher_id: self.publisher_id(),
            user_agent,
            country_code: self.cc.clone(),
            layout_id: self
                .lid
                .as_deref()
                .map(parse_i64_or_zero)
                .filter(|lid| *lid > 0),
            template_size: self.tsize.clone(),
            domain: self.d.clone(),
            referrer_url: self.rurl.clone(),
            page_title: self.ptitle.clone(),
            keyword_ref: self.kwrf.clone(),
        }
    }

    fn ad_request(&self, user_agent: String) -> AdRequest {
        AdRequest {
            slot: self.slot.clone().unwrap_or_default(),
            publisher_id: self.publisher_id(),
            user_agent,
            query: self.q.clone(),
            keyword_id: self
                .kid
                .as_deref()
                .map(parse_i64_or_zero)
                .filter(|id| *id != 0),
            country_code: self.cc.clone(),
            max_ads: self
                .maxads
                .as_deref()
                .and_then(|value| value.trim().parse::<usize>().ok()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct KeywordDecisionResponse {
    pub decision: Decision<InventoryItem>,
    pub tile: TileSize,
    /// Ad capacity of the follow-up results template, carried on keyword links.
    pub max_ads: usize,
}

#[derive(Debug, Serialize)]
pub struct AdDecisionResponse {
    pub decision: Decision<AdListing>,
    /// One tracked click link per delivered ad; empty for bots and blocked decisions.
    pub click_urls: Vec<String>,
}

pub async fn decide_keywords(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<DecisionQuery>,
) -> Result<Json<KeywordDecisionResponse>, HttpError> {
    let request = query.keyword_request(user_agent(&headers));
    let decision = decision::decide_keywords(&state, &request).await?;

    let (width, height) = parse_tile_size(
        decision
            .delivered()
            .map(|result| result.publisher.template_size.as_str())
            .or(request.template_size.as_deref())
            .unwrap_or_default(),
    );
    let max_ads = match decision.delivered() {
        Some(result) => {
            capacity_hint(
                &state,
                result.rule.serp_template(&result.publisher),
                TemplateKind::Serp,
            )
            .await
        }
        None => 0,
    };

    if let Some(result) = decision.delivered() {
        let batch = ImpressionBatch {
            publisher_id: request.publisher_id,
            slot: request.slot.trim().to_string(),
            country_code: result.rule.country_code.clone(),
            domain: request.domain.clone(),
            keywords: result.items.clone(),
        };
        let visitor = visitor(&headers, peer.map(|ConnectInfo(addr)| addr));
        let state = state.clone();
        tokio::spawn(async move {
            telemetry_commands::record_keyword_impressions(&state, batch, &visitor).await;
        });
    }

    Ok(Json(KeywordDecisionResponse {
        decision,
        tile: TileSize { width, height },
        max_ads,
    }))
}

pub async fn decide_ads(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<DecisionQuery>,
) -> Result<Json<AdDecisionResponse>, HttpError> {
    let request = query.ad_request(user_agent(&headers));
    let decision = decision::decide_ads(&state, &request).await?;

    let click_urls = match decision.delivered() {
        Some(result) if !result.is_bot => result
            .items
            .iter()
            .filter_map(|ad| ad_click_url(&request, &result.rule.country_code, ad))
            .collect(),
        _ => Vec::new(),
    };

    let query_text = request.query.as_deref().map(str::trim).unwrap_or_default();
    if !decision.is_blocked() && !query_text.is_empty() {
        let visitor = visitor(&headers, peer.map(|ConnectInfo(addr)| addr));
        let state = state.clone();
        let slot = request.slot.trim().to_string();
        let title = query_text.to_string();
        let publisher_id = request.publisher_id;
        let keyword_id = request.keyword_id;
        tokio::spawn(async move {
            telemetry_commands::record_keyword_click(
                &state,
                publisher_id,
                &slot,
                keyword_id,
                &title,
                &visitor,
            )
            .await;
        });
    }

    Ok(Json(AdDecisionResponse {
        decision,
        click_urls,
    }))
}

/// Relative tracking link for one ad, pointing at the click redirect endpoint.
pub fn ad_click_url(request: &AdRequest, country_code: &str, ad: &AdListing) -> Option<String> {
    let mut url = Url::parse("http://localhost/v1/ad-click").ok()?;
    url.query_pairs_mut()
        .append_pair("u", &ad.link)
        .append_pair("slot", request.slot.trim())
        .append_pair("kid", &request.keyword_id.unwrap_or(0).to_string())
        .append_pair("q", request.query.as_deref().unwrap_or_default().trim())
        .append_pair("adhost", &ad.host)
        .append_pair("pid", &request.publisher_id.to_string())
        .append_pair("adtitle", &ad.title)
        .append_pair("cc", country_code);
    Some(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> DecisionQuery {
        let mut query = DecisionQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "slot" => query.slot = value,
                "pid" => query.pid = value,
                "lid" => query.lid = value,
                "kid" => query.kid = value,
                "maxads" => query.maxads = value,
                "q" => query.q = value,
                _ => {}
            }
        }
        query
    }

    #[test]
    fn unparseable_numbers_become_absent() {
        let request = query(&[("slot", "abc"), ("pid", "x1"), ("lid", "0")])
            .keyword_request("Mozilla".to_string());
        assert_eq!(request.publisher_id, 0);
        assert_eq!(request.layout_id, None);

        let request = query(&[("pid", "100"), ("kid", "42"), ("maxads", "two")])
            .ad_request(String::new());
        assert_eq!(request.publisher_id, 100);
        assert_eq!(request.keyword_id, Some(42));
        assert_eq!(request.max_ads, None);
    }

    #[test]
    fn click_url_carries_ad_and_request_context() {
        let request = query(&[
            ("slot", "abc"),
            ("pid", "100"),
            ("kid", "7"),
            ("q", "cheap flights"),
        ])
        .ad_request(String::new());
        let ad = AdListing {
            title: "Fly & Save".to_string(),
            description: String::new(),
            link: "https://air.example.com/x?y=1".to_string(),
            host: "air.example.com".to_string(),
        };
        let url = ad_click_url(&request, "US", &ad).expect("url");
        assert!(url.starts_with("/v1/ad-click?u=https%3A%2F%2Fair.example.com%2Fx%3Fy%3D1"));
        assert!(url.contains("&q=cheap+flights"));
        assert!(url.contains("&adtitle=Fly+%26+Save"));
        assert!(url.contains("&pid=100"));
        assert!(url.ends_with("&cc=US"));
    }
}
