use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use backend_application::commands::telemetry_commands::{
    self, AdClickInput, ImpressionBatch,
};
use backend_application::AppState;
use backend_domain::utils::parse_i64_or_zero;
use backend_domain::{is_bot_user_agent, InventoryItem};

use crate::error::HttpError;
use crate::middleware::{safe_target_url, visitor};

/// Transparent 1x1 GIF.
pub const TRACKING_PIXEL: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

#[derive(Debug, Default, Deserialize)]
pub struct AdClickQuery {
    pub u: Option<String>,
    pub slot: Option<String>,
    pub kid: Option<String>,
    pub q: Option<String>,
    pub adhost: Option<String>,
    pub pid: Option<String>,
    pub adtitle: Option<String>,
    pub cc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImpressionQuery {
    pub pid: Option<String>,
    pub slot: Option<String>,
    pub cc: Option<String>,
    pub d: Option<String>,
    /// Comma separated keyword texts.
    pub keywords: Option<String>,
    /// Comma separated ids aligned with `keywords`.
    pub keyword_ids: Option<String>,
}

impl ImpressionQuery {
    fn into_batch(self) -> ImpressionBatch {
        let ids: Vec<i64> = self
            .keyword_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(parse_i64_or_zero)
            .collect();
        let keywords = self
            .keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .enumerate()
            .map(|(idx, text)| InventoryItem::new(text.trim(), ids.get(idx).copied().unwrap_or(0)))
            .filter(|item| !item.text.is_empty())
            .collect();
        ImpressionBatch {
            publisher_id: self.pid.as_deref().map(parse_i64_or_zero).unwrap_or(0),
            slot: self.slot.unwrap_or_default().trim().to_string(),
            country_code: self.cc.unwrap_or_default().trim().to_uppercase(),
            domain: self.d,
            keywords,
        }
    }
}

/// Records the click, then redirects to the advertiser. Bots get a plain acknowledgement.
pub async fn ad_click(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<AdClickQuery>,
) -> Result<Response, HttpError> {
    let raw_target = query.u.as_deref().map(str::trim).unwrap_or_default();
    if raw_target.is_empty() {
        return Err(HttpError::BadRequest("missing target".to_string()));
    }
    let target = safe_target_url(raw_target)
        .ok_or_else(|| HttpError::BadRequest("invalid target".to_string()))?;

    let visitor = visitor(&headers, peer.map(|ConnectInfo(addr)| addr));
    let is_bot = is_bot_user_agent(&visitor.user_agent);
    let input = AdClickInput {
        publisher_id: query.pid.as_deref().map(parse_i64_or_zero).unwrap_or(0),
        slot: query.slot.unwrap_or_default().trim().to_string(),
        keyword_id: query.kid.as_deref().map(parse_i64_or_zero).unwrap_or(0),
        query: query.q.unwrap_or_default().trim().to_string(),
        ad_title: query.adtitle.unwrap_or_default().trim().to_string(),
        ad_host: query.adhost.unwrap_or_default().trim().to_string(),
        target_url: target.clone(),
        country_code: query.cc.unwrap_or_default().trim().to_uppercase(),
    };
    let count = telemetry_commands::record_ad_click(&state, input, &visitor).await;
    debug!(count, is_bot, "ad click recorded");

    if is_bot {
        return Ok((StatusCode::OK, "Click logged").into_response());
    }
    let location = HeaderValue::from_str(&target)
        .map_err(|_| HttpError::BadRequest("invalid target".to_string()))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub async fn impression_pixel(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<ImpressionQuery>,
) -> Response {
    let batch = query.into_batch();
    if !batch.keywords.is_empty() {
        let visitor = visitor(&headers, peer.map(|ConnectInfo(addr)| addr));
        let state = state.clone();
        tokio::spawn(async move {
            telemetry_commands::record_keyword_impressions(&state, batch, &visitor).await;
        });
    }
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/gif")),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ),
        ],
        TRACKING_PIXEL.to_vec(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impression_query_pairs_keywords_with_ids() {
        let batch = ImpressionQuery {
            pid: Some("100".to_string()),
            slot: Some(" abc ".to_string()),
            cc: Some("us".to_string()),
            d: Some("forbes.com".to_string()),
            keywords: Some("cheap flights, ,hotel deals,car hire".to_string()),
            keyword_ids: Some("11,0,x".to_string()),
        }
        .into_batch();
        assert_eq!(batch.publisher_id, 100);
        assert_eq!(batch.slot, "abc");
        assert_eq!(batch.country_code, "US");
        assert_eq!(
            batch.keywords,
            vec![
                InventoryItem::new("cheap flights", 11),
                InventoryItem::new("hotel deals", 0),
                InventoryItem::new("car hire", 0),
            ]
        );
    }

    #[test]
    fn tracking_pixel_is_a_gif() {
        assert!(TRACKING_PIXEL.starts_with(b"GIF89a"));
        assert_eq!(TRACKING_PIXEL.last(), Some(&0x3b));
    }
}
