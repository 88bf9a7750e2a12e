use backend_domain::{AdClick, ClickStatKey, InventoryItem, KeywordClick, KeywordImpression};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::AppState;

/// Who produced an event, as seen by the HTTP edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visitor {
    pub client_ip: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpressionBatch {
    pub publisher_id: i64,
    pub slot: String,
    pub country_code: String,
    pub domain: Option<String>,
    pub keywords: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdClickInput {
    pub publisher_id: i64,
    pub slot: String,
    pub keyword_id: i64,
    pub query: String,
    pub ad_title: String,
    pub ad_host: String,
    pub target_url: String,
    pub country_code: String,
}

/// Writes one impression row per non-blank keyword. Failures are logged and counted.
pub async fn record_keyword_impressions(
    state: &AppState,
    batch: ImpressionBatch,
    visitor: &Visitor,
) {
    if batch.publisher_id > 0 {
        if let Some(domain) = batch.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            if let Err(err) = state
                .telemetry_repo
                .record_publisher_domain(batch.publisher_id, domain)
                .await
            {
                state.metrics.record_telemetry_error();
                warn!(
                    publisher_id = batch.publisher_id,
                    error = %err,
                    "publisher domain write failed"
                );
            }
        }
    }

    let event_time_ms = Utc::now().timestamp_millis();
    let rows: Vec<KeywordImpression> = batch
        .keywords
        .iter()
        .filter(|item| !item.text.trim().is_empty())
        .map(|item| KeywordImpression {
            event_id: Uuid::new_v4().to_string(),
            event_time_ms,
            publisher_id: batch.publisher_id,
            keyword_id: item.id.filter(|id| *id != 0),
            keyword_title: item.text.trim().to_string(),
            slot: batch.slot.clone(),
            client_ip: visitor.client_ip.clone(),
            user_agent: visitor.user_agent.clone(),
            country_code: batch.country_code.clone(),
        })
        .collect();
    if rows.is_empty() {
        return;
    }

    match state.telemetry_repo.insert_keyword_impressions(&rows).await {
        Ok(()) => {
            state.metrics.record_impressions(rows.len());
            debug!(publisher_id = batch.publisher_id, count = rows.len(), "impressions recorded");
        }
        Err(err) => {
            state.metrics.record_telemetry_error();
            warn!(publisher_id = batch.publisher_id, error = %err, "impression write failed");
        }
    }
}

/// Keyword clicks are only persisted for known publishers.
pub async fn record_keyword_click(
    state: &AppState,
    publisher_id: i64,
    slot: &str,
    keyword_id: Option<i64>,
    keyword_title: &str,
    visitor: &Visitor,
) {
    if publisher_id <= 0 {
        return;
    }
    let row = KeywordClick {
        event_id: Uuid::new_v4().to_string(),
        event_time_ms: Utc::now().timestamp_millis(),
        publisher_id,
        slot: slot.to_string(),
        keyword_id: keyword_id.filter(|id| *id != 0),
        keyword_title: keyword_title.to_string(),
        client_ip: visitor.client_ip.clone(),
        user_agent: visitor.user_agent.clone(),
    };
    match state.telemetry_repo.insert_keyword_click(&row).await {
        Ok(()) => state.metrics.record_click(),
        Err(err) => {
            state.metrics.record_telemetry_error();
            warn!(publisher_id, error = %err, "keyword click write failed");
        }
    }
}

/// Counts the click in memory, then persists it for known publishers.
/// Returns the in-memory count, which does not depend on the persisted write.
pub async fn record_ad_click(state: &AppState, input: AdClickInput, visitor: &Visitor) -> u64 {
    let count = state.click_stats.increment(ClickStatKey {
        slot: input.slot.clone(),
        keyword_id: input.keyword_id.to_string(),
        query: input.query.clone(),
        ad_host: input.ad_host.clone(),
    });

    if input.publisher_id > 0 {
        let row = AdClick {
            event_id: Uuid::new_v4().to_string(),
            event_time_ms: Utc::now().timestamp_millis(),
            publisher_id: input.publisher_id,
            keyword_id: (input.keyword_id != 0).then_some(input.keyword_id),
            keyword_title: input.query,
            ad_title: input.ad_title,
            ad_host: input.ad_host,
            target_url: input.target_url,
            slot: input.slot,
            client_ip: visitor.client_ip.clone(),
            user_agent: visitor.user_agent.clone(),
            country_code: input.country_code,
        };
        match state.telemetry_repo.insert_ad_click(&row).await {
            Ok(()) => state.metrics.record_click(),
            Err(err) => {
                state.metrics.record_telemetry_error();
                warn!(publisher_id = row.publisher_id, error = %err, "ad click write failed");
            }
        }
    }
    count
}
