use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use backend_application::commands::{cache_commands, publisher_config_commands, rule_commands};
use backend_application::queries::{publisher_config_queries, rule_queries};
use backend_application::AppState;
use backend_domain::{PublisherConfig, RuleRecord, RuleUpsert};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
pub struct PublisherQuery {
    pub publisher_id: Option<i64>,
}

pub async fn upsert_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RuleUpsert>,
) -> Result<Json<RuleRecord>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let record = rule_commands::upsert_rule(&state, payload).await?;
    Ok(Json(record))
}

pub async fn list_rules(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublisherQuery>,
) -> Result<Json<Vec<RuleRecord>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rules = rule_queries::list_rules(&state, query.publisher_id.unwrap_or(0)).await?;
    Ok(Json(rules))
}

pub async fn upsert_publisher_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PublisherConfig>,
) -> Result<Json<PublisherConfig>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let config = publisher_config_commands::upsert_publisher_config(&state, payload).await?;
    Ok(Json(config))
}

/// Lists stored configs, or the effective config for one publisher when `publisher_id` is given.
pub async fn list_publisher_configs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublisherQuery>,
) -> Result<Json<Vec<PublisherConfig>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    if let Some(publisher_id) = query.publisher_id {
        let config =
            publisher_config_queries::effective_publisher_config(&state, publisher_id).await;
        return Ok(Json(vec![config]));
    }
    let configs = publisher_config_queries::list_publisher_configs(&state).await?;
    Ok(Json(configs))
}

pub async fn clear_caches(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    cache_commands::clear_caches(&state).await;
    Ok(StatusCode::NO_CONTENT)
}
