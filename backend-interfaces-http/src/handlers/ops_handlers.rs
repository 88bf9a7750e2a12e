use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::queries::click_stat_queries;
use backend_application::AppState;
use backend_domain::ClickStat;

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
pub struct ClickStatQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ReadyStatus {
    telemetry: &'static str,
    templates: &'static str,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready when telemetry answers a ping and both default templates are readable.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);

    let telemetry = match timeout(timeout_duration, state.health_service.check_telemetry()).await {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) => "error",
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            "error"
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            "timeout"
        }
    };
    let templates = match state.health_service.check_templates().await {
        Ok(true) => "ok",
        Ok(false) => "error",
        Err(err) => {
            error!("template check failed: {}", err);
            "error"
        }
    };

    let status = if telemetry == "ok" && templates == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyStatus { telemetry, templates }))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let mut payload = state.metrics.render_prometheus();
    payload.push_str(&format!(
        "# TYPE adserve_click_stat_keys gauge\n\
adserve_click_stat_keys {}\n\
# TYPE adserve_rule_cache_publishers gauge\n\
adserve_rule_cache_publishers {}\n\
# TYPE adserve_publisher_config_cache_publishers gauge\n\
adserve_publisher_config_cache_publishers {}\n",
        state.click_stats.len(),
        state.rule_resolver.cached_publishers().await,
        state.publisher_configs.cached_publishers().await
    ));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}

pub async fn list_click_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ClickStatQuery>,
) -> Result<Json<Vec<ClickStat>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(click_stat_queries::list_click_stats(&state, query.limit)))
}
