use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    ad_click, clear_caches, decide_ads, decide_keywords, health_live, health_ready,
    impression_pixel, list_click_stats, list_publisher_configs, list_rules, metrics_prometheus,
    upsert_publisher_config, upsert_rule,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/decide/keywords", get(decide_keywords))
        .route("/v1/decide/ads", get(decide_ads))
        .route("/v1/ad-click", get(ad_click))
        .route("/v1/impressions", get(impression_pixel))
        .route("/v1/admin/rules", get(list_rules).put(upsert_rule))
        .route(
            "/v1/admin/publisher-configs",
            get(list_publisher_configs).put(upsert_publisher_config),
        )
        .route("/v1/admin/cache/clear", post(clear_caches))
        .route("/v1/ops/health/live", get(health_live))
        .route("/v1/ops/health/ready", get(health_ready))
        .route("/v1/ops/metrics/prometheus", get(metrics_prometheus))
        .route("/v1/ops/click-stats", get(list_click_stats))
        .with_state(state)
}
