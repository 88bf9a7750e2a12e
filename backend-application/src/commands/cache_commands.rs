use tracing::info;

use crate::AppState;

/// Drops every cached rule list and publisher config.
pub async fn clear_caches(state: &AppState) {
    state.rule_resolver.clear().await;
    state.publisher_configs.clear().await;
    info!("rule and publisher config caches cleared");
}
