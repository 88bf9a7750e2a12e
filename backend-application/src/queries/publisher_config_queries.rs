use backend_domain::PublisherConfig;

use crate::{AppError, AppState};

pub async fn list_publisher_configs(state: &AppState) -> Result<Vec<PublisherConfig>, AppError> {
    let Some(repo) = state.publisher_config_repo.as_ref() else {
        return Ok(Vec::new());
    };
    let mut configs = repo.list_publisher_configs().await?;
    configs.sort_by_key(|config| config.publisher_id);
    Ok(configs)
}

/// The config a decision for this publisher would use right now.
pub async fn effective_publisher_config(state: &AppState, publisher_id: i64) -> PublisherConfig {
    state.publisher_configs.resolve(publisher_id).await
}
