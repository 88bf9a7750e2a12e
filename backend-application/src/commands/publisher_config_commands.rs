use backend_domain::PublisherConfig;
use tracing::info;

use crate::commands::rule_commands::validate_template_reference;
use crate::{AppError, AppState};

pub async fn upsert_publisher_config(
    state: &AppState,
    payload: PublisherConfig,
) -> Result<PublisherConfig, AppError> {
    let Some(repo) = state.publisher_config_repo.as_ref() else {
        return Err(AppError::BadRequest(
            "publisher config storage is not configured".to_string(),
        ));
    };
    if payload.publisher_id <= 0 {
        return Err(AppError::BadRequest("publisher_id must be positive".to_string()));
    }
    validate_template_reference("serp_template", payload.serp_template.trim())?;
    validate_template_reference("keyword_template", payload.keyword_template.trim())?;

    let config = payload.normalized();
    repo.upsert_publisher_config(&config).await?;
    state.publisher_configs.clear().await;
    info!(
        publisher_id = config.publisher_id,
        layout_id = config.layout_id,
        "publisher config saved"
    );
    Ok(config)
}
