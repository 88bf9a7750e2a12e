use backend_domain::utils::is_plain_template_name;
use backend_domain::{RuleRecord, RuleUpsert};
use tracing::info;

use crate::{AppError, AppState};

pub async fn upsert_rule(state: &AppState, payload: RuleUpsert) -> Result<RuleRecord, AppError> {
    let Some(repo) = state.rule_repo.as_ref() else {
        return Err(AppError::BadRequest("rule storage is not configured".to_string()));
    };
    let payload = payload.normalized();
    if payload.rule_name.is_empty() {
        return Err(AppError::BadRequest("rule_name must not be empty".to_string()));
    }
    if payload.publisher_id <= 0 {
        return Err(AppError::BadRequest("publisher_id must be positive".to_string()));
    }
    validate_country_code(&payload.country_code)?;
    validate_template_reference("serp_template_id", &payload.action.serp_template_id)?;
    validate_template_reference("keyword_template_id", &payload.action.keyword_template_id)?;

    let record = payload
        .to_record()
        .map_err(|err| AppError::Internal(err.into()))?;
    let saved = repo.upsert_rule(record).await?;
    state.rule_resolver.clear().await;
    info!(
        publisher_id = saved.publisher_id,
        rule_id = saved.id,
        rule = %saved.rule_name,
        "rule saved"
    );
    Ok(saved)
}

fn validate_country_code(value: &str) -> Result<(), AppError> {
    if value.is_empty() || (value.len() == 2 && value.chars().all(|ch| ch.is_ascii_alphabetic())) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "country_code must be a two-letter code, got {value}"
    )))
}

/// Blank references are allowed and resolve to the default template.
pub(crate) fn validate_template_reference(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Ok(());
    }
    if !is_plain_template_name(value) {
        return Err(AppError::BadRequest(format!(
            "{field} must be a plain template file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rule_record, TestHarness};
    use backend_domain::RuleAction;

    fn payload(name: &str, publisher_id: i64) -> RuleUpsert {
        RuleUpsert {
            rule_name: name.to_string(),
            publisher_id,
            user_agent: "Android".to_string(),
            country_code: "us".to_string(),
            action: RuleAction {
                open_in_new_tab: true,
                ..RuleAction::default()
            },
        }
    }

    #[tokio::test]
    async fn upsert_clears_cached_rules() {
        let harness = TestHarness::new().with_rules(vec![rule_record(1, "default", 100, "", "{}")]);
        let before = harness.state.rule_resolver.resolve(100, "Android", None).await;
        assert_eq!(before.rule_name, "default");

        let saved = upsert_rule(&harness.state, payload("android", 100))
            .await
            .expect("saved");
        assert!(saved.id > 0);
        assert_eq!(saved.country_code, "US");

        let after = harness.state.rule_resolver.resolve(100, "Android", None).await;
        assert_eq!(after.rule_name, "android");
        assert!(after.action.open_in_new_tab);
    }

    #[tokio::test]
    async fn rejects_invalid_payloads() {
        let harness = TestHarness::new();
        let err = upsert_rule(&harness.state, payload(" ", 100)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = upsert_rule(&harness.state, payload("x", 0)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut traversal = payload("x", 100);
        traversal.action.keyword_template_id = "../secrets.html".to_string();
        let err = upsert_rule(&harness.state, traversal).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut country = payload("x", 100);
        country.country_code = "USA".to_string();
        let err = upsert_rule(&harness.state, country).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn without_storage_upsert_is_rejected() {
        let harness = TestHarness::new().without_storage();
        let err = upsert_rule(&harness.state, payload("android", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
