use backend_domain::RuleRecord;

use crate::{AppError, AppState};

pub async fn list_rules(state: &AppState, publisher_id: i64) -> Result<Vec<RuleRecord>, AppError> {
    if publisher_id <= 0 {
        return Err(AppError::BadRequest("publisher_id must be positive".to_string()));
    }
    let Some(repo) = state.rule_repo.as_ref() else {
        return Ok(Vec::new());
    };
    let mut rules = repo.list_for_publisher(publisher_id).await?;
    rules.sort_by_key(|rule| rule.id);
    Ok(rules)
}
