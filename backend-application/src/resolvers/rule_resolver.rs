use std::sync::Arc;
use std::time::Duration;

use backend_domain::ports::RuleRepository;
use backend_domain::services::select_rule;
use backend_domain::{RuleAction, RuleRecord, TargetingRule, DEFAULT_COUNTRY_CODE};
use tracing::{debug, warn};

use crate::ops::SweepingCache;

/// Resolves the effective targeting rule for (publisher, user agent).
///
/// Never fails: missing storage, storage errors and undecodable actions all
/// degrade to the built-in default rule or action.
pub struct RuleResolver {
    repo: Option<Arc<dyn RuleRepository>>,
    cache: SweepingCache<i64, Arc<Vec<RuleRecord>>>,
}

impl RuleResolver {
    pub fn new(repo: Option<Arc<dyn RuleRepository>>) -> Self {
        Self {
            repo,
            cache: SweepingCache::new("rules"),
        }
    }

    pub fn start_sweeper(&self, every: Duration) -> bool {
        self.cache.start_sweeper(every)
    }

    pub fn close(&self) {
        self.cache.close();
    }

    pub async fn resolve(
        &self,
        publisher_id: i64,
        user_agent: &str,
        country_hint: Option<&str>,
    ) -> TargetingRule {
        let Some(repo) = self.repo.as_ref() else {
            return TargetingRule::default_rule();
        };
        if publisher_id == 0 {
            return TargetingRule::default_rule();
        }

        let rules = match self.rules_for(repo.as_ref(), publisher_id).await {
            Ok(rules) => rules,
            Err(err) => {
                warn!(publisher_id, error = %err, "rule lookup failed, using default rule");
                return TargetingRule::default_rule();
            }
        };

        let Some(record) = select_rule(&rules, user_agent) else {
            return TargetingRule::default_rule();
        };

        let action = match record.decode_action() {
            Ok(action) => action,
            Err(err) => {
                warn!(
                    publisher_id,
                    rule_id = record.id,
                    error = %err,
                    "rule action is not valid json, using default action"
                );
                RuleAction::default()
            }
        };

        let mut rule = record.clone().into_rule(action);
        if rule.country_code.is_empty() {
            rule.country_code = country_hint
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_uppercase)
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());
        }
        debug!(publisher_id, rule_id = rule.id, rule = %rule.rule_name, "rule resolved");
        rule
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    pub async fn cached_publishers(&self) -> usize {
        self.cache.len().await
    }

    async fn rules_for(
        &self,
        repo: &dyn RuleRepository,
        publisher_id: i64,
    ) -> anyhow::Result<Arc<Vec<RuleRecord>>> {
        if let Some(rules) = self.cache.get(&publisher_id).await {
            return Ok(rules);
        }
        let generation = self.cache.generation();
        let loaded = Arc::new(repo.list_for_publisher(publisher_id).await?);
        if !self
            .cache
            .insert_if_current(publisher_id, Arc::clone(&loaded), generation)
            .await
        {
            debug!(publisher_id, "rules changed during load, result not cached");
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rule_record, FakeRuleRepo};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Returns its rules only after `release` is notified.
    struct GatedRuleRepo {
        rules: Vec<RuleRecord>,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RuleRepository for GatedRuleRepo {
        async fn list_for_publisher(&self, publisher_id: i64) -> anyhow::Result<Vec<RuleRecord>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self
                .rules
                .iter()
                .filter(|rule| rule.publisher_id == publisher_id)
                .cloned()
                .collect())
        }

        async fn upsert_rule(&self, record: RuleRecord) -> anyhow::Result<RuleRecord> {
            Ok(record)
        }
    }

    fn resolver(repo: &Arc<FakeRuleRepo>) -> RuleResolver {
        let repo: Arc<dyn RuleRepository> = repo.clone();
        RuleResolver::new(Some(repo))
    }

    #[tokio::test]
    async fn without_storage_every_request_gets_default_rule() {
        let resolver = RuleResolver::new(None);
        let rule = resolver.resolve(100, "Android", None).await;
        assert_eq!(rule, TargetingRule::default_rule());
    }

    #[tokio::test]
    async fn publisher_zero_skips_storage() {
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![rule_record(
            1,
            "android",
            0,
            "Android",
            "{}",
        )]));
        let rule = resolver(&repo).resolve(0, "Android", None).await;
        assert_eq!(rule.id, 0);
        assert_eq!(repo.list_calls(), 0);
    }

    #[tokio::test]
    async fn longest_matcher_and_new_tab_flag() {
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![
            rule_record(1, "default", 100, "", "{}"),
            rule_record(2, "android", 100, "Android", r#"{"open_in_new_tab":true}"#),
            rule_record(3, "android-chrome", 100, "Android 14", r#"{"block":true}"#),
        ]));
        let rule = resolver(&repo)
            .resolve(100, "Mozilla/5.0 (Linux; Android 14)", None)
            .await;
        assert_eq!(rule.rule_name, "android-chrome");
        assert!(rule.action.block);

        let rule = resolver(&repo)
            .resolve(100, "Mozilla/5.0 (Linux; Android 13)", None)
            .await;
        assert_eq!(rule.rule_name, "android");
        assert!(rule.action.open_in_new_tab);
    }

    #[tokio::test]
    async fn publisher_default_when_no_matcher_hits() {
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![
            rule_record(
                5,
                "default",
                100,
                "",
                r#"{"keyword_template_id":"KeywordTemplate2.html"}"#,
            ),
            rule_record(6, "android", 100, "Android", "{}"),
        ]));
        let rule = resolver(&repo).resolve(100, "Mozilla/5.0 (iPhone)", None).await;
        assert_eq!(rule.id, 5);
        assert_eq!(rule.action.keyword_template_id, "KeywordTemplate2.html");
    }

    #[tokio::test]
    async fn bad_action_json_keeps_rule_with_default_action() {
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![rule_record(
            7,
            "broken",
            100,
            "Android",
            "{not json",
        )]));
        let rule = resolver(&repo).resolve(100, "Android", None).await;
        assert_eq!(rule.id, 7);
        assert_eq!(rule.action, RuleAction::default());
    }

    #[tokio::test]
    async fn storage_error_degrades_to_default_rule() {
        let repo = Arc::new(FakeRuleRepo::failing());
        let rule = resolver(&repo).resolve(100, "Android", None).await;
        assert_eq!(rule, TargetingRule::default_rule());
    }

    #[tokio::test]
    async fn blank_rule_country_takes_hint_then_default() {
        let mut record = rule_record(1, "default", 100, "", "{}");
        record.country_code = String::new();
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![record]));
        let resolver = resolver(&repo);
        assert_eq!(resolver.resolve(100, "x", Some("de")).await.country_code, "DE");
        assert_eq!(resolver.resolve(100, "x", None).await.country_code, "US");
    }

    #[tokio::test]
    async fn rules_are_cached_until_cleared() {
        let repo = Arc::new(FakeRuleRepo::with_rules(vec![rule_record(
            1, "default", 100, "", "{}",
        )]));
        let resolver = resolver(&repo);
        resolver.resolve(100, "a", None).await;
        resolver.resolve(100, "b", None).await;
        assert_eq!(repo.list_calls(), 1);
        assert_eq!(resolver.cached_publishers().await, 1);
        resolver.clear().await;
        assert_eq!(resolver.cached_publishers().await, 0);
        resolver.resolve(100, "c", None).await;
        assert_eq!(repo.list_calls(), 2);
    }

    #[tokio::test]
    async fn rules_loaded_across_a_clear_are_not_cached() {
        let gated = Arc::new(GatedRuleRepo {
            rules: vec![rule_record(1, "default", 100, "", "{}")],
            entered: Notify::new(),
            release: Notify::new(),
        });
        let repo: Arc<dyn RuleRepository> = gated.clone();
        let resolver = Arc::new(RuleResolver::new(Some(repo)));

        let pending = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(100, "x", None).await })
        };
        gated.entered.notified().await;
        resolver.clear().await;
        gated.release.notify_one();

        let rule = pending.await.expect("resolve task");
        assert_eq!(rule.id, 1);
        assert_eq!(resolver.cached_publishers().await, 0);
    }
}
