// In-process fakes for the port traits, shared by the unit tests of this crate

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend_domain::ports::{
    AdFetcher, HealthCheckService, KeywordFetcher, PublisherConfigRepository, RuleRepository,
    TelemetryRepository, TemplateRepository,
};
use backend_domain::{
    default_ads, default_keywords, AdClick, AdListing, Fetched, InventoryItem, KeywordClick,
    KeywordFetchParams, KeywordImpression, KeywordProviderConfig, PublisherConfig, RuleRecord,
    RuntimeConfig,
};

use crate::{AppState, ClickAccumulator, Metrics, PublisherConfigResolver, RuleResolver};

pub fn rule_record(
    id: i64,
    name: &str,
    publisher_id: i64,
    user_agent: &str,
    action: &str,
) -> RuleRecord {
    RuleRecord {
        id,
        rule_name: name.to_string(),
        publisher_id,
        user_agent: user_agent.to_string(),
        country_code: "US".to_string(),
        action: action.to_string(),
    }
}

pub fn keyword_markup(slots: usize) -> String {
    (1..=slots)
        .map(|n| {
            format!(
                r#"<div class="keyword-item"><a href="{{{{.KwHref{n}}}}}">{{{{.KwTitle{n}}}}}</a></div>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn serp_markup(slots: usize) -> String {
    (1..=slots)
        .map(|n| format!(r#"<a href="{{{{.AdHref{n}}}}}">{{{{.AdTitle{n}}}}}</a>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        admin_token: Some("secret".to_string()),
        keyword_api_base: "http://127.0.0.1:9/keywords".to_string(),
        ad_feed_url: "http://127.0.0.1:9/ads".to_string(),
        upstream_timeout_seconds: 1,
        template_dir: "storage/html".to_string(),
        rules_path: None,
        publisher_configs_path: None,
        cache_sweep_seconds: 60,
        min_keyword_slots: 6,
        min_ad_slots: 3,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 10,
        keyword_provider: KeywordProviderConfig::default(),
    }
}

#[derive(Default)]
pub struct FakeRuleRepo {
    rules: Mutex<Vec<RuleRecord>>,
    fail: bool,
    list_calls: AtomicUsize,
}

impl FakeRuleRepo {
    pub fn with_rules(rules: Vec<RuleRecord>) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn replace(&self, rules: Vec<RuleRecord>) {
        *self.rules.lock().expect("rules lock") = rules;
    }
}

#[async_trait]
impl RuleRepository for FakeRuleRepo {
    async fn list_for_publisher(&self, publisher_id: i64) -> anyhow::Result<Vec<RuleRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("rule storage unavailable");
        }
        let rules = self.rules.lock().expect("rules lock");
        Ok(rules
            .iter()
            .filter(|rule| rule.publisher_id == publisher_id)
            .cloned()
            .collect())
    }

    async fn upsert_rule(&self, mut record: RuleRecord) -> anyhow::Result<RuleRecord> {
        let mut rules = self.rules.lock().expect("rules lock");
        if let Some(existing) = rules.iter_mut().find(|rule| {
            rule.publisher_id == record.publisher_id && rule.rule_name == record.rule_name
        }) {
            record.id = existing.id;
            *existing = record.clone();
            return Ok(record);
        }
        record.id = rules.iter().map(|rule| rule.id).max().unwrap_or(0) + 1;
        rules.push(record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct FakeConfigRepo {
    configs: Mutex<HashMap<i64, PublisherConfig>>,
    fail: bool,
    load_calls: AtomicUsize,
}

impl FakeConfigRepo {
    pub fn with_configs(configs: Vec<PublisherConfig>) -> Self {
        Self {
            configs: Mutex::new(
                configs
                    .into_iter()
                    .map(|config| (config.publisher_id, config))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublisherConfigRepository for FakeConfigRepo {
    async fn load_publisher_config(
        &self,
        publisher_id: i64,
    ) -> anyhow::Result<Option<PublisherConfig>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("config storage unavailable");
        }
        Ok(self.configs.lock().expect("configs lock").get(&publisher_id).cloned())
    }

    async fn upsert_publisher_config(&self, config: &PublisherConfig) -> anyhow::Result<()> {
        self.configs
            .lock()
            .expect("configs lock")
            .insert(config.publisher_id, config.clone());
        Ok(())
    }

    async fn list_publisher_configs(&self) -> anyhow::Result<Vec<PublisherConfig>> {
        Ok(self.configs.lock().expect("configs lock").values().cloned().collect())
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    fail: AtomicBool,
    impressions: Mutex<Vec<KeywordImpression>>,
    keyword_clicks: Mutex<Vec<KeywordClick>>,
    ad_clicks: Mutex<Vec<AdClick>>,
    domains: Mutex<Vec<(i64, String)>>,
}

impl RecordingTelemetry {
    pub fn impressions(&self) -> Vec<KeywordImpression> {
        self.impressions.lock().expect("lock").clone()
    }

    pub fn keyword_clicks(&self) -> Vec<KeywordClick> {
        self.keyword_clicks.lock().expect("lock").clone()
    }

    pub fn ad_clicks(&self) -> Vec<AdClick> {
        self.ad_clicks.lock().expect("lock").clone()
    }

    pub fn domains(&self) -> Vec<(i64, String)> {
        self.domains.lock().expect("lock").clone()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("telemetry store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl TelemetryRepository for RecordingTelemetry {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.check()
    }

    async fn record_publisher_domain(&self, publisher_id: i64, domain: &str) -> anyhow::Result<()> {
        self.check()?;
        self.domains
            .lock()
            .expect("lock")
            .push((publisher_id, domain.to_string()));
        Ok(())
    }

    async fn insert_keyword_impressions(&self, rows: &[KeywordImpression]) -> anyhow::Result<()> {
        self.check()?;
        self.impressions.lock().expect("lock").extend_from_slice(rows);
        Ok(())
    }

    async fn insert_keyword_click(&self, row: &KeywordClick) -> anyhow::Result<()> {
        self.check()?;
        self.keyword_clicks.lock().expect("lock").push(row.clone());
        Ok(())
    }

    async fn insert_ad_click(&self, row: &AdClick) -> anyhow::Result<()> {
        self.check()?;
        self.ad_clicks.lock().expect("lock").push(row.clone());
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check()
    }
}

#[derive(Default)]
pub struct FakeTemplates {
    templates: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl TemplateRepository for FakeTemplates {
    async fn read_template(&self, reference: &str) -> anyhow::Result<String> {
        self.templates
            .lock()
            .expect("templates lock")
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("template not found: {reference}"))
    }
}

#[derive(Default)]
pub struct CountingKeywordFetcher {
    items: Mutex<Vec<InventoryItem>>,
    fallback: AtomicBool,
    calls: AtomicUsize,
    last_params: Mutex<Option<KeywordFetchParams>>,
}

impl CountingKeywordFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<KeywordFetchParams> {
        self.last_params.lock().expect("params lock").clone()
    }
}

#[async_trait]
impl KeywordFetcher for CountingKeywordFetcher {
    async fn fetch_keywords(&self, params: &KeywordFetchParams) -> Fetched<InventoryItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().expect("params lock") = Some(params.clone());
        let items = self.items.lock().expect("items lock").clone();
        if self.fallback.load(Ordering::SeqCst) || items.is_empty() {
            return Fetched::fallback(default_keywords());
        }
        Fetched::upstream(items)
    }
}

#[derive(Default)]
pub struct CountingAdFetcher {
    calls: AtomicUsize,
}

impl CountingAdFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdFetcher for CountingAdFetcher {
    async fn fetch_ads(&self) -> Fetched<AdListing> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ads = default_ads();
        ads.extend(default_ads());
        Fetched::upstream(ads)
    }
}

pub struct FakeHealth;

#[async_trait]
impl HealthCheckService for FakeHealth {
    async fn check_telemetry(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn check_templates(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// An `AppState` wired to fakes, plus handles to inspect them.
pub struct TestHarness {
    pub state: AppState,
    pub rules: Arc<FakeRuleRepo>,
    pub configs: Arc<FakeConfigRepo>,
    pub telemetry: Arc<RecordingTelemetry>,
    pub templates: Arc<FakeTemplates>,
    pub keywords: Arc<CountingKeywordFetcher>,
    pub ads: Arc<CountingAdFetcher>,
}

impl TestHarness {
    pub fn new() -> Self {
        let rules = Arc::new(FakeRuleRepo::default());
        let configs = Arc::new(FakeConfigRepo::default());
        let telemetry = Arc::new(RecordingTelemetry::default());
        let templates = Arc::new(FakeTemplates::default());
        let keywords = Arc::new(CountingKeywordFetcher::default());
        let ads = Arc::new(CountingAdFetcher::default());

        let rule_repo: Arc<dyn RuleRepository> = rules.clone();
        let config_repo: Arc<dyn PublisherConfigRepository> = configs.clone();
        let state = AppState {
            config: test_config(),
            rule_resolver: Arc::new(RuleResolver::new(Some(rule_repo.clone()))),
            publisher_configs: Arc::new(PublisherConfigResolver::new(Some(config_repo.clone()))),
            rule_repo: Some(rule_repo),
            publisher_config_repo: Some(config_repo),
            telemetry_repo: telemetry.clone(),
            template_repo: templates.clone(),
            keyword_fetcher: keywords.clone(),
            ad_fetcher: ads.clone(),
            health_service: Arc::new(FakeHealth),
            click_stats: Arc::new(ClickAccumulator::new()),
            metrics: Arc::new(Metrics::default()),
        };
        Self {
            state,
            rules,
            configs,
            telemetry,
            templates,
            keywords,
            ads,
        }
    }

    pub fn with_rules(self, rules: Vec<RuleRecord>) -> Self {
        self.rules.replace(rules);
        self
    }

    pub fn with_publisher_config(self, config: PublisherConfig) -> Self {
        self.configs
            .configs
            .lock()
            .expect("configs lock")
            .insert(config.publisher_id, config);
        self
    }

    pub fn with_template(self, reference: &str, markup: &str) -> Self {
        self.templates
            .templates
            .lock()
            .expect("templates lock")
            .insert(reference.to_string(), markup.to_string());
        self
    }

    pub fn with_keywords(self, items: Vec<InventoryItem>) -> Self {
        *self.keywords.items.lock().expect("items lock") = items;
        self
    }

    pub fn with_keyword_fallback(self) -> Self {
        self.keywords.fallback.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_telemetry(self) -> Self {
        self.telemetry.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn without_storage(mut self) -> Self {
        self.state.rule_repo = None;
        self.state.publisher_config_repo = None;
        self.state.rule_resolver = Arc::new(RuleResolver::new(None));
        self.state.publisher_configs = Arc::new(PublisherConfigResolver::new(None));
        self
    }
}
