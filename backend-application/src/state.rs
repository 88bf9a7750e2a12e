use std::sync::Arc;

use backend_domain::ports::{
    AdFetcher, HealthCheckService, KeywordFetcher, PublisherConfigRepository, RuleRepository,
    TelemetryRepository, TemplateRepository,
};
use backend_domain::RuntimeConfig;

use crate::{ClickAccumulator, Metrics, PublisherConfigResolver, RuleResolver};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub rule_resolver: Arc<RuleResolver>,
    pub publisher_configs: Arc<PublisherConfigResolver>,
    /// `None` when the deployment has no rule storage; admin writes are rejected.
    pub rule_repo: Option<Arc<dyn RuleRepository>>,
    pub publisher_config_repo: Option<Arc<dyn PublisherConfigRepository>>,
    pub telemetry_repo: Arc<dyn TelemetryRepository>,
    pub template_repo: Arc<dyn TemplateRepository>,
    pub keyword_fetcher: Arc<dyn KeywordFetcher>,
    pub ad_fetcher: Arc<dyn AdFetcher>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub click_stats: Arc<ClickAccumulator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Stops background cache sweepers. Called once on shutdown.
    pub fn close(&self) {
        self.rule_resolver.close();
        self.publisher_configs.close();
    }
}
