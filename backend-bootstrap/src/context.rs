use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clickhouse::Client;
use tracing::{info, warn};

use backend_application::{
    AppState, ClickAccumulator, Metrics, PublisherConfigResolver, RuleResolver,
};
use backend_domain::{
    AdFetcher, DbConfig, HealthCheckService, KeywordFetcher, PublisherConfigRepository,
    RuleRepository, TelemetryRepository, TemplateRepository,
};
use backend_infrastructure::{
    AppConfig, ClickhouseTelemetryRepo, DefaultHealthService, DisabledTelemetryRepository,
    FilePublisherConfigRepository, FileRuleRepository, FileTemplateRepository, HttpAdFetcher,
    HttpKeywordFetcher,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let telemetry_repo = build_telemetry(&db_config).await;

        let rule_repo: Option<Arc<dyn RuleRepository>> = match &runtime_config.rules_path {
            Some(path) => Some(Arc::new(FileRuleRepository::load(path).await?)),
            None => {
                warn!("rules_path not set, every publisher gets the default rule");
                None
            }
        };
        let publisher_config_repo: Option<Arc<dyn PublisherConfigRepository>> =
            match &runtime_config.publisher_configs_path {
                Some(path) => Some(Arc::new(FilePublisherConfigRepository::load(path).await?)),
                None => None,
            };

        let template_repo: Arc<dyn TemplateRepository> =
            Arc::new(FileTemplateRepository::new(&runtime_config.template_dir));
        let upstream_timeout = Duration::from_secs(runtime_config.upstream_timeout_seconds);
        let keyword_fetcher: Arc<dyn KeywordFetcher> = Arc::new(HttpKeywordFetcher::new(
            runtime_config.keyword_api_base.clone(),
            runtime_config.keyword_provider.clone(),
            upstream_timeout,
        )?);
        let ad_fetcher: Arc<dyn AdFetcher> = Arc::new(HttpAdFetcher::new(
            runtime_config.ad_feed_url.clone(),
            upstream_timeout,
        )?);
        let health_service: Arc<dyn HealthCheckService> = Arc::new(DefaultHealthService::new(
            telemetry_repo.clone(),
            template_repo.clone(),
        ));

        let sweep_every = Duration::from_secs(runtime_config.cache_sweep_seconds);
        let rule_resolver = Arc::new(RuleResolver::new(rule_repo.clone()));
        rule_resolver.start_sweeper(sweep_every);
        let publisher_configs =
            Arc::new(PublisherConfigResolver::new(publisher_config_repo.clone()));
        publisher_configs.start_sweeper(sweep_every);

        let state = AppState {
            config: runtime_config,
            rule_resolver,
            publisher_configs,
            rule_repo,
            publisher_config_repo,
            telemetry_repo,
            template_repo,
            keyword_fetcher,
            ad_fetcher,
            health_service,
            click_stats: Arc::new(ClickAccumulator::default()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}

/// ClickHouse when configured; otherwise writes are discarded.
async fn build_telemetry(db_config: &DbConfig) -> Arc<dyn TelemetryRepository> {
    let Some(url) = &db_config.clickhouse_url else {
        info!("clickhouse_url not set, telemetry disabled");
        return Arc::new(DisabledTelemetryRepository);
    };

    let mut clickhouse = Client::default()
        .with_url(url)
        .with_database(&db_config.clickhouse_database);
    if let Some(user) = &db_config.clickhouse_user {
        clickhouse = clickhouse.with_user(user);
    }
    if let Some(password) = &db_config.clickhouse_password {
        clickhouse = clickhouse.with_password(password);
    }

    let repo = ClickhouseTelemetryRepo::new(clickhouse, db_config.clickhouse_database.clone());
    if let Err(err) = repo.ensure_schema().await {
        warn!(error = %err, "telemetry schema setup failed");
    }
    Arc::new(repo)
}
