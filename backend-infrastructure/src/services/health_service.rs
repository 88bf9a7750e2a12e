use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{HealthCheckService, TelemetryRepository, TemplateRepository};
use backend_domain::{DEFAULT_KEYWORD_TEMPLATE, DEFAULT_SERP_TEMPLATE};

pub struct DefaultHealthService {
    telemetry_repo: Arc<dyn TelemetryRepository>,
    template_repo: Arc<dyn TemplateRepository>,
}

impl DefaultHealthService {
    pub fn new(
        telemetry_repo: Arc<dyn TelemetryRepository>,
        template_repo: Arc<dyn TemplateRepository>,
    ) -> Self {
        Self {
            telemetry_repo,
            template_repo,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_telemetry(&self) -> anyhow::Result<bool> {
        self.telemetry_repo.ping().await.map(|_| true)
    }

    /// The fallback templates must be readable, every other template can degrade to them.
    async fn check_templates(&self) -> anyhow::Result<bool> {
        self.template_repo.read_template(DEFAULT_KEYWORD_TEMPLATE).await?;
        self.template_repo.read_template(DEFAULT_SERP_TEMPLATE).await?;
        Ok(true)
    }
}
