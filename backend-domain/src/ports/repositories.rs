use async_trait::async_trait;

use crate::entities::{
    AdClick,
    KeywordClick,
    KeywordImpression,
    PublisherConfig,
    RuleRecord,
};

#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Every rule stored for the publisher, in storage order.
    async fn list_for_publisher(&self, publisher_id: i64) -> anyhow::Result<Vec<RuleRecord>>;
    /// Inserts or replaces the rule keyed by (publisher id, rule name).
    async fn upsert_rule(&self, record: RuleRecord) -> anyhow::Result<RuleRecord>;
}

#[async_trait]
pub trait PublisherConfigRepository: Send + Sync {
    async fn load_publisher_config(
        &self,
        publisher_id: i64,
    ) -> anyhow::Result<Option<PublisherConfig>>;
    async fn upsert_publisher_config(&self, config: &PublisherConfig) -> anyhow::Result<()>;
    async fn list_publisher_configs(&self) -> anyhow::Result<Vec<PublisherConfig>>;
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn record_publisher_domain(&self, publisher_id: i64, domain: &str) -> anyhow::Result<()>;
    async fn insert_keyword_impressions(&self, rows: &[KeywordImpression]) -> anyhow::Result<()>;
    async fn insert_keyword_click(&self, row: &KeywordClick) -> anyhow::Result<()>;
    async fn insert_ad_click(&self, row: &AdClick) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Raw markup addressed by a template reference such as `KeywordTemplate1.html`.
    async fn read_template(&self, reference: &str) -> anyhow::Result<String>;
}
