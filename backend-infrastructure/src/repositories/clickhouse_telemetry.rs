use anyhow::Result;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use backend_domain::{AdClick, KeywordClick, KeywordImpression, TelemetryRepository};

use crate::utils::{current_millis, millis_to_utc};

#[derive(Debug, Clone, Serialize, Row)]
struct KeywordImpressionRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    event_time: OffsetDateTime,
    event_id: String,
    publisher_id: i64,
    keyword_id: Option<i64>,
    keyword_title: String,
    slot: String,
    client_ip: String,
    user_agent: String,
    country_code: String,
}

#[derive(Debug, Clone, Serialize, Row)]
struct KeywordClickRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    event_time: OffsetDateTime,
    event_id: String,
    publisher_id: i64,
    slot: String,
    keyword_id: Option<i64>,
    keyword_title: String,
    client_ip: String,
    user_agent: String,
}

#[derive(Debug, Clone, Serialize, Row)]
struct AdClickRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    event_time: OffsetDateTime,
    event_id: String,
    publisher_id: i64,
    keyword_id: Option<i64>,
    keyword_title: String,
    ad_title: String,
    ad_host: String,
    target_url: String,
    slot: String,
    client_ip: String,
    user_agent: String,
    country_code: String,
}

#[derive(Debug, Clone, Serialize, Row)]
struct PublisherDomainRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    updated_at: OffsetDateTime,
    publisher_id: i64,
    domain: String,
}

/// Append-only telemetry tables in ClickHouse.
#[derive(Clone)]
pub struct ClickhouseTelemetryRepo {
    client: Client,
    database: String,
}

impl ClickhouseTelemetryRepo {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

#[async_trait]
impl TelemetryRepository for ClickhouseTelemetryRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_impressions = r#"
CREATE TABLE IF NOT EXISTS keyword_impressions (
    event_time DateTime64(3),
    event_id String,
    publisher_id Int64,
    keyword_id Nullable(Int64),
    keyword_title String,
    slot String,
    client_ip String,
    user_agent String,
    country_code String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, publisher_id)
TTL toDateTime(event_time) + INTERVAL 90 DAY
"#;
        self.client.query(create_impressions).execute().await?;

        let create_keyword_clicks = r#"
CREATE TABLE IF NOT EXISTS keyword_clicks (
    event_time DateTime64(3),
    event_id String,
    publisher_id Int64,
    slot String,
    keyword_id Nullable(Int64),
    keyword_title String,
    client_ip String,
    user_agent String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, publisher_id)
TTL toDateTime(event_time) + INTERVAL 90 DAY
"#;
        self.client.query(create_keyword_clicks).execute().await?;

        let create_ad_clicks = r#"
CREATE TABLE IF NOT EXISTS ad_clicks (
    event_time DateTime64(3),
    event_id String,
    publisher_id Int64,
    keyword_id Nullable(Int64),
    keyword_title String,
    ad_title String,
    ad_host String,
    target_url String,
    slot String,
    client_ip String,
    user_agent String,
    country_code String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, publisher_id, ad_host)
TTL toDateTime(event_time) + INTERVAL 90 DAY
"#;
        self.client.query(create_ad_clicks).execute().await?;

        let create_publishers = r#"
CREATE TABLE IF NOT EXISTS publishers (
    updated_at DateTime64(3),
    publisher_id Int64,
    domain String
) ENGINE = ReplacingMergeTree(updated_at)
ORDER BY publisher_id
"#;
        self.client.query(create_publishers).execute().await?;
        Ok(())
    }

    async fn record_publisher_domain(&self, publisher_id: i64, domain: &str) -> Result<()> {
        let mut insert = self.client.insert("publishers")?;
        insert
            .write(&PublisherDomainRow {
                updated_at: millis_to_utc(current_millis()),
                publisher_id,
                domain: domain.to_string(),
            })
            .await?;
        insert.end().await?;
        Ok(())
    }

    async fn insert_keyword_impressions(&self, rows: &[KeywordImpression]) -> Result<()> {
        let mut insert = self.client.insert("keyword_impressions")?;
        for row in rows {
            insert
                .write(&KeywordImpressionRow {
                    event_time: millis_to_utc(row.event_time_ms),
                    event_id: row.event_id.clone(),
                    publisher_id: row.publisher_id,
                    keyword_id: row.keyword_id,
                    keyword_title: row.keyword_title.clone(),
                    slot: row.slot.clone(),
                    client_ip: row.client_ip.clone(),
                    user_agent: row.user_agent.clone(),
                    country_code: row.country_code.clone(),
                })
                .await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn insert_keyword_click(&self, row: &KeywordClick) -> Result<()> {
        let mut insert = self.client.insert("keyword_clicks")?;
        insert
            .write(&KeywordClickRow {
                event_time: millis_to_utc(row.event_time_ms),
                event_id: row.event_id.clone(),
                publisher_id: row.publisher_id,
                slot: row.slot.clone(),
                keyword_id: row.keyword_id,
                keyword_title: row.keyword_title.clone(),
                client_ip: row.client_ip.clone(),
                user_agent: row.user_agent.clone(),
            })
            .await?;
        insert.end().await?;
        Ok(())
    }

    async fn insert_ad_click(&self, row: &AdClick) -> Result<()> {
        let mut insert = self.client.insert("ad_clicks")?;
        insert
            .write(&AdClickRow {
                event_time: millis_to_utc(row.event_time_ms),
                event_id: row.event_id.clone(),
                publisher_id: row.publisher_id,
                keyword_id: row.keyword_id,
                keyword_title: row.keyword_title.clone(),
                ad_title: row.ad_title.clone(),
                ad_host: row.ad_host.clone(),
                target_url: row.target_url.clone(),
                slot: row.slot.clone(),
                client_ip: row.client_ip.clone(),
                user_agent: row.user_agent.clone(),
                country_code: row.country_code.clone(),
            })
            .await?;
        insert.end().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

/// Used when no ClickHouse url is configured: every write is accepted and dropped.
#[derive(Debug, Default, Clone)]
pub struct DisabledTelemetryRepository;

#[async_trait]
impl TelemetryRepository for DisabledTelemetryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn record_publisher_domain(&self, publisher_id: i64, _domain: &str) -> Result<()> {
        debug!(publisher_id, "telemetry disabled, publisher domain dropped");
        Ok(())
    }

    async fn insert_keyword_impressions(&self, rows: &[KeywordImpression]) -> Result<()> {
        debug!(count = rows.len(), "telemetry disabled, impressions dropped");
        Ok(())
    }

    async fn insert_keyword_click(&self, _row: &KeywordClick) -> Result<()> {
        Ok(())
    }

    async fn insert_ad_click(&self, _row: &AdClick) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
