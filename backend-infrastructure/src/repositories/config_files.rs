use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use backend_domain::{PublisherConfig, PublisherConfigRepository, RuleRecord, RuleRepository};

/// Rule as written in `rules.yaml`. The action may be a mapping or a raw JSON string;
/// the string form is passed through untouched so a malformed action still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRule {
    #[serde(default)]
    id: i64,
    rule_name: String,
    publisher_id: i64,
    #[serde(default)]
    user_agent: String,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    action: serde_yaml::Value,
}

impl StoredRule {
    fn into_record(self) -> anyhow::Result<RuleRecord> {
        let action = match self.action {
            serde_yaml::Value::Null => "{}".to_string(),
            serde_yaml::Value::String(raw) => raw,
            other => serde_json::to_string(&other)
                .with_context(|| {
                    format!("rule {} action is not json compatible", self.rule_name)
                })?,
        };
        Ok(RuleRecord {
            id: self.id,
            rule_name: self.rule_name,
            publisher_id: self.publisher_id,
            user_agent: self.user_agent,
            country_code: self.country_code,
            action,
        })
    }

    fn from_record(record: &RuleRecord) -> Self {
        let action = serde_json::from_str::<serde_yaml::Value>(&record.action)
            .unwrap_or_else(|_| serde_yaml::Value::String(record.action.clone()));
        Self {
            id: record.id,
            rule_name: record.rule_name.clone(),
            publisher_id: record.publisher_id,
            user_agent: record.user_agent.clone(),
            country_code: record.country_code.clone(),
            action,
        }
    }
}

/// Targeting rules kept in memory and written back to a YAML file on every upsert.
/// Upserts are serialized by `writer`; readers only wait for the final swap.
pub struct FileRuleRepository {
    path: PathBuf,
    rules: RwLock<Vec<RuleRecord>>,
    writer: Mutex<()>,
}

impl FileRuleRepository {
    /// A missing file starts an empty rule set; it is created on the first upsert.
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let rules = if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("read rules file {}", path.display()))?;
            parse_rules(&content)?
        } else {
            warn!(path = %path.display(), "rules file not found, starting without rules");
            Vec::new()
        };
        info!(path = %path.display(), count = rules.len(), "rules loaded");
        Ok(Self {
            path,
            rules: RwLock::new(rules),
            writer: Mutex::new(()),
        })
    }

    async fn persist(&self, rules: &[RuleRecord]) -> anyhow::Result<()> {
        let stored: Vec<StoredRule> = rules.iter().map(StoredRule::from_record).collect();
        let content = serde_yaml::to_string(&stored)?;
        write_file(&self.path, content).await
    }
}

fn parse_rules(content: &str) -> anyhow::Result<Vec<RuleRecord>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredRule> = serde_yaml::from_str(content)?;
    let mut next_id = stored.iter().map(|rule| rule.id).max().unwrap_or(0);
    stored
        .into_iter()
        .map(|mut rule| {
            if rule.id <= 0 {
                next_id += 1;
                rule.id = next_id;
            }
            rule.into_record()
        })
        .collect()
}

#[async_trait]
impl RuleRepository for FileRuleRepository {
    async fn list_for_publisher(&self, publisher_id: i64) -> anyhow::Result<Vec<RuleRecord>> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|rule| rule.publisher_id == publisher_id)
            .cloned()
            .collect())
    }

    async fn upsert_rule(&self, mut record: RuleRecord) -> anyhow::Result<RuleRecord> {
        let _writer = self.writer.lock().await;
        let mut next = self.rules.read().await.clone();
        match next.iter_mut().find(|rule| {
            rule.publisher_id == record.publisher_id && rule.rule_name == record.rule_name
        }) {
            Some(existing) => {
                record.id = existing.id;
                *existing = record.clone();
            }
            None => {
                record.id = next.iter().map(|rule| rule.id).max().unwrap_or(0) + 1;
                next.push(record.clone());
            }
        }
        self.persist(&next).await?;
        *self.rules.write().await = next;
        Ok(record)
    }
}

/// Publisher layout configs kept in memory and mirrored to a YAML file.
pub struct FilePublisherConfigRepository {
    path: PathBuf,
    configs: RwLock<Vec<PublisherConfig>>,
    writer: Mutex<()>,
}

impl FilePublisherConfigRepository {
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let configs = if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("read publisher configs file {}", path.display()))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_yaml::from_str::<Vec<PublisherConfig>>(&content)?
            }
        } else {
            warn!(
                path = %path.display(),
                "publisher configs file not found, using defaults only"
            );
            Vec::new()
        };
        info!(path = %path.display(), count = configs.len(), "publisher configs loaded");
        Ok(Self {
            path,
            configs: RwLock::new(configs),
            writer: Mutex::new(()),
        })
    }
}

#[async_trait]
impl PublisherConfigRepository for FilePublisherConfigRepository {
    async fn load_publisher_config(
        &self,
        publisher_id: i64,
    ) -> anyhow::Result<Option<PublisherConfig>> {
        let configs = self.configs.read().await;
        Ok(configs
            .iter()
            .find(|config| config.publisher_id == publisher_id)
            .cloned())
    }

    async fn upsert_publisher_config(&self, config: &PublisherConfig) -> anyhow::Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.configs.read().await.clone();
        match next
            .iter_mut()
            .find(|item| item.publisher_id == config.publisher_id)
        {
            Some(existing) => *existing = config.clone(),
            None => next.push(config.clone()),
        }
        next.sort_by_key(|item| item.publisher_id);
        let content = serde_yaml::to_string(&next)?;
        write_file(&self.path, content).await?;
        *self.configs.write().await = next;
        Ok(())
    }

    async fn list_publisher_configs(&self) -> anyhow::Result<Vec<PublisherConfig>> {
        Ok(self.configs.read().await.clone())
    }
}

async fn write_file(path: &Path, content: String) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, content).await?;
    Ok(())
}
