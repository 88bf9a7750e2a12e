use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, KeywordProviderConfig, RuntimeConfig};

use crate::config::validation::validate_http_url;

pub const DEFAULT_KEYWORD_API_BASE: &str =
    "http://g-usw1b-kwd-api-realapi.srv.media.net/kbb/keyword_api.php";
pub const DEFAULT_AD_FEED_URL: &str =
    "https://contextual-stage.media.net/test/mock/provider/yahoo.xml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub keyword_api_base: String,
    pub ad_feed_url: String,
    pub upstream_timeout_seconds: u64,
    pub template_dir: String,
    pub rules_path: String,
    pub publisher_configs_path: String,
    pub cache_sweep_seconds: u64,
    pub min_keyword_slots: usize,
    pub min_ad_slots: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub keyword_provider: KeywordProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            admin_token: None,
            clickhouse_url: String::new(),
            clickhouse_database: "adserve".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            keyword_api_base: DEFAULT_KEYWORD_API_BASE.to_string(),
            ad_feed_url: DEFAULT_AD_FEED_URL.to_string(),
            upstream_timeout_seconds: 8,
            template_dir: "./storage/html".to_string(),
            rules_path: "./rules.yaml".to_string(),
            publisher_configs_path: "./publisher_configs.yaml".to_string(),
            cache_sweep_seconds: 60,
            min_keyword_slots: 6,
            min_ad_slots: 3,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            keyword_provider: KeywordProviderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads from `ADSERVE_CONFIG` (default `./config.toml`).
    pub async fn load() -> Result<Self> {
        let path = env::var("ADSERVE_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!(path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.admin_token = non_blank(self.admin_token.take());
        self.clickhouse_user = non_blank(self.clickhouse_user.take());
        self.clickhouse_password = non_blank(self.clickhouse_password.take());
        self.clickhouse_url = self.clickhouse_url.trim().to_string();
        self.keyword_api_base = self.keyword_api_base.trim().to_string();
        self.ad_feed_url = self.ad_feed_url.trim().to_string();
        self.rules_path = self.rules_path.trim().to_string();
        self.publisher_configs_path = self.publisher_configs_path.trim().to_string();
        if self.upstream_timeout_seconds == 0 {
            self.upstream_timeout_seconds = 8;
        }
        if self.cache_sweep_seconds == 0 {
            self.cache_sweep_seconds = 60;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.template_dir = resolve_path(base, &self.template_dir);
        self.rules_path = resolve_path(base, &self.rules_path);
        self.publisher_configs_path = resolve_path(base, &self.publisher_configs_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_http_url("keyword_api_base", &self.keyword_api_base)?;
        validate_http_url("ad_feed_url", &self.ad_feed_url)?;
        if !self.clickhouse_url.is_empty() {
            validate_http_url("clickhouse_url", &self.clickhouse_url)?;
        }
        if self.template_dir.trim().is_empty() {
            return Err(anyhow!("template_dir must not be empty"));
        }
        if self.min_keyword_slots == 0 || self.min_ad_slots == 0 {
            return Err(anyhow!("min_keyword_slots and min_ad_slots must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn telemetry_enabled(&self) -> bool {
        !self.clickhouse_url.is_empty()
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            admin_token: self.admin_token.clone(),
            keyword_api_base: self.keyword_api_base.clone(),
            ad_feed_url: self.ad_feed_url.clone(),
            upstream_timeout_seconds: self.upstream_timeout_seconds,
            template_dir: self.template_dir.clone(),
            rules_path: optional_path(&self.rules_path),
            publisher_configs_path: optional_path(&self.publisher_configs_path),
            cache_sweep_seconds: self.cache_sweep_seconds,
            min_keyword_slots: self.min_keyword_slots,
            min_ad_slots: self.min_ad_slots,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            keyword_provider: self.keyword_provider.clone(),
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: optional_path(&self.clickhouse_url),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ADSERVE_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ADSERVE_ADMIN_TOKEN") {
            self.admin_token = Some(value);
        }
        if let Ok(value) = env::var("ADSERVE_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("ADSERVE_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("ADSERVE_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("ADSERVE_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("ADSERVE_KEYWORD_API_BASE") {
            self.keyword_api_base = value;
        }
        if let Ok(value) = env::var("ADSERVE_AD_FEED_URL") {
            self.ad_feed_url = value;
        }
        if let Ok(value) = env::var("ADSERVE_UPSTREAM_TIMEOUT_SECONDS") {
            self.upstream_timeout_seconds = value.parse().unwrap_or(self.upstream_timeout_seconds);
        }
        if let Ok(value) = env::var("ADSERVE_TEMPLATE_DIR") {
            self.template_dir = value;
        }
        if let Ok(value) = env::var("ADSERVE_RULES_PATH") {
            self.rules_path = value;
        }
        if let Ok(value) = env::var("ADSERVE_PUBLISHER_CONFIGS_PATH") {
            self.publisher_configs_path = value;
        }
        if let Ok(value) = env::var("ADSERVE_CACHE_SWEEP_SECONDS") {
            self.cache_sweep_seconds = value.parse().unwrap_or(self.cache_sweep_seconds);
        }
        if let Ok(value) = env::var("ADSERVE_MIN_KEYWORD_SLOTS") {
            self.min_keyword_slots = value.parse().unwrap_or(self.min_keyword_slots);
        }
        if let Ok(value) = env::var("ADSERVE_MIN_AD_SLOTS") {
            self.min_ad_slots = value.parse().unwrap_or(self.min_ad_slots);
        }
        if let Ok(value) = env::var("ADSERVE_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ADSERVE_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

fn optional_path(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
bind_addr = "0.0.0.0:9000"
min_keyword_slots = 4

[keyword_provider]
pstag = "live"
"#,
        )
        .expect("parse");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.min_keyword_slots, 4);
        assert_eq!(config.min_ad_slots, 3);
        assert_eq!(config.upstream_timeout_seconds, 8);
        assert_eq!(config.keyword_provider.pstag, "live");
        assert_eq!(config.keyword_provider.calling_source, "cm");
    }

    #[test]
    fn blank_optionals_are_dropped_and_telemetry_disabled() {
        let mut config = AppConfig {
            admin_token: Some("  ".to_string()),
            clickhouse_url: "  ".to_string(),
            rules_path: String::new(),
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.admin_token.is_none());
        assert!(!config.telemetry_enabled());
        let runtime = config.to_runtime_config();
        assert!(runtime.rules_path.is_none());
        assert!(config.to_db_config().clickhouse_url.is_none());
    }

    #[test]
    fn relative_paths_follow_config_directory() {
        let mut config = AppConfig::default();
        config.resolve_paths(Some(Path::new("/etc/adserve")));
        assert_eq!(config.template_dir, "/etc/adserve/./storage/html");
        assert_eq!(config.rules_path, "/etc/adserve/./rules.yaml");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        config.bind_addr = "nowhere".to_string();
        assert!(config.validate().is_err());
        let config = AppConfig {
            min_ad_slots: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
