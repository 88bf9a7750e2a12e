use std::sync::Arc;
use std::time::Duration;

use backend_domain::ports::PublisherConfigRepository;
use backend_domain::PublisherConfig;
use tracing::warn;

use crate::ops::SweepingCache;

/// Cached lookup of legacy publisher layout settings. Falls back to the
/// built-in default whenever nothing usable is stored.
pub struct PublisherConfigResolver {
    repo: Option<Arc<dyn PublisherConfigRepository>>,
    cache: SweepingCache<i64, PublisherConfig>,
}

impl PublisherConfigResolver {
    pub fn new(repo: Option<Arc<dyn PublisherConfigRepository>>) -> Self {
        Self {
            repo,
            cache: SweepingCache::new("publisher_configs"),
        }
    }

    pub fn start_sweeper(&self, every: Duration) -> bool {
        self.cache.start_sweeper(every)
    }

    pub fn close(&self) {
        self.cache.close();
    }

    pub async fn resolve(&self, publisher_id: i64) -> PublisherConfig {
        let Some(repo) = self.repo.as_ref() else {
            return PublisherConfig::default();
        };
        if publisher_id == 0 {
            return PublisherConfig::default();
        }
        if let Some(config) = self.cache.get(&publisher_id).await {
            return config;
        }
        let generation = self.cache.generation();
        match repo.load_publisher_config(publisher_id).await {
            Ok(Some(config)) => {
                let config = config.normalized();
                self.cache
                    .insert_if_current(publisher_id, config.clone(), generation)
                    .await;
                config
            }
            Ok(None) => PublisherConfig::default(),
            Err(err) => {
                warn!(publisher_id, error = %err, "publisher config lookup failed, using default");
                PublisherConfig::default()
            }
        }
    }

    pub async fn cached_publishers(&self) -> usize {
        self.cache.len().await
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}
