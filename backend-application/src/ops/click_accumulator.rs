use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use backend_domain::{ClickStat, ClickStatKey};

/// In-process click counters. Independent of persisted telemetry and reset on restart.
#[derive(Debug, Default)]
pub struct ClickAccumulator {
    stats: Mutex<HashMap<ClickStatKey, u64>>,
}

impl ClickAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count after this increment; unseen keys start at zero.
    pub fn increment(&self, key: ClickStatKey) -> u64 {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let count = stats.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    pub fn get(&self, key: &ClickStatKey) -> u64 {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Highest counts first.
    pub fn snapshot(&self) -> Vec<ClickStat> {
        let mut rows: Vec<ClickStat> = {
            let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
            stats
                .iter()
                .map(|(key, count)| ClickStat {
                    key: key.clone(),
                    count: *count,
                })
                .collect()
        };
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.key.slot.cmp(&b.key.slot))
                .then_with(|| a.key.query.cmp(&b.key.query))
        });
        rows
    }

    pub fn len(&self) -> usize {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
