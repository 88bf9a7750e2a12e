use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Read-mostly map whose entries all share one clock: a sweep drops everything at once.
///
/// Worst-case staleness is one sweep interval. Writers only hold the lock for the
/// insert or the map swap; loading from storage happens outside of it.
///
/// Every clear or sweep bumps a generation counter while the write lock
/// is held. A loader reads the generation before going to storage and stores its
/// result with [`SweepingCache::insert_if_current`], so a value loaded before an
/// invalidation is never cached after it.
pub struct SweepingCache<K, V> {
    name: &'static str,
    entries: Arc<RwLock<HashMap<K, V>>>,
    generation: Arc<AtomicU64>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> SweepingCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            sweeper: Mutex::new(None),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Inserts only when nothing was invalidated since `generation` was read.
    /// Returns whether the value was stored.
    pub async fn insert_if_current(&self, key: K, value: V, generation: u64) -> bool {
        let mut guard = self.entries.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        guard.insert(key, value);
        true
    }

    pub async fn clear(&self) {
        swap_empty(&self.entries, &self.generation).await;
        debug!(cache = self.name, "cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Starts the periodic wholesale clear. Returns false if a sweeper already runs.
    /// Must be called from within a tokio runtime.
    pub fn start_sweeper(&self, every: Duration) -> bool {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        let entries = Arc::clone(&self.entries);
        let generation = Arc::clone(&self.generation);
        let name = self.name;
        let every = every.max(Duration::from_millis(10));
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                swap_empty(&entries, &generation).await;
                debug!(cache = name, interval_ms = every.as_millis() as u64, "cache swept");
            }
        }));
        true
    }

    /// Stops the sweeper. Entries stay until the next clear.
    pub fn close(&self) {
        if let Some(handle) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl<K, V> Drop for SweepingCache<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

async fn swap_empty<K, V>(entries: &RwLock<HashMap<K, V>>, generation: &AtomicU64) {
    let fresh = HashMap::new();
    let stale = {
        let mut guard = entries.write().await;
        generation.fetch_add(1, Ordering::AcqRel);
        std::mem::replace(&mut *guard, fresh)
    };
    drop(stale);
}
