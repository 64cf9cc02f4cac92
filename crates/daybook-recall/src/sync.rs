//! Embedding synchronization scheduler.
//!
//! A recurring background cycle finds entries whose embedding is missing or
//! stale, embeds their text, and writes the vector back with a freshness
//! watermark. At most one cycle runs at a time; a trigger that arrives
//! while a cycle is in flight is dropped, not queued, so a slow cycle
//! simply absorbs the next tick without double work.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use daybook_core::{defaults, Config, EmbeddingBackend, VectorStore};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between cycle triggers.
    pub interval: Duration,
    /// Stale entries pulled per cycle.
    pub batch_size: i64,
    /// Owner scope the scheduler synchronizes.
    pub owner_id: Uuid,
}

impl SyncConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            interval: Duration::from_secs(cfg.llm.sync_interval_secs),
            batch_size: cfg.llm.sync_batch_size,
            owner_id: cfg.app.owner_id,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(defaults::SYNC_INTERVAL_SECS),
            batch_size: defaults::SYNC_BATCH_SIZE,
            owner_id: Uuid::nil(),
        }
    }
}

/// Build the text sent to the embedding model for an entry: title first,
/// separated from the body by a blank line, omitted entirely when empty.
pub fn embedding_input(title: &str, body_text: &str) -> String {
    if title.is_empty() {
        body_text.to_string()
    } else {
        format!("{title}\n\n{body_text}")
    }
}

/// Background scheduler keeping entry embeddings in sync with their text.
///
/// Lifecycle is `Stopped -> Running -> Stopped`; both transitions are
/// idempotent and safe under concurrent callers. Stopping never interrupts
/// a cycle already in flight — the loop observes the signal at the next
/// cycle boundary.
pub struct EmbeddingSyncService {
    inner: Arc<SyncInner>,
    /// Holds the shutdown sender while the background task is running.
    running: std::sync::Mutex<Option<mpsc::Sender<()>>>,
}

struct SyncInner {
    store: Arc<dyn VectorStore>,
    backend: Arc<dyn EmbeddingBackend>,
    config: SyncConfig,
    /// Serializes cycles. Contended triggers are dropped.
    cycle_lock: Mutex<()>,
}

impl EmbeddingSyncService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        backend: Arc<dyn EmbeddingBackend>,
        config: SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                store,
                backend,
                config,
                cycle_lock: Mutex::new(()),
            }),
            running: std::sync::Mutex::new(None),
        }
    }

    /// Whether the background task is currently running.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .expect("scheduler state lock poisoned")
            .is_some()
    }

    /// Start the background loop: one cycle immediately, then one per
    /// interval. Calling while already running is a no-op.
    pub fn start(&self) {
        let mut running = self.running.lock().expect("scheduler state lock poisoned");
        if running.is_some() {
            debug!("Embedding sync scheduler already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let inner = self.inner.clone();

        tokio::spawn(async move {
            info!(
                interval_secs = inner.config.interval.as_secs(),
                batch_size = inner.config.batch_size,
                "Embedding sync scheduler started"
            );

            let mut ticker = tokio::time::interval(inner.config.interval);
            // A cycle slower than the interval absorbs the missed ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // Biased: once stop is signalled, no new cycle may start.
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => inner.run_cycle().await,
                }
            }

            info!("Embedding sync scheduler stopped");
        });

        *running = Some(shutdown_tx);
    }

    /// Stop the background loop. Idempotent; returns without waiting for an
    /// in-flight cycle. After this returns no new cycle starts.
    pub fn stop(&self) {
        let mut running = self.running.lock().expect("scheduler state lock poisoned");
        if running.take().is_some() {
            // Dropping the sender closes the channel; the loop's biased
            // select observes that before considering the next tick.
            info!("Stopping embedding sync scheduler");
        }
    }

    /// Run one cycle outside the timer. Dropped if a cycle is in flight.
    pub async fn run_cycle(&self) {
        self.inner.run_cycle().await;
    }
}

impl SyncInner {
    async fn run_cycle(&self) {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            debug!("Sync cycle already in progress; dropping trigger");
            return;
        };

        let start = Instant::now();

        let batch = match self
            .store
            .fetch_stale_batch(self.config.owner_id, self.config.batch_size)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Failed to fetch stale entries; skipping cycle");
                return;
            }
        };

        if batch.is_empty() {
            return;
        }

        info!(count = batch.len(), "Updating embeddings for stale entries");

        let mut updated = 0usize;
        for entry in &batch {
            // Sequential on purpose: bounds load on the embedding backend
            // and keeps failure isolation per entry.
            let text = embedding_input(&entry.title, &entry.body_text);
            let vector = match self.backend.embed(&text).await {
                Ok(vector) => vector,
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "Embedding failed; entry stays stale");
                    continue;
                }
            };
            if let Err(e) = self.store.upsert_vector(entry.id, &vector).await {
                warn!(entry_id = %entry.id, error = %e, "Vector upsert failed; entry stays stale");
                continue;
            }
            updated += 1;
        }

        info!(
            updated,
            total = batch.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync cycle complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_input_joins_title_and_body() {
        assert_eq!(embedding_input("Standup", "notes here"), "Standup\n\nnotes here");
    }

    #[test]
    fn embedding_input_omits_empty_title() {
        assert_eq!(embedding_input("", "notes here"), "notes here");
    }

    #[test]
    fn sync_config_from_app_config() {
        let mut cfg = Config::default();
        cfg.llm.sync_interval_secs = 5;
        cfg.llm.sync_batch_size = 3;

        let sync = SyncConfig::from_config(&cfg);
        assert_eq!(sync.interval, Duration::from_secs(5));
        assert_eq!(sync.batch_size, 3);
        assert_eq!(sync.owner_id, cfg.app.owner_id);
    }
}
