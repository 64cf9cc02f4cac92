//! Shared application state: an immutable resource bundle swapped on reload.
//!
//! A reload builds a brand-new bundle from the new configuration and swaps
//! one shared pointer; no field of a live bundle is ever mutated. In-flight
//! requests keep the snapshot they started with, and the old bundle's
//! scheduler is stopped once the swap lands.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use daybook_core::{Config, Result};
use daybook_db::Database;
use daybook_inference::OllamaBackend;
use daybook_recall::{AnswerEngine, EmbeddingSyncService, SyncConfig};

/// Everything a request handler needs, built once per configuration epoch.
pub struct AppResources {
    pub config: Config,
    pub db: Database,
    pub sync: EmbeddingSyncService,
    pub engine: AnswerEngine,
}

impl AppResources {
    /// Connect and wire all resources for one configuration epoch. The
    /// scheduler is created stopped; call [`start_background`] after.
    ///
    /// [`start_background`]: AppResources::start_background
    pub async fn build(config: Config) -> Result<Self> {
        let db = Database::connect(&config.database.url).await?;

        let backend = Arc::new(OllamaBackend::from_llm_config(&config.llm));
        let entries = Arc::new(db.entries.clone());
        let vectors = Arc::new(db.vectors.clone());

        let sync = EmbeddingSyncService::new(
            vectors.clone(),
            backend.clone(),
            SyncConfig::from_config(&config),
        );
        let engine = AnswerEngine::new(
            entries,
            vectors,
            backend.clone(),
            backend,
            config.llm.top_k,
        );

        Ok(Self {
            config,
            db,
            sync,
            engine,
        })
    }

    /// Start the background scheduler if the configuration enables it.
    pub fn start_background(&self) {
        if self.config.llm.sync_enabled {
            self.sync.start();
        } else {
            info!("Embedding sync disabled by configuration");
        }
    }
}

/// Cloneable handle to the current resource snapshot.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<RwLock<Arc<AppResources>>>,
}

impl SharedState {
    pub fn new(resources: AppResources) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(resources))),
        }
    }

    /// The current snapshot. Handlers grab this once per request.
    pub async fn current(&self) -> Arc<AppResources> {
        self.inner.read().await.clone()
    }

    /// Build a new bundle from `config`, swap it in, and stop the old
    /// scheduler. If the build fails the old bundle stays live untouched.
    pub async fn reload(&self, config: Config) -> Result<()> {
        let fresh = Arc::new(AppResources::build(config).await?);
        fresh.start_background();

        let old = {
            let mut guard = self.inner.write().await;
            std::mem::replace(&mut *guard, fresh)
        };
        old.sync.stop();

        info!("Configuration reloaded; resources swapped");
        Ok(())
    }

    /// Stop background work on the current snapshot (shutdown path).
    pub async fn shutdown(&self) {
        self.current().await.sync.stop();
    }
}
