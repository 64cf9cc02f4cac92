//! # daybook-db
//!
//! PostgreSQL database layer for daybook.
//!
//! This crate provides:
//! - Connection pool management
//! - Entry repository (CRUD, calendar queries, substring search)
//! - Vector store over the entry table's pgvector column
//! - Attachment repository
//!
//! ## Example
//!
//! ```rust,ignore
//! use daybook_db::Database;
//! use daybook_core::{CreateEntry, EntryDay, EntryKind, EntryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/daybook").await?;
//!
//!     let entry = db.entries.insert(owner_id, CreateEntry {
//!         title: "Standup".to_string(),
//!         body_delta: serde_json::json!({}),
//!         body_html: String::new(),
//!         body_text: "Discussed the release".to_string(),
//!         attendees_original: "Alice, Bob".to_string(),
//!         kind: EntryKind::Meeting,
//!         day: EntryDay::new(2026, 8, 7),
//!     }).await?;
//!
//!     println!("Created entry: {}", entry.id);
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod entries;
pub mod pool;
pub mod vectors;

// Re-export core types
pub use daybook_core::*;

// Re-export repository implementations
pub use attachments::PgAttachmentRepository;
pub use entries::PgEntryRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use vectors::PgVectorStore;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Entry repository for CRUD and calendar queries.
    pub entries: PgEntryRepository,
    /// Vector store for embedding sync and nearest-neighbor queries.
    pub vectors: PgVectorStore,
    /// Attachment repository.
    pub attachments: PgAttachmentRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            entries: PgEntryRepository::new(pool.clone()),
            vectors: PgVectorStore::new(pool.clone()),
            attachments: PgAttachmentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
