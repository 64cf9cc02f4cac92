//! Core traits for daybook abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// ENTRY REPOSITORY
// =============================================================================

/// Fields for creating a new entry.
#[derive(Debug, Clone)]
pub struct CreateEntry {
    pub title: String,
    pub body_delta: JsonValue,
    pub body_html: String,
    pub body_text: String,
    pub attendees_original: String,
    pub kind: EntryKind,
    pub day: EntryDay,
}

/// Partial patch for an existing entry; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateEntry {
    pub title: Option<String>,
    pub body_delta: Option<JsonValue>,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
    pub attendees_original: Option<String>,
    pub kind: Option<EntryKind>,
}

/// Repository for entry CRUD and calendar queries.
///
/// Every read is scoped to an explicit owner id; there is no implicit
/// global scope.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert a new entry and return the stored row.
    async fn insert(&self, owner_id: Uuid, entry: CreateEntry) -> Result<Entry>;

    /// Fetch a single entry by id, archived or not.
    async fn fetch(&self, id: Uuid) -> Result<Entry>;

    /// Apply a partial patch. Any patch bumps `updated_at`, which is what
    /// makes the entry eligible for re-embedding on the next sync cycle.
    async fn update(&self, id: Uuid, patch: UpdateEntry) -> Result<Entry>;

    /// Archive (soft-delete). Archived entries drop out of listings,
    /// search, sync, and retrieval; their stored vector is left in place.
    async fn archive(&self, id: Uuid) -> Result<()>;

    /// Entries filed under one calendar day, oldest first.
    async fn list_for_day(&self, owner_id: Uuid, day: EntryDay) -> Result<Vec<Entry>>;

    /// Days within a month that have at least one active entry.
    async fn days_with_entries(&self, owner_id: Uuid, year: i32, month: i32) -> Result<Vec<i32>>;

    /// Case-insensitive substring search over title, body, and attendees.
    async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Entry>>;

    /// All active entries for an owner (export).
    async fn list_all(&self, owner_id: Uuid) -> Result<Vec<Entry>>;
}

// =============================================================================
// VECTOR STORE
// =============================================================================

/// Store of per-entry embedding vectors with a freshness watermark.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Entries whose embedding is missing or older than their last edit,
    /// most recently updated first, excluding archived entries. Bounded by
    /// `limit`; one call is not guaranteed to drain all staleness.
    async fn fetch_stale_batch(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Entry>>;

    /// Write an entry's vector and stamp `embedding_synced_at`, atomically.
    /// A vector is never observable without its watermark, or vice versa.
    async fn upsert_vector(&self, entry_id: Uuid, vector: &Vector) -> Result<()>;

    /// The `k` nearest entries by cosine distance, ascending, ties broken
    /// by id. Entries without an embedding and archived entries never
    /// appear.
    async fn nearest(&self, owner_id: Uuid, query: &Vector, k: i64) -> Result<Vec<RetrievalHit>>;
}

// =============================================================================
// ATTACHMENT REPOSITORY
// =============================================================================

/// Repository for binary attachments.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn insert(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        filename: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<Attachment>;

    async fn fetch(&self, id: Uuid) -> Result<Attachment>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// INFERENCE BACKENDS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed one text into the fixed-dimension vector space.
    ///
    /// Empty input yields a zero vector of the configured dimension without
    /// touching the backend.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM). Single-turn, blocking until the full
/// response is available or the timeout elapses; no streaming.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model name being used.
    fn model_name(&self) -> &str;
}
