//! Vector store implementation over the entry table's embedding columns.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use daybook_core::{Entry, EntryDay, Error, Result, RetrievalHit, VectorStore};

use crate::entries::{row_to_entry, ENTRY_COLUMNS};

/// PostgreSQL + pgvector implementation of VectorStore.
///
/// Each entry carries exactly two sync-related columns beyond its normal
/// attributes: `embedding vector(N)` and `embedding_synced_at`. Staleness
/// is evaluated in SQL from those columns and `updated_at`; there is no
/// dirty flag to keep consistent.
#[derive(Clone)]
pub struct PgVectorStore {
    pool: Pool<Postgres>,
}

impl PgVectorStore {
    /// Create a new PgVectorStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Count entries that currently have an embedding, for health reporting.
    pub async fn embedded_count(&self, owner_id: Uuid) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM entry \
             WHERE owner_id = $1 AND embedding IS NOT NULL AND archived IS FALSE",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn fetch_stale_batch(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Entry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry \
             WHERE owner_id = $1 \
               AND archived IS FALSE \
               AND (embedding IS NULL \
                    OR embedding_synced_at IS NULL \
                    OR updated_at > embedding_synced_at) \
             ORDER BY updated_at DESC \
             LIMIT $2"
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn upsert_vector(&self, entry_id: Uuid, vector: &Vector) -> Result<()> {
        // One UPDATE writes the vector and its watermark together; a reader
        // can never observe one without the other.
        let result = sqlx::query(
            "UPDATE entry SET embedding = $2, embedding_synced_at = now() WHERE id = $1",
        )
        .bind(entry_id)
        .bind(vector)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::EntryNotFound(entry_id));
        }
        Ok(())
    }

    async fn nearest(&self, owner_id: Uuid, query: &Vector, k: i64) -> Result<Vec<RetrievalHit>> {
        // Secondary ORDER BY id keeps equal distances stable within a query.
        let rows = sqlx::query(
            "SELECT id, title, day_year, day_month, day_day, body_text, \
                    embedding <=> $2 AS distance \
             FROM entry \
             WHERE owner_id = $1 AND archived IS FALSE AND embedding IS NOT NULL \
             ORDER BY embedding <=> $2, id \
             LIMIT $3",
        )
        .bind(owner_id)
        .bind(query)
        .bind(k)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let hits = rows
            .into_iter()
            .map(|row| RetrievalHit {
                entry_id: row.get("id"),
                title: row.get("title"),
                day: EntryDay::new(row.get("day_year"), row.get("day_month"), row.get("day_day")),
                body_text: row.get("body_text"),
                distance: row.get::<f64, _>("distance") as f32,
            })
            .collect();

        Ok(hits)
    }
}
