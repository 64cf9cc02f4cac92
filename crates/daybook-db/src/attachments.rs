//! Attachment repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use daybook_core::{Attachment, AttachmentRepository, Error, Result};

fn row_to_attachment(row: &PgRow) -> Attachment {
    Attachment {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        entry_id: row.get("entry_id"),
        filename: row.get("filename"),
        mime_type: row.get("mime_type"),
        size_bytes: row.get("size_bytes"),
        data: row.get("data"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of AttachmentRepository. Payloads are stored
/// inline (bytea); a personal journal's attachments stay small.
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: Pool<Postgres>,
}

impl PgAttachmentRepository {
    /// Create a new PgAttachmentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn insert(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        filename: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<Attachment> {
        let row = sqlx::query(
            "INSERT INTO attachment (id, owner_id, entry_id, filename, mime_type, size_bytes, data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, owner_id, entry_id, filename, mime_type, size_bytes, data, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(entry_id)
        .bind(filename)
        .bind(mime_type)
        .bind(data.len() as i64)
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row_to_attachment(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Attachment> {
        let row = sqlx::query(
            "SELECT id, owner_id, entry_id, filename, mime_type, size_bytes, data, created_at \
             FROM attachment WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::AttachmentNotFound(id))?;

        Ok(row_to_attachment(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM attachment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::AttachmentNotFound(id));
        }
        Ok(())
    }
}
