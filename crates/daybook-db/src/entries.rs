//! Entry repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use daybook_core::{
    normalize_attendees, CreateEntry, Entry, EntryDay, EntryKind, EntryRepository, Error, Result,
    UpdateEntry,
};

use crate::escape_like;

/// Columns selected whenever a full entry row is hydrated. The embedding
/// vector is deliberately absent; it never leaves the database row.
pub(crate) const ENTRY_COLUMNS: &str = "id, owner_id, title, body_delta, body_html, body_text, \
     attendees_original, attendees, kind, day_year, day_month, day_day, \
     archived, created_at, updated_at, embedding_synced_at";

pub(crate) fn row_to_entry(row: &PgRow) -> Result<Entry> {
    let kind: String = row.get("kind");
    Ok(Entry {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        body_delta: row.get("body_delta"),
        body_html: row.get("body_html"),
        body_text: row.get("body_text"),
        attendees_original: row.get("attendees_original"),
        attendees: row.get("attendees"),
        kind: EntryKind::parse(&kind)
            .map_err(|_| Error::Internal(format!("unknown entry kind in database: {kind:?}")))?,
        day: EntryDay::new(row.get("day_year"), row.get("day_month"), row.get("day_day")),
        archived: row.get("archived"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        embedding_synced_at: row.get("embedding_synced_at"),
    })
}

/// PostgreSQL implementation of EntryRepository.
#[derive(Clone)]
pub struct PgEntryRepository {
    pool: Pool<Postgres>,
}

impl PgEntryRepository {
    /// Create a new PgEntryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn insert(&self, owner_id: Uuid, entry: CreateEntry) -> Result<Entry> {
        let attendees = normalize_attendees(&entry.attendees_original);
        let query = format!(
            "INSERT INTO entry (id, owner_id, title, body_delta, body_html, body_text, \
                                attendees_original, attendees, kind, day_year, day_month, day_day) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&entry.title)
            .bind(&entry.body_delta)
            .bind(&entry.body_html)
            .bind(&entry.body_text)
            .bind(&entry.attendees_original)
            .bind(&attendees)
            .bind(entry.kind.as_str())
            .bind(entry.day.year)
            .bind(entry.day.month)
            .bind(entry.day.day)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        row_to_entry(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Entry> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM entry WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::EntryNotFound(id))?;

        row_to_entry(&row)
    }

    async fn update(&self, id: Uuid, patch: UpdateEntry) -> Result<Entry> {
        // Fetch-then-write keeps the merge logic in one place; single-user
        // installs do not contend on the same entry.
        let existing = self.fetch(id).await?;

        let title = patch.title.unwrap_or(existing.title);
        let body_delta = patch.body_delta.unwrap_or(existing.body_delta);
        let body_html = patch.body_html.unwrap_or(existing.body_html);
        let body_text = patch.body_text.unwrap_or(existing.body_text);
        let (attendees_original, attendees) = match patch.attendees_original {
            Some(original) => {
                let normalized = normalize_attendees(&original);
                (original, normalized)
            }
            None => (existing.attendees_original, existing.attendees),
        };
        let kind = patch.kind.unwrap_or(existing.kind);

        // updated_at moves forward on every patch, which is exactly what
        // makes the entry stale for the next sync cycle.
        let query = format!(
            "UPDATE entry \
             SET title = $2, body_delta = $3, body_html = $4, body_text = $5, \
                 attendees_original = $6, attendees = $7, kind = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&title)
            .bind(&body_delta)
            .bind(&body_html)
            .bind(&body_text)
            .bind(&attendees_original)
            .bind(&attendees)
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        row_to_entry(&row)
    }

    async fn archive(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE entry SET archived = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    async fn list_for_day(&self, owner_id: Uuid, day: EntryDay) -> Result<Vec<Entry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry \
             WHERE owner_id = $1 AND day_year = $2 AND day_month = $3 AND day_day = $4 \
               AND archived IS FALSE \
             ORDER BY created_at"
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .bind(day.year)
            .bind(day.month)
            .bind(day.day)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn days_with_entries(&self, owner_id: Uuid, year: i32, month: i32) -> Result<Vec<i32>> {
        let rows = sqlx::query(
            "SELECT DISTINCT day_day FROM entry \
             WHERE owner_id = $1 AND day_year = $2 AND day_month = $3 AND archived IS FALSE \
             ORDER BY day_day",
        )
        .bind(owner_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(|row| row.get("day_day")).collect())
    }

    async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Entry>> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry \
             WHERE owner_id = $1 AND archived IS FALSE \
               AND (title ILIKE $2 OR body_text ILIKE $2 OR attendees_original ILIKE $2) \
             ORDER BY updated_at DESC \
             LIMIT $3"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(&pattern)
            .bind(daybook_core::defaults::SEARCH_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn list_all(&self, owner_id: Uuid) -> Result<Vec<Entry>> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry \
             WHERE owner_id = $1 AND archived IS FALSE \
             ORDER BY day_year, day_month, day_day, created_at"
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_entry).collect()
    }
}
