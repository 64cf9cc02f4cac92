//! Data model for journal entries, attachments, and retrieval results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{Error, Result};

pub use pgvector::Vector;

// =============================================================================
// ENTRY TYPES
// =============================================================================

/// Entry classification, mirroring the editor's three tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Meeting,
    Notes,
    Other,
}

impl EntryKind {
    /// Parse from the wire representation. Anything outside the three known
    /// kinds is an input error, not coerced.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "meeting" => Ok(Self::Meeting),
            "notes" => Ok(Self::Notes),
            "other" => Ok(Self::Other),
            _ => Err(Error::InvalidInput(format!(
                "type must be meeting, notes, or other, got {s:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::Notes => "notes",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar day an entry belongs to. Stored as three plain integers; the
/// entry belongs to the day the user filed it under, with no timezone math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDay {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl EntryDay {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Parse from `YYYY-MM-DD`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("invalid date format, expected YYYY-MM-DD, got {s:?}"));
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: i32 = parts[1].parse().map_err(|_| invalid())?;
        let day: i32 = parts[2].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }
        Ok(Self { year, month, day })
    }
}

impl std::fmt::Display for EntryDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A journal entry.
///
/// The embedding vector itself never leaves the database row; the entry
/// carries only the `embedding_synced_at` watermark used to derive
/// staleness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// Opaque editor delta, stored as-is.
    pub body_delta: JsonValue,
    pub body_html: String,
    /// Plain-text body, the content that gets embedded.
    pub body_text: String,
    pub attendees_original: String,
    pub attendees: Vec<String>,
    pub kind: EntryKind,
    pub day: EntryDay,
    /// Archived entries drop out of listings, search, sync, and retrieval.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Watermark of the last successful embedding write. `None` until the
    /// sync scheduler has embedded this entry at least once.
    pub embedding_synced_at: Option<DateTime<Utc>>,
}

/// The staleness predicate: an embedding is stale iff the vector is absent,
/// the watermark is absent, or the entry was edited after the watermark.
/// There is no dirty flag; staleness is derived purely from these inputs.
pub fn needs_embedding(
    has_embedding: bool,
    synced_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
) -> bool {
    match (has_embedding, synced_at) {
        (false, _) => true,
        (_, None) => true,
        (true, Some(watermark)) => updated_at > watermark,
    }
}

/// Normalize a comma-separated attendee string into clean display names.
pub fn normalize_attendees(original: &str) -> Vec<String> {
    original
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// =============================================================================
// RETRIEVAL TYPES
// =============================================================================

/// One nearest-neighbor hit: the smallest projection of an entry needed to
/// ground a prompt, plus its distance to the query.
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub entry_id: Uuid,
    pub title: String,
    pub day: EntryDay,
    pub body_text: String,
    /// Cosine distance to the query vector; smaller is closer.
    pub distance: f32,
}

// =============================================================================
// ATTACHMENT TYPES
// =============================================================================

/// File attachment stored inline with its metadata.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub entry_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn entry_kind_parse_round_trips() {
        for kind in ["meeting", "notes", "other"] {
            assert_eq!(EntryKind::parse(kind).unwrap().as_str(), kind);
        }
    }

    #[test]
    fn entry_kind_rejects_unknown() {
        assert!(EntryKind::parse("journal").is_err());
        assert!(EntryKind::parse("").is_err());
        assert!(EntryKind::parse("Meeting").is_err());
    }

    #[test]
    fn entry_day_parse_valid() {
        let day = EntryDay::parse("2026-08-07").unwrap();
        assert_eq!(day, EntryDay::new(2026, 8, 7));
        assert_eq!(day.to_string(), "2026-08-07");
    }

    #[test]
    fn entry_day_parse_rejects_garbage() {
        for bad in ["2026-08", "2026/08/07", "2026-13-01", "2026-01-40", "abcd-ef-gh", ""] {
            assert!(EntryDay::parse(bad).is_err(), "expected {bad:?} to fail");
        }
    }

    #[test]
    fn needs_embedding_when_vector_missing() {
        let now = Utc::now();
        assert!(needs_embedding(false, None, now));
        assert!(needs_embedding(false, Some(now), now));
    }

    #[test]
    fn needs_embedding_when_watermark_missing() {
        assert!(needs_embedding(true, None, Utc::now()));
    }

    #[test]
    fn needs_embedding_when_edit_outruns_watermark() {
        let watermark = Utc::now();
        let edited = watermark + Duration::seconds(1);
        assert!(needs_embedding(true, Some(watermark), edited));
    }

    #[test]
    fn fresh_after_watermark_catches_up() {
        let updated = Utc::now();
        let watermark = updated + Duration::seconds(1);
        assert!(!needs_embedding(true, Some(watermark), updated));
        // Equal timestamps count as fresh: staleness is strictly newer.
        assert!(!needs_embedding(true, Some(updated), updated));
    }

    #[test]
    fn normalize_attendees_splits_and_trims() {
        assert_eq!(
            normalize_attendees(" Alice ,Bob,, Carol Singer "),
            vec!["Alice", "Bob", "Carol Singer"]
        );
        assert!(normalize_attendees("").is_empty());
        assert!(normalize_attendees(" , ,").is_empty());
    }
}
