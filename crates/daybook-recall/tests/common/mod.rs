//! In-memory repository/store fixtures for scheduler and engine tests.

// Each test binary compiles this module separately and uses a different
// subset of its helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use daybook_core::{
    needs_embedding, normalize_attendees, CreateEntry, Entry, EntryDay, EntryKind,
    EntryRepository, Error, Result, RetrievalHit, UpdateEntry, Vector, VectorStore,
};

struct Record {
    entry: Entry,
    vector: Option<Vector>,
}

/// In-memory implementation of both `EntryRepository` and `VectorStore`,
/// mirroring the SQL contracts closely enough to exercise the scheduler
/// and answer engine without a database.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, Record>>,
    fail_nearest: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `nearest` fail, simulating an unreachable store.
    pub fn fail_nearest(&self, on: bool) {
        self.fail_nearest.store(on, Ordering::SeqCst);
    }

    /// Test hook: place a fully-formed entry (and optional vector) directly,
    /// keeping its id. Lets a test stage divergent views of the same entry
    /// across two stores.
    pub fn insert_record(&self, entry: Entry, vector: Option<Vector>) {
        self.records
            .lock()
            .unwrap()
            .insert(entry.id, Record { entry, vector });
    }

    /// Test hook: whether an entry currently has a stored vector.
    pub fn has_vector(&self, id: Uuid) -> bool {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .map(|r| r.vector.is_some())
            .unwrap_or(false)
    }
}

pub fn draft(title: &str, body: &str) -> CreateEntry {
    CreateEntry {
        title: title.to_string(),
        body_delta: serde_json::json!({"ops": []}),
        body_html: format!("<p>{body}</p>"),
        body_text: body.to_string(),
        attendees_original: String::new(),
        kind: EntryKind::Notes,
        day: EntryDay::new(2026, 8, 7),
    }
}

fn cosine_distance(a: &Vector, b: &Vector) -> f32 {
    let a = a.as_slice();
    let b = b.as_slice();
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    1.0 - dot / (na * nb)
}

#[async_trait]
impl EntryRepository for MemoryStore {
    async fn insert(&self, owner_id: Uuid, entry: CreateEntry) -> Result<Entry> {
        let now = Utc::now();
        let stored = Entry {
            id: Uuid::new_v4(),
            owner_id,
            title: entry.title,
            body_delta: entry.body_delta,
            body_html: entry.body_html,
            body_text: entry.body_text,
            attendees: normalize_attendees(&entry.attendees_original),
            attendees_original: entry.attendees_original,
            kind: entry.kind,
            day: entry.day,
            archived: false,
            created_at: now,
            updated_at: now,
            embedding_synced_at: None,
        };
        self.records.lock().unwrap().insert(
            stored.id,
            Record {
                entry: stored.clone(),
                vector: None,
            },
        );
        Ok(stored)
    }

    async fn fetch(&self, id: Uuid) -> Result<Entry> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .map(|r| r.entry.clone())
            .ok_or(Error::EntryNotFound(id))
    }

    async fn update(&self, id: Uuid, patch: UpdateEntry) -> Result<Entry> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(Error::EntryNotFound(id))?;
        let entry = &mut record.entry;
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(delta) = patch.body_delta {
            entry.body_delta = delta;
        }
        if let Some(html) = patch.body_html {
            entry.body_html = html;
        }
        if let Some(text) = patch.body_text {
            entry.body_text = text;
        }
        if let Some(original) = patch.attendees_original {
            entry.attendees = normalize_attendees(&original);
            entry.attendees_original = original;
        }
        if let Some(kind) = patch.kind {
            entry.kind = kind;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn archive(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(Error::EntryNotFound(id))?;
        record.entry.archived = true;
        Ok(())
    }

    async fn list_for_day(&self, owner_id: Uuid, day: EntryDay) -> Result<Vec<Entry>> {
        let records = self.records.lock().unwrap();
        let mut entries: Vec<Entry> = records
            .values()
            .filter(|r| r.entry.owner_id == owner_id && r.entry.day == day && !r.entry.archived)
            .map(|r| r.entry.clone())
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn days_with_entries(&self, owner_id: Uuid, year: i32, month: i32) -> Result<Vec<i32>> {
        let records = self.records.lock().unwrap();
        let mut days: Vec<i32> = records
            .values()
            .filter(|r| {
                let e = &r.entry;
                e.owner_id == owner_id && e.day.year == year && e.day.month == month && !e.archived
            })
            .map(|r| r.entry.day.day)
            .collect();
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }

    async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Entry>> {
        let needle = query.to_lowercase();
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|r| {
                let e = &r.entry;
                e.owner_id == owner_id
                    && !e.archived
                    && (e.title.to_lowercase().contains(&needle)
                        || e.body_text.to_lowercase().contains(&needle)
                        || e.attendees_original.to_lowercase().contains(&needle))
            })
            .map(|r| r.entry.clone())
            .collect())
    }

    async fn list_all(&self, owner_id: Uuid) -> Result<Vec<Entry>> {
        let records = self.records.lock().unwrap();
        let mut entries: Vec<Entry> = records
            .values()
            .filter(|r| r.entry.owner_id == owner_id && !r.entry.archived)
            .map(|r| r.entry.clone())
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn fetch_stale_batch(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Entry>> {
        let records = self.records.lock().unwrap();
        let mut stale: Vec<Entry> = records
            .values()
            .filter(|r| {
                let e = &r.entry;
                e.owner_id == owner_id
                    && !e.archived
                    && needs_embedding(r.vector.is_some(), e.embedding_synced_at, e.updated_at)
            })
            .map(|r| r.entry.clone())
            .collect();
        stale.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        stale.truncate(limit.max(0) as usize);
        Ok(stale)
    }

    async fn upsert_vector(&self, entry_id: Uuid, vector: &Vector) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&entry_id).ok_or(Error::EntryNotFound(entry_id))?;
        record.vector = Some(vector.clone());
        record.entry.embedding_synced_at = Some(Utc::now());
        Ok(())
    }

    async fn nearest(&self, owner_id: Uuid, query: &Vector, k: i64) -> Result<Vec<RetrievalHit>> {
        if self.fail_nearest.load(Ordering::SeqCst) {
            return Err(Error::Internal("simulated store outage".to_string()));
        }
        let records = self.records.lock().unwrap();
        let mut hits: Vec<RetrievalHit> = records
            .values()
            .filter(|r| r.entry.owner_id == owner_id && !r.entry.archived)
            .filter_map(|r| {
                let vector = r.vector.as_ref()?;
                Some(RetrievalHit {
                    entry_id: r.entry.id,
                    title: r.entry.title.clone(),
                    day: r.entry.day,
                    body_text: r.entry.body_text.clone(),
                    distance: cosine_distance(query, vector),
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entry_id.cmp(&b.entry_id))
        });
        hits.truncate(k.max(0) as usize);
        Ok(hits)
    }
}
