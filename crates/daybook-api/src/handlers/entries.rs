//! Entry CRUD, calendar, and search handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use daybook_core::{CreateEntry, Entry, EntryDay, EntryKind, EntryRepository, Error, UpdateEntry};

use super::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_delta: JsonValue,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub attendees_original: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub body_delta: Option<JsonValue>,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
    pub attendees_original: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub title: String,
    pub body_delta: JsonValue,
    pub body_html: String,
    pub body_text: String,
    pub attendees_original: String,
    pub attendees: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            body_delta: entry.body_delta,
            body_html: entry.body_html,
            body_text: entry.body_text,
            attendees_original: entry.attendees_original,
            attendees: entry.attendees,
            kind: entry.kind.to_string(),
            date: entry.day.to_string(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

pub async fn list_for_day(
    State(state): State<SharedState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let day = EntryDay::parse(&date)?;
    let app = state.current().await;
    let entries = app
        .db
        .entries
        .list_for_day(app.config.app.owner_id, day)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let kind = EntryKind::parse(&req.kind)?;
    let day = EntryDay::parse(&req.date)?;

    let app = state.current().await;
    let entry = app
        .db
        .entries
        .insert(
            app.config.app.owner_id,
            CreateEntry {
                title: req.title,
                body_delta: req.body_delta,
                body_html: req.body_html,
                body_text: req.body_text,
                attendees_original: req.attendees_original,
                kind,
                day,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let kind = req.kind.as_deref().map(EntryKind::parse).transpose()?;

    let app = state.current().await;
    let entry = app
        .db
        .entries
        .update(
            id,
            UpdateEntry {
                title: req.title,
                body_delta: req.body_delta,
                body_html: req.body_html,
                body_text: req.body_text,
                attendees_original: req.attendees_original,
                kind,
            },
        )
        .await?;

    Ok(Json(entry.into()))
}

pub async fn archive(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let app = state.current().await;
    app.db.entries.archive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct EntryDaysResponse {
    #[serde(rename = "daysWithEntries")]
    pub days_with_entries: Vec<i32>,
}

pub async fn days_with_entries(
    State(state): State<SharedState>,
    Path(yearmonth): Path<String>,
) -> Result<Json<EntryDaysResponse>, ApiError> {
    let (year, month) = parse_year_month(&yearmonth)?;
    let app = state.current().await;
    let days = app
        .db
        .entries
        .days_with_entries(app.config.app.owner_id, year, month)
        .await?;
    Ok(Json(EntryDaysResponse {
        days_with_entries: days,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    if params.q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let app = state.current().await;
    let entries = app
        .db
        .entries
        .search(app.config.app.owner_id, &params.q)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Parse a `YYYY-MM` calendar bucket.
fn parse_year_month(s: &str) -> Result<(i32, i32), Error> {
    let invalid =
        || Error::InvalidInput(format!("invalid year-month format, expected YYYY-MM, got {s:?}"));
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: i32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
