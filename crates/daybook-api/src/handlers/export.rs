//! Journal export: one JSON document per entry, packed as tar.gz.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use tracing::info;

use daybook_core::{Entry, EntryRepository, Error};

use super::ApiError;
use crate::state::SharedState;

pub async fn export(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let app = state.current().await;
    let entries = app.db.entries.list_all(app.config.app.owner_id).await?;
    let count = entries.len();

    let archive = build_archive(&entries)?;
    info!(entry_count = count, bytes = archive.len(), "Journal export built");

    let filename = format!("daybook_export_{}.tar.gz", Utc::now().format("%Y-%m-%d"));
    let headers = [
        (header::CONTENT_TYPE, "application/gzip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, archive))
}

fn build_archive(entries: &[Entry]) -> Result<Vec<u8>, Error> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let name = format!(
            "{}_{}_{}.json",
            entry.day,
            &entry.id.to_string()[..8],
            sanitize_filename(&entry.title)
        );
        let body = serde_json::to_vec_pretty(&json!({
            "id": entry.id,
            "title": entry.title,
            "body_delta": entry.body_delta,
            "body_html": entry.body_html,
            "body_text": entry.body_text,
            "type": entry.kind.to_string(),
            "date": entry.day.to_string(),
            "attendees": entry.attendees,
            "created_at": entry.created_at,
            "updated_at": entry.updated_at,
        }))?;
        append_file(&mut builder, &name, &body)?;
    }

    let metadata = serde_json::to_vec_pretty(&json!({
        "export_date": Utc::now(),
        "entry_count": entries.len(),
        "export_format": "json",
        "version": "1.0",
    }))?;
    append_file(&mut builder, "metadata.json", &metadata)?;

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::Internal(format!("failed to finish export archive: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::Internal(format!("failed to compress export archive: {e}")))
}

fn append_file(
    builder: &mut tar::Builder<GzEncoder<Vec<u8>>>,
    name: &str,
    data: &[u8],
) -> Result<(), Error> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, name, data)
        .map_err(|e| Error::Internal(format!("failed to write {name} to export archive: {e}")))
}

/// Replace characters that are problematic in filenames and cap the length.
fn sanitize_filename(s: &str) -> String {
    let safe: String = s
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            other => other,
        })
        .collect();
    safe.chars().take(50).collect()
}
