//! Attachment upload/download handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use daybook_core::{AttachmentRepository, EntryRepository, Error};

use super::ApiError;
use crate::state::SharedState;

pub async fn upload(
    State(state): State<SharedState>,
    Path(entry_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let app = state.current().await;
    // The entry must exist before we accept bytes for it.
    app.db.entries.fetch(entry_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("attachment").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("failed to read file field: {e}")))?
            .to_vec();

        let attachment = app
            .db
            .attachments
            .insert(app.config.app.owner_id, entry_id, &filename, &mime_type, data)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "id": attachment.id,
                "filename": attachment.filename,
                "mime_type": attachment.mime_type,
                "size_bytes": attachment.size_bytes,
                "created_at": attachment.created_at,
            })),
        ));
    }

    Err(ApiError(Error::InvalidInput("no file provided".to_string())))
}

pub async fn download(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state.current().await;
    let attachment = app.db.attachments.fetch(id).await?;

    let headers = [
        (header::CONTENT_TYPE, attachment.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.filename),
        ),
    ];
    Ok((headers, attachment.data))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let app = state.current().await;
    app.db.attachments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
