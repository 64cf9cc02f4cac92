//! Question-answering handler over the retrieval pipeline.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use daybook_core::Error;

use super::entries::EntryResponse;
use super::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    /// Cited entries, order-preserved, full records.
    pub source_entries: Vec<EntryResponse>,
    /// Opaque identifier for this answer turn.
    pub message_id: String,
}

pub async fn chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError(Error::InvalidInput(
            "message is required".to_string(),
        )));
    }

    let app = state.current().await;
    let answer = app
        .engine
        .answer(app.config.app.owner_id, &req.message)
        .await?;

    Ok(Json(ChatResponse {
        response: answer.text,
        source_entries: answer.sources.into_iter().map(Into::into).collect(),
        message_id: answer.turn_id.to_string(),
    }))
}
