//! HTTP handlers and router assembly.

pub mod attachments;
pub mod chat;
pub mod config;
pub mod entries;
pub mod export;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use daybook_core::Error;

use crate::state::SharedState;

/// Error wrapper mapping core errors onto HTTP statuses.
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::EntryNotFound(_) | Error::AttachmentNotFound(_) | Error::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E: Into<Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let app = state.current().await;
    // Embedded-entry count is best effort; health stays 200 when the
    // database is briefly unreachable.
    let embedded = app
        .db
        .vectors
        .embedded_count(app.config.app.owner_id)
        .await
        .ok();
    Json(json!({
        "status": "ok",
        "sync_running": app.sync.is_running(),
        "embedded_entries": embedded,
    }))
}

/// Assemble the API router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/days/:date/entries", get(entries::list_for_day))
        .route("/api/entries", post(entries::create))
        .route(
            "/api/entries/:id",
            axum::routing::patch(entries::update).delete(entries::archive),
        )
        .route("/api/months/:yearmonth/entry-days", get(entries::days_with_entries))
        .route("/api/search", get(entries::search))
        .route("/api/chat", post(chat::chat))
        .route("/api/entries/:id/attachments", post(attachments::upload))
        .route(
            "/api/attachments/:id",
            get(attachments::download).delete(attachments::delete),
        )
        .route("/api/export", get(export::export))
        .route("/api/config", get(config::show).put(config::save))
        .with_state(state)
}
