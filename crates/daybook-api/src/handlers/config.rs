//! Configuration inspection and save-and-reload handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::info;

use daybook_core::{config_path, Config, Error};

use super::ApiError;
use crate::state::SharedState;

/// Current configuration with credentials stripped.
pub async fn show(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    let app = state.current().await;
    let mut cfg = app.config.clone();
    cfg.database.url = redact_database_url(&cfg.database.url);
    Ok(Json(serde_json::to_value(&cfg).map_err(Error::from)?))
}

/// Persist a new configuration and swap resources over to it.
pub async fn save(
    State(state): State<SharedState>,
    Json(config): Json<Config>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let report = config.validate();
    if !report.is_valid() {
        return Err(ApiError(Error::InvalidInput(report.format_for_display())));
    }

    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(Error::from)?;
    }
    std::fs::write(&path, config.to_yaml()?).map_err(Error::from)?;
    info!(path = %path.display(), "Configuration written");

    state.reload(config).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "status": "reloaded", "config_path": path.display().to_string() })),
    ))
}

/// Mask the credential section of a connection URL for display.
fn redact_database_url(url: &str) -> String {
    match (url.find("://"), url.find('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials_when_present() {
        assert_eq!(
            redact_database_url("postgres://user:secret@db:5432/daybook"),
            "postgres://***@db:5432/daybook"
        );
    }

    #[test]
    fn leaves_credential_free_urls_alone() {
        assert_eq!(
            redact_database_url("postgres://localhost/daybook"),
            "postgres://localhost/daybook"
        );
        assert_eq!(redact_database_url(""), "");
    }
}
