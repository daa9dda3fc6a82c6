// HTTP handlers: version, setup, entries, sensors, manual refresh

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::AppState;
use crate::coordinator::CoordinatorStatus;
use crate::setup_flow::{SetupOutcome, UserInput};
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /api/setup: body `{url, token}`; an empty body returns the blank form.
pub(super) async fn setup_handler(
    State(state): State<AppState>,
    body: Option<Json<UserInput>>,
) -> Response {
    match state.hub.setup(body.map(|Json(input)| input)).await {
        Ok(outcome) => {
            let status = match &outcome {
                SetupOutcome::CreateEntry { .. } => StatusCode::CREATED,
                SetupOutcome::Abort { .. } => StatusCode::CONFLICT,
                SetupOutcome::Form { .. } => StatusCode::OK,
            };
            (status, Json(outcome)).into_response()
        }
        Err(e) => internal_error("setup", e),
    }
}

/// GET /api/entries: configured households (tokens omitted) with poll status.
pub(super) async fn list_entries_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.entry_statuses().await)
}

/// DELETE /api/entries/{entry_id}
pub(super) async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Response {
    match state.hub.remove_entry(&entry_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(&entry_id),
        Err(e) => internal_error("remove_entry", e),
    }
}

/// GET /api/entries/{entry_id}/sensors
pub(super) async fn entry_sensors_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Response {
    match state.hub.sensors(&entry_id).await {
        Some(sensors) => Json(sensors).into_response(),
        None => not_found(&entry_id),
    }
}

/// POST /api/entries/{entry_id}/refresh: coalesced with a poll already in flight.
pub(super) async fn refresh_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Response {
    let Some(coordinator) = state.hub.coordinator(&entry_id).await else {
        return not_found(&entry_id);
    };
    let outcome = coordinator.refresh().await;
    let status = CoordinatorStatus::from(&coordinator.state().await);
    Json(json!({
        "success": outcome.is_ok(),
        "message": outcome.err().map(|e| e.to_string()),
        "status": status,
    }))
    .into_response()
}

/// GET /api/sensors: every sensor of every entry.
pub(super) async fn all_sensors_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.all_sensors().await)
}

fn not_found(entry_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown entry {}", entry_id) })),
    )
        .into_response()
}

fn internal_error(operation: &str, e: anyhow::Error) -> Response {
    tracing::warn!(error = %e, operation, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}
