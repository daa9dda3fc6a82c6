// HTTP + WebSocket routes: setup flow, entries and sensor states

mod http;
mod ws;

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::hub::Hub;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) hub: Arc<Hub>,
}

pub fn app(hub: Arc<Hub>) -> Router {
    let state = AppState { hub };
    Router::new()
        .route("/", get(|| async { "HaushaltsApp bridge" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/setup", post(http::setup_handler)) // POST /api/setup
        .route("/api/entries", get(http::list_entries_handler)) // GET /api/entries
        .route("/api/entries/{entry_id}", delete(http::delete_entry_handler)) // DELETE /api/entries/{id}
        .route(
            "/api/entries/{entry_id}/sensors",
            get(http::entry_sensors_handler),
        ) // GET /api/entries/{id}/sensors
        .route(
            "/api/entries/{entry_id}/refresh",
            post(http::refresh_handler),
        ) // POST /api/entries/{id}/refresh
        .route("/api/sensors", get(http::all_sensors_handler)) // GET /api/sensors
        .route("/ws/sensors", get(ws::ws_sensors)) // WS /ws/sensors
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
