use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;

use crate::AppState;

mod auth;
mod get_incidents;
mod get_report;
mod health;
mod post_refresh;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(get_incidents::router())
        .merge(get_report::router())
        .merge(post_refresh::router())
        .merge(auth::router())
        .merge(health::router())
        .with_state(state)
}

/// Uniform `{"success": false, "error": ...}` body.
fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({"success": false, "error": message.into()}))).into_response()
}

fn not_loaded() -> Response {
    failure(StatusCode::SERVICE_UNAVAILABLE, "incident feed has not been loaded yet")
}
