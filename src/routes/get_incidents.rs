use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{failure, not_loaded};
use crate::{AppState, Incident};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/incidents", get(list))
        .route("/api/incidents/ongoing", get(ongoing))
        .route("/api/incidents/{id}", get(detail))
}

#[derive(Serialize)]
struct IncidentsResponse<'a> {
    fetched_at: DateTime<Utc>,
    count: usize,
    incidents: &'a [Incident],
}

/// Handle `GET /api/incidents`: the recency window for table and map.
async fn list(State(state): State<AppState>) -> Response {
    // ---
    let Some(snapshot) = state.snapshot().await else {
        return not_loaded();
    };
    debug!("GET /api/incidents - {} rows", snapshot.view.table.len());

    Json(IncidentsResponse {
        fetched_at: snapshot.fetched_at,
        count: snapshot.view.table.len(),
        incidents: &snapshot.view.table,
    })
    .into_response()
}

/// Handle `GET /api/incidents/ongoing`: the map overlay subset.
async fn ongoing(State(state): State<AppState>) -> Response {
    // ---
    let Some(snapshot) = state.snapshot().await else {
        return not_loaded();
    };

    Json(IncidentsResponse {
        fetched_at: snapshot.fetched_at,
        count: snapshot.view.ongoing.len(),
        incidents: &snapshot.view.ongoing,
    })
    .into_response()
}

/// Handle `GET /api/incidents/{id}`: one incident with its enriched payload.
async fn detail(Path(id): Path<u32>, State(state): State<AppState>) -> Response {
    // ---
    let Some(snapshot) = state.snapshot().await else {
        return not_loaded();
    };

    match snapshot.view.find(id) {
        Some(incident) => Json(incident).into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("incident {} not found", id)),
    }
}
