use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::{failure, not_loaded};
use crate::report::{self, ReportSection};
use crate::upstream::Role;
use crate::AppState;

// ---

/// Header carrying the caller's role as returned by the credential service.
pub const ROLE_HEADER: &str = "x-user-role";

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/incidents/{id}/report", get(handler))
}

#[derive(Serialize)]
struct ReportResponse {
    title: String,
    filename: String,
    lines: Vec<String>,
    sections: Vec<ReportSection>,
}

/// Handle `GET /api/incidents/{id}/report`. Operators only.
async fn handler(
    Path(id): Path<u32>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    // ---
    let role = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse_strict);
    if role != Some(Role::Operator) {
        return failure(StatusCode::FORBIDDEN, "reports are available to operators only");
    }

    let Some(snapshot) = state.snapshot().await else {
        return not_loaded();
    };
    let Some(incident) = snapshot.view.find(id) else {
        return failure(StatusCode::NOT_FOUND, format!("incident {} not found", id));
    };

    let report = report::compile(incident, &state.config.product_name, Utc::now());
    info!("Compiled report {} for incident {}", report.filename, incident.original_id);

    Json(ReportResponse {
        lines: report.lines(),
        title: report.title,
        filename: report.filename,
        sections: report.sections,
    })
    .into_response()
}
