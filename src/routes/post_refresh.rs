use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::failure;
use crate::upstream::UpstreamError;
use crate::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/refresh", post(handler))
}

#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    /// Skip the upstream recompute and only re-fetch when `false`.
    recompute: Option<bool>,
}

#[derive(Serialize)]
struct RefreshResponse {
    success: bool,
    incidents: usize,
    ongoing: usize,
    fetched_at: chrono::DateTime<chrono::Utc>,
}

/// Handle `POST /api/refresh`.
///
/// Recompute upstream, re-fetch, replace the snapshot. On failure the
/// previous snapshot keeps serving.
async fn handler(Query(params): Query<RefreshQuery>, State(state): State<AppState>) -> Response {
    // ---
    let Some(_busy) = state.begin_refresh() else {
        warn!("POST /api/refresh - refresh already running");
        return failure(StatusCode::CONFLICT, "a refresh is already in progress");
    };

    let recompute = params.recompute.unwrap_or(true);
    info!("POST /api/refresh - recompute={}", recompute);

    match state.refresh(recompute).await {
        Ok(snapshot) => Json(RefreshResponse {
            success: true,
            incidents: snapshot.view.incidents.len(),
            ongoing: snapshot.view.ongoing.len(),
            fetched_at: snapshot.fetched_at,
        })
        .into_response(),
        Err(e @ UpstreamError::NotConfigured(_)) => {
            failure(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e) => failure(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
