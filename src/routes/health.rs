// src/routes/health.rs
//! Service health check endpoint.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is up. It is a sibling module
//! in the `routes` directory and follows the Explicit Module Boundary Pattern
//! (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter with `/health` and `/api/health`
//!
//! Liveness only: the handler never touches the feed snapshot or any upstream.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter serving health at `/health` and at `/api/health`,
/// where the dashboard calls it.
///
/// Generic over the application state so it merges cleanly with the gateway
/// router whatever the state type is.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
}
