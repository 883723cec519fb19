//! Pass-through to the external credential services.
//!
//! Login and password changes are owned upstream; this service only
//! forwards them so the UI talks to a single origin.

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, routing::post, Json, Router};
use tracing::{error, info};

use super::failure;
use crate::upstream::{self, CredentialReply, LoginRequest, PasswordUpdateRequest, Role};
use crate::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/login", post(login))
        .route("/api/update-password", post(update_password))
}

async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    // ---
    let Some(base) = state.config.auth_api_url.as_deref() else {
        return failure(StatusCode::SERVICE_UNAVAILABLE, "AUTH_API_URL is not configured");
    };
    info!("POST /api/login - department {}", request.department_id);

    match upstream::login(&state.client, base, &request).await {
        Ok((status, reply)) => (status, Json(reply)).into_response(),
        Err(e) => {
            error!("Credential service unreachable: {}", e);
            failure(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn update_password(
    State(state): State<AppState>,
    Json(request): Json<PasswordUpdateRequest>,
) -> Response {
    // ---
    if Role::from_user_type(&request.user_type) != Role::Operator {
        let reply = CredentialReply {
            success: false,
            message: Some("Only operators can change password".to_string()),
            user: None,
        };
        return (StatusCode::FORBIDDEN, Json(reply)).into_response();
    }
    let Some(base) = state.config.auth_api_url.as_deref() else {
        return failure(StatusCode::SERVICE_UNAVAILABLE, "AUTH_API_URL is not configured");
    };
    info!("POST /api/update-password - department {}", request.department_id);

    match upstream::update_password(&state.client, base, &request).await {
        Ok((status, reply)) => (status, Json(reply)).into_response(),
        Err(e) => {
            error!("Credential service unreachable: {}", e);
            failure(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
