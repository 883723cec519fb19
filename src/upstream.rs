//! HTTP boundary to the upstream data and credential services.
//!
//! This is the only module doing I/O. Everything it returns is either a raw
//! feed ready for [`crate::aggregate`] or an [`UpstreamError`] the caller
//! reports without touching previously loaded data.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

// ---

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure or timeout.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed body is not a JSON array")]
    NotAnArray,

    /// The recompute endpoint answered but reported failure.
    #[error("refresh failed: {0}")]
    RefreshRejected(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Fetch the raw feed. With `cache_bust` a `t=<unix millis>` query parameter
/// is appended so intermediaries cannot serve a stale copy.
pub async fn fetch_feed(
    client: &Client,
    url: &str,
    cache_bust: bool,
) -> Result<Vec<Value>, UpstreamError> {
    // ---
    let mut request = client.get(url);
    if cache_bust {
        request = request.query(&[("t", Utc::now().timestamp_millis())]);
    }

    debug!("Fetching feed from: {}", url);
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(UpstreamError::Status(response.status()));
    }

    let body = response.bytes().await?;
    match serde_json::from_slice::<Value>(&body)? {
        Value::Array(items) => {
            info!("Fetched {} raw incidents", items.len());
            Ok(items)
        }
        other => {
            warn!("Feed body is not an array: {}", preview(&other));
            Err(UpstreamError::NotAnArray)
        }
    }
}

/// Body of the recompute endpoint's reply.
#[derive(Debug, Deserialize)]
struct RefreshReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Ask the upstream pipeline to recompute the feed.
///
/// The endpoint answers `{"success": bool, "error"?: string}`, including on
/// HTTP 500, so the body is read before the status is judged.
pub async fn trigger_refresh(client: &Client, url: &str) -> Result<(), UpstreamError> {
    // ---
    debug!("Triggering upstream recompute: {}", url);
    let response = client.post(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<RefreshReply>(&body) {
        Ok(reply) if reply.success && status.is_success() => Ok(()),
        Ok(reply) => Err(UpstreamError::RefreshRejected(
            reply.error.unwrap_or_else(|| format!("HTTP {}", status)),
        )),
        Err(_) if !status.is_success() => Err(UpstreamError::Status(status)),
        Err(e) => Err(UpstreamError::Json(e)),
    }
}

/// Operator or viewer, as the credential service knows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Viewer,
}

impl Role {
    /// Anything but "viewer" is an operator, matching the credential service.
    pub fn from_user_type(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("viewer") {
            Role::Viewer
        } else {
            Role::Operator
        }
    }

    /// Strict parse: only the two exact role names, any case.
    pub fn parse_strict(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "operator" => Some(Role::Operator),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub department_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub user_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub department_id: String,
    pub user_type: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Value,
    pub department_id: Value,
    pub user_type: String,
}

/// Shared reply shape of both credential endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Forward a login to `<base>/api/login`. Returns the upstream status with
/// its reply; a rejected login is a reply, not an error.
pub async fn login(
    client: &Client,
    base: &str,
    request: &LoginRequest,
) -> Result<(StatusCode, CredentialReply), UpstreamError> {
    post_credentials(client, &format!("{}/api/login", base.trim_end_matches('/')), request).await
}

/// Forward a password change to `<base>/api/update-password`.
pub async fn update_password(
    client: &Client,
    base: &str,
    request: &PasswordUpdateRequest,
) -> Result<(StatusCode, CredentialReply), UpstreamError> {
    // ---
    let url = format!("{}/api/update-password", base.trim_end_matches('/'));
    post_credentials(client, &url, request).await
}

async fn post_credentials<T: Serialize>(
    client: &Client,
    url: &str,
    body: &T,
) -> Result<(StatusCode, CredentialReply), UpstreamError> {
    // ---
    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<CredentialReply>(&bytes) {
        Ok(reply) => Ok((status, reply)),
        Err(_) if !status.is_success() => Err(UpstreamError::Status(status)),
        Err(e) => Err(UpstreamError::Json(e)),
    }
}

fn preview(value: &Value) -> String {
    let text = value.to_string();
    text.chars().take(200).collect()
}
