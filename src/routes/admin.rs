//! Admin console session
//!
//! Every other `/admin` route takes a `RequireAdmin` extractor fed by the
//! token issued here.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<DataResponse<LoginResponse>> {
    if !state.admin_auth.check_password(&request.password) {
        tracing::warn!("Rejected admin login attempt");
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let token = state.admin_auth.issue_token()?;
    tracing::info!("Admin logged in");

    Ok(DataResponse::new(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.admin_auth.token_ttl_seconds(),
    }))
}
