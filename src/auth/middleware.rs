use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use super::AdminClaims;
use crate::app::AppState;
use crate::error::ErrorResponse;

/// Extractor that requires a valid admin token.
///
/// ```ignore
/// async fn protected_route(_admin: RequireAdmin) -> impl IntoResponse {
///     "ok"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminClaims);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        let body = ErrorResponse {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            request_id: None,
        };

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingToken)?;

        let claims = state.admin_auth.verify_token(bearer.token()).map_err(|e| {
            tracing::warn!(error = %e, "Admin token rejected");
            AuthError::InvalidToken
        })?;

        Ok(RequireAdmin(claims))
    }
}
