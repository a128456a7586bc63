use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Trade a still-valid bearer token for a fresh one. No password involved.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<RefreshTokenResponseData>, ApiError> {
    let token = bearer_token(&headers).map_err(|e| {
        tracing::warn!("Refresh rejected: {}", e);
        ApiError::unauthorized()
    })?;

    state
        .account_service
        .refresh(token)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, RefreshTokenResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTokenResponseData {
    pub token: String,
}
