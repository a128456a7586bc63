use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::account::models::ChangePasswordCommand;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

/// The account is taken from the gate, never from the body.
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthenticatedAccount,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<ChangePasswordResponseData>, ApiError> {
    state
        .account_service
        .change_password(caller.account_id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                ChangePasswordResponseData {
                    message: "Password changed successfully".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "old_secret")]
    old_password: String,
    #[serde(alias = "new_secret")]
    new_password: String,
}

impl From<ChangePasswordRequest> for ChangePasswordCommand {
    fn from(request: ChangePasswordRequest) -> Self {
        Self {
            old_password: request.old_password,
            new_password: request.new_password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePasswordResponseData {
    pub message: String,
}
