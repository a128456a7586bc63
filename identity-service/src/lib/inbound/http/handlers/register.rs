use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::errors::UsernameError;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|grant| {
            ApiSuccess::new(
                StatusCode::CREATED,
                RegisterResponseData { token: grant.token },
            )
        })
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    username: String,
    #[serde(default)]
    email: Option<String>,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        // An empty email field means "no email"
        let email = self
            .email
            .filter(|email| !email.trim().is_empty())
            .map(EmailAddress::new)
            .transpose()?;
        Ok(RegisterCommand::new(username, email, self.password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.map(str::to_string),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn test_blank_email_is_absent() {
        let command = request("alice", Some("  ")).try_into_command().unwrap();
        assert!(command.email.is_none());
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        assert!(matches!(
            request("a b", None).try_into_command(),
            Err(ParseRegisterRequestError::Username(_))
        ));
        assert!(matches!(
            request("alice", Some("not-an-email")).try_into_command(),
            Err(ParseRegisterRequestError::Email(_))
        ));
    }
}
