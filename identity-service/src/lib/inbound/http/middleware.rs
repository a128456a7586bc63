use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use thiserror::Error;

use super::handlers::ApiError;
use crate::account::models::AccountId;
use crate::inbound::http::router::AppState;

/// Identity admitted by [`authorize`], stored in request extensions.
///
/// Handlers take it as an extractor; it can only be produced from a verified
/// token, never from client-supplied input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
}

/// Why a request was turned away.
///
/// Only logged. Clients always get the same 401 body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Malformed Authorization header, expected `Bearer <token>`")]
    MalformedHeader,

    #[error("Token rejected: {0}")]
    Unauthorized(String),
}

impl IntoResponse for AuthorizationError {
    fn into_response(self) -> Response {
        tracing::warn!("Authorization failed: {}", self);
        ApiError::unauthorized().into_response()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The value must split on single spaces into exactly two non-empty parts,
/// the first being `bearer` in any case.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthorizationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthorizationError::MissingToken)?;

    if value.is_empty() {
        return Err(AuthorizationError::MissingToken);
    }

    let value = value
        .to_str()
        .map_err(|_| AuthorizationError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(*token)
        }
        _ => Err(AuthorizationError::MalformedHeader),
    }
}

/// Gate for protected routes: verify the bearer token and admit its account.
pub async fn authorize(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthorizationError> {
    let token = bearer_token(req.headers())?;

    let claims = state
        .authenticator
        .validate_token(token)
        .map_err(|e| AuthorizationError::Unauthorized(e.to_string()))?;

    let account_id = AccountId::try_from(claims.user_id)
        .map_err(|e| AuthorizationError::Unauthorized(e.to_string()))?;

    req.extensions_mut()
        .insert(AuthenticatedAccount { account_id });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AuthorizationError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .copied()
            .ok_or_else(|| {
                AuthorizationError::Unauthorized("route is not behind the gate".to_string())
            })
    }
}
