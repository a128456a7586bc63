use std::sync::Arc;

use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::Argon2Verifier;
use crate::password::CredentialVerifier;
use crate::password::PasswordError;

/// Authentication coordinator combining credential verification and token handling.
///
/// Holds the process-wide signing key and token lifetime. Built once at
/// startup and shared read-only between requests.
pub struct Authenticator {
    credentials: Arc<dyn CredentialVerifier>,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator using Argon2id for credentials.
    ///
    /// # Arguments
    /// * `jwt_handler` - Configured token codec
    /// * `token_ttl` - Lifetime of every issued token
    pub fn new(jwt_handler: JwtHandler, token_ttl: Duration) -> Self {
        Self {
            credentials: Arc::new(Argon2Verifier::new()),
            jwt_handler,
            token_ttl,
        }
    }

    /// Swap the credential verifier.
    pub fn with_credential_verifier(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.credentials.hash(password)
    }

    /// Check a password against a stored hash without issuing anything.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is unusable
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.credentials.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for `user_id`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: u64,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(user_id)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a token without credential verification.
    ///
    /// Used right after registration and for refresh, where identity has
    /// already been established.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, user_id: u64) -> Result<String, JwtError> {
        self.jwt_handler.issue(user_id, self.token_ttl)
    }

    /// Validate and decode a bearer token.
    ///
    /// # Errors
    /// * `JwtError` - Token is malformed, forged or expired
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> (Authenticator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let handler = JwtHandler::new(SECRET).with_clock(clock.clone());
        let authenticator = Authenticator::new(handler, Duration::minutes(15))
            .with_credential_verifier(Arc::new(Argon2Verifier::with_params(1024, 1, 1).unwrap()));
        (authenticator, clock)
    }

    #[test]
    fn test_authenticate_success() {
        let (authenticator, _) = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate("my_password", &hash, 99)
            .expect("Authentication failed");

        let claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.user_id, 99);
        assert_eq!(claims.exp, 1_700_000_000 + 15 * 60);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let (authenticator, _) = authenticator();
        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.authenticate("wrong_password", &hash, 99);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_issued_token_lapses_after_ttl() {
        let (authenticator, clock) = authenticator();
        let token = authenticator.issue_token(3).unwrap();

        clock.advance(Duration::minutes(15));

        assert!(matches!(
            authenticator.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let (authenticator, _) = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}
