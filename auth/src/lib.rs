//! Authentication utilities library
//!
//! Provides the token and credential primitives behind the identity service:
//! - Credential hashing (Argon2id) behind the [`CredentialVerifier`] trait
//! - Signed bearer tokens (HMAC-family JWT) carrying `user_id` and `exp`
//! - An injectable [`Clock`] so expiry can be simulated in tests
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{Argon2Verifier, CredentialVerifier};
//!
//! let verifier = Argon2Verifier::new();
//! let hash = verifier.hash("my_password").unwrap();
//! assert!(verifier.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::JwtHandler;
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue(42, Duration::hours(1)).unwrap();
//! let claims = handler.verify(&token).unwrap();
//! assert_eq!(claims.user_id, 42);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, JwtHandler};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     JwtHandler::new(b"secret_key_at_least_32_bytes_long!"),
//!     Duration::hours(24),
//! );
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, 1).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.user_id, 1);
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::parse_ttl;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TtlError;
pub use password::Argon2Verifier;
pub use password::CredentialVerifier;
pub use password::PasswordError;

// Re-exported so callers can pick a signing algorithm without depending on jsonwebtoken
pub use jsonwebtoken::Algorithm;
