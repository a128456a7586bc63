pub mod argon2;
pub mod errors;

pub use argon2::Argon2Verifier;
pub use errors::PasswordError;

/// One-way secret hashing and verification.
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Hash a plaintext secret for storage.
    fn hash(&self, secret: &str) -> Result<String, PasswordError>;

    /// Check a plaintext secret against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for unusable hashes.
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, PasswordError>;
}
