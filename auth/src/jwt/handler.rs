use std::collections::HashSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Algorithms a token header may name. Anything else (`none`, RSA, ECDSA)
/// is rejected before the signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT token handler for issuing and verifying bearer tokens.
///
/// Signs with a symmetric key using an HMAC algorithm (HS256 by default).
/// Expiry is checked against the injected [`Clock`], strictly: a token whose
/// `exp` equals the current second is already expired.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 and the system clock
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sign with a different HMAC algorithm.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - `algorithm` is not HS256, HS384 or HS512
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, JwtError> {
        if !HMAC_ALGORITHMS.contains(&algorithm) {
            return Err(JwtError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    /// Replace the clock used for `iat`/`exp` and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Encode claims into a signed JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a token for `user_id` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` cannot be turned into an expiry
    /// * `EncodingFailed` - Signing failed
    pub fn issue(&self, user_id: u64, ttl: Duration) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, self.clock.now(), ttl)?;
        self.encode(&claims)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature mismatch or a non-HMAC header algorithm
    /// * `MalformedToken` - Not a compact JWS, bad encoding, or claims of the wrong shape
    /// * `Expired` - `exp` is not strictly in the future
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        // Expiry is checked below against our own clock, with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(classify)?
            .claims;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> JwtError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::MalformedToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn handler_at(timestamp: i64) -> (JwtHandler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(timestamp, 0).unwrap(),
        ));
        let handler = JwtHandler::new(SECRET).with_clock(clock.clone());
        (handler, clock)
    }

    fn tamper_signature(token: &str) -> String {
        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", message, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_and_verify() {
        let (handler, _) = handler_at(1_700_000_000);

        let token = handler.issue(42, Duration::hours(1)).expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp, 1_700_000_000 + 3_600);
    }

    #[test]
    fn test_verify_expired_with_simulated_clock() {
        let (handler, clock) = handler_at(1_700_000_000);

        let token = handler.issue(7, Duration::seconds(1)).unwrap();
        clock.advance(Duration::seconds(2));

        assert_eq!(handler.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_expires_at_exact_second() {
        let (handler, clock) = handler_at(1_700_000_000);

        let token = handler.issue(7, Duration::seconds(1)).unwrap();
        clock.advance(Duration::seconds(1));

        assert_eq!(handler.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!")
            .issue(1, Duration::hours(1))
            .unwrap();

        let result = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!").verify(&token);
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_tampered_signature() {
        let handler = JwtHandler::new(SECRET);
        let token = handler.issue(1, Duration::hours(1)).unwrap();

        assert_eq!(
            handler.verify(&tamper_signature(&token)),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_foreign_algorithms() {
        let handler = JwtHandler::new(SECRET);
        let token = handler.issue(1, Duration::hours(1)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();

        // {"alg":"RS256","typ":"JWT"}
        let rs256 = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", rest);
        assert_eq!(handler.verify(&rs256), Err(JwtError::InvalidSignature));

        // {"alg":"none","typ":"JWT"}
        let none = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}", rest);
        assert!(handler.verify(&none).is_err());
    }

    #[test]
    fn test_verify_accepts_other_hmac_algorithms() {
        let signer = JwtHandler::new(SECRET)
            .with_algorithm(Algorithm::HS512)
            .unwrap();
        let token = signer.issue(5, Duration::hours(1)).unwrap();

        let claims = JwtHandler::new(SECRET).verify(&token).unwrap();
        assert_eq!(claims.user_id, 5);
    }

    #[test]
    fn test_with_algorithm_rejects_asymmetric() {
        let result = JwtHandler::new(SECRET).with_algorithm(Algorithm::RS256);
        assert!(matches!(result, Err(JwtError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_verify_malformed() {
        let handler = JwtHandler::new(SECRET);

        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::MalformedToken(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::MalformedToken(_))));
    }

    #[derive(Serialize, Deserialize)]
    struct LooseClaims {
        user_id: serde_json::Value,
        exp: i64,
    }

    #[test]
    fn test_verify_float_user_id() {
        let (handler, clock) = handler_at(1_700_000_000);
        let exp = clock.now().timestamp() + 60;

        let integral = handler
            .encode(&LooseClaims { user_id: serde_json::json!(12.0), exp })
            .unwrap();
        assert_eq!(handler.verify(&integral).unwrap().user_id, 12);

        let fractional = handler
            .encode(&LooseClaims { user_id: serde_json::json!(12.5), exp })
            .unwrap();
        assert!(matches!(
            handler.verify(&fractional),
            Err(JwtError::MalformedToken(_))
        ));

        let negative = handler
            .encode(&LooseClaims { user_id: serde_json::json!(-3), exp })
            .unwrap();
        assert!(matches!(
            handler.verify(&negative),
            Err(JwtError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_verify_requires_exp() {
        #[derive(Serialize)]
        struct NoExpiry {
            user_id: u64,
        }

        let handler = JwtHandler::new(SECRET);
        let token = handler.encode(&NoExpiry { user_id: 1 }).unwrap();

        assert!(matches!(
            handler.verify(&token),
            Err(JwtError::MalformedToken(_))
        ));
    }
}
