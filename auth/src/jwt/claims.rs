use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::de::Error as _;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::errors::JwtError;

/// Largest integer a JSON number decoded as `f64` can carry without loss.
const MAX_EXACT_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Bearer token claims.
///
/// The schema is explicit: `user_id` and `exp` are integers. Tokens minted by
/// other encoders sometimes carry the id as a JSON float, so `user_id` goes
/// through a validating deserializer instead of trusting the numeric type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Identity the token was issued for
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: u64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Issued at (Unix timestamp, seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create claims for `user_id` expiring `ttl` after `now`.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is not positive or the expiry overflows
    pub fn for_user(user_id: u64, now: DateTime<Utc>, ttl: Duration) -> Result<Self, JwtError> {
        if ttl <= Duration::zero() {
            return Err(JwtError::InvalidTtl(format!(
                "lifetime must be positive, got {}s",
                ttl.num_seconds()
            )));
        }

        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::InvalidTtl("expiry overflows".to_string()))?;

        Ok(Self {
            user_id,
            exp: expiration.timestamp(),
            iat: Some(now.timestamp()),
        })
    }

    /// A token is expired once `exp` is no longer strictly in the future.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;

    if let Some(id) = number.as_u64() {
        return Ok(id);
    }

    match number.as_f64() {
        Some(value)
            if value >= 0.0 && value.fract() == 0.0 && value <= MAX_EXACT_FLOAT_INTEGER =>
        {
            Ok(value as u64)
        }
        _ => Err(D::Error::custom(format!(
            "user_id must be a non-negative integer, got {}",
            number
        ))),
    }
}
