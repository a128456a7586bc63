use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures (`MalformedToken`, `InvalidSignature`, `Expired`) are
/// distinct here so they can be logged, but callers must surface all three to
/// clients as the same opaque "unauthorized" outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime cannot be resolved: {0}")]
    InvalidTtl(String),

    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Token signature or algorithm is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Error type for token lifetime parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TtlError {
    #[error("Token lifetime is empty")]
    Empty,

    #[error("Invalid number in token lifetime: {0}")]
    InvalidNumber(String),

    #[error("Unknown time unit in token lifetime: {0}")]
    UnknownUnit(String),

    #[error("Token lifetime must be positive")]
    NotPositive,
}
