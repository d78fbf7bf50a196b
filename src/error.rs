//! Crate-wide error types.

use thiserror::Error;

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("truncated input at byte {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("index {index} out of range for log of {len} events")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("serialization error: expected {expected} bytes, produced {actual}")]
    Serialization { expected: usize, actual: usize },

    #[error("unknown coordinate mode byte {0}")]
    UnknownMode(u8),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ReplayError {
    /// True for failures caused by the byte stream itself rather than the
    /// environment around it.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. } | Self::UnknownMode(_))
    }
}
