use thiserror::Error;

/// Failure to encode or decode one of the context records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("context encode failed: {0}")]
    Encode(String),

    #[error("context decode failed: {0}")]
    Decode(String),
}
