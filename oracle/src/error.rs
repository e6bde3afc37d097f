use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Transport or backend failure. Safe to resubmit the same request.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle call timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The oracle answered, but with something unusable.
    #[error("oracle protocol error: {0}")]
    Protocol(String),
}

impl OracleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Unavailable(_) | OracleError::Timeout { .. })
    }
}
