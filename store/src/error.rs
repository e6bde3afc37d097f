use thiserror::Error;
use vx_types::Commitment;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("commitment {0} already revealed")]
    AlreadyRevealed(Commitment),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("audit log is corrupted at line {line}: {reason}")]
    Corruption { line: usize, reason: String },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
