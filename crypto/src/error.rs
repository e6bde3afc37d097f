use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signature does not verify against message and public key")]
    SignatureInvalid,

    #[error("key generation failed: {0}")]
    KeyGen(String),
}
