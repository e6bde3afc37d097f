//! The signing oracle, seen from the house.
//!
//! The oracle is an external service holding a BLS key per commitment. It is
//! modelled as the [`OracleClient`] capability `{commit, sign, reveal}` so that
//! the session pipeline can run against the HTTP service, the in-process
//! [`LocalOracle`], or a test double without changing.
//!
//! Nothing returned by an oracle is trusted: the session verifies every
//! signature itself before decoding an outcome.

pub mod error;
pub mod http;
pub mod local;
pub mod retry;

pub use error::OracleError;
pub use http::HttpOracle;
pub use local::LocalOracle;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vx_types::{AuditRecord, Commitment, Contribution, PublicKey, RoundKey, Signature};

/// One `make_message` call. Built once per round and resubmitted unchanged
/// on retry, so the oracle can deduplicate on `(commitment, round)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub commitment: Commitment,
    pub message: Contribution,
    #[serde(flatten)]
    pub round: RoundKey,
    #[serde(with = "vx_types::serde_hex::vec")]
    pub context: Vec<u8>,
}

impl SignRequest {
    /// The audit tuple for this request once the oracle has signed it.
    pub fn into_record(self, signature: Signature) -> AuditRecord {
        AuditRecord {
            commitment: self.commitment,
            message: self.message,
            round: self.round,
            context: self.context,
            signature,
        }
    }
}

#[async_trait]
pub trait OracleClient: Send + Sync {
    /// `make_commitment`: register the commitment, get the public key for it.
    async fn commit(&self, commitment: &Commitment, context: &[u8])
        -> Result<PublicKey, OracleError>;

    /// `make_message`: sign one round's message.
    async fn sign(&self, request: &SignRequest) -> Result<Signature, OracleError>;

    /// `make_reveal`: publish the secret behind `commitment`.
    async fn reveal(
        &self,
        commitment: &Commitment,
        secret: &[u8; 32],
        context: Option<&[u8]>,
    ) -> Result<(), OracleError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
