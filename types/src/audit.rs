//! Records a third party needs to replay a settled session.

use serde::{Deserialize, Serialize};

use crate::{
    Commitment, CommitmentContext, ContextError, Contribution, MessageContext, PublicKey,
    RevealContext, RoundKey, Signature,
};

/// How the session's commitment was constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CommitMode {
    /// One seed, `commitment = SHA256(seed)`.
    Single,
    /// A SHA-256 chain of `length` hashes; `length - 1` usable rounds.
    Chain { length: u32 },
}

impl CommitMode {
    pub fn commitment_context(&self) -> CommitmentContext {
        match self {
            CommitMode::Single => CommitmentContext::Sha256Commitment {},
            CommitMode::Chain { .. } => CommitmentContext::Sha256Chain {},
        }
    }
}

/// Minimum per-round audit tuple: `{commitment, message, round, context, signature}`.
///
/// Written durably before the next round's wager is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub commitment: Commitment,
    pub message: Contribution,
    #[serde(flatten)]
    pub round: RoundKey,
    #[serde(with = "crate::serde_hex::vec")]
    pub context: Vec<u8>,
    pub signature: Signature,
}

impl AuditRecord {
    /// Decode the opaque context bytes back into the game context.
    pub fn message_context(&self) -> Result<MessageContext, ContextError> {
        MessageContext::decode(&self.context)
    }
}

/// The oracle key a commitment was registered under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub commitment: Commitment,
    pub mode: CommitMode,
    pub public_key: PublicKey,
}

/// The secret and its context, published exactly once per commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPackage {
    pub commitment: Commitment,
    pub mode: CommitMode,
    #[serde(with = "crate::serde_hex::array32")]
    pub secret: [u8; 32],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RevealContext>,
}
