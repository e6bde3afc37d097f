//! Durable storage for audit records and reveals.
//!
//! A round's `(commitment, message, round, context, signature)` tuple must be
//! written before the next round is accepted, and a commitment is revealed at
//! most once. Backends implement [`AuditStore`]; the session depends only on
//! the trait and receives the store explicitly.

pub mod error;
pub mod jsonl;

pub use error::StoreError;
pub use jsonl::{read_entries, JsonlAuditStore, LogEntry};

use vx_types::{AuditRecord, Commitment, PublicKey, Registration, RevealPackage};

pub trait AuditStore: Send + Sync {
    /// Remember the oracle key a commitment was registered under.
    fn record_registration(&self, registration: &Registration) -> Result<(), StoreError>;

    fn registration(&self, commitment: &Commitment) -> Result<Option<Registration>, StoreError>;

    /// Append one round. A second record for the same round key is a
    /// [`StoreError::Duplicate`].
    fn record_round(&self, record: &AuditRecord) -> Result<(), StoreError>;

    /// All recorded rounds of `commitment`, in the order they were written.
    fn rounds(&self, commitment: &Commitment) -> Result<Vec<AuditRecord>, StoreError>;

    /// Store the reveal. Fails with [`StoreError::AlreadyRevealed`] if one exists.
    fn record_reveal(&self, reveal: &RevealPackage) -> Result<(), StoreError>;

    fn reveal(&self, commitment: &Commitment) -> Result<Option<RevealPackage>, StoreError>;

    /// Every commitment seen in the log, in first-seen order.
    fn commitments(&self) -> Result<Vec<Commitment>, StoreError>;

    /// Public key of `commitment`, if its registration was recorded.
    fn public_key(&self, commitment: &Commitment) -> Result<Option<PublicKey>, StoreError> {
        Ok(self.registration(commitment)?.map(|r| r.public_key))
    }
}
