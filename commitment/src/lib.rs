//! House-side commitment for provably-fair sessions.
//!
//! - [`SeedCommitment`]: draws the secret and builds the public commitment,
//!   either `SHA256(seed)` or the terminal hash of a [`HashChain`]
//! - [`HashChain`]: owns the single consumption pointer over chain links
//! - [`ContributionDeriver`]: turns the secret plus round-identifying public
//!   data into the message the oracle signs

pub mod chain;
pub mod derive;
pub mod error;
pub mod seed;

pub use chain::{chain_commitment, verify_link, HashChain, MIN_CHAIN_LENGTH};
pub use derive::{chain_message, keyed_contribution, ContributionDeriver, DerivationStrategy};
pub use error::CommitmentError;
pub use seed::SeedCommitment;

/// Source of the house's secret randomness.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` with fresh secret bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), CommitmentError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// Operating-system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CommitmentError> {
        getrandom::getrandom(dest).map_err(|e| CommitmentError::Entropy(e.to_string()))
    }

    fn name(&self) -> &str {
        "os"
    }
}
