//! Secret generation and the public commitment.

use vx_crypto::sha256;
use vx_types::{CommitMode, Commitment, CommitmentContext, Seed};

use crate::{CommitmentError, EntropySource, HashChain};

enum SecretMaterial {
    Single(Seed),
    Chain(HashChain),
}

/// The house secret for one session together with its public commitment.
///
/// Created at session start and never mutated, apart from the chain's
/// consumption pointer.
pub struct SeedCommitment {
    commitment: Commitment,
    material: SecretMaterial,
}

impl SeedCommitment {
    /// `generate(mode)`: draw 32 fresh bytes and build the commitment.
    pub fn generate(mode: CommitMode, entropy: &dyn EntropySource) -> Result<Self, CommitmentError> {
        let mut bytes = [0u8; 32];
        entropy.fill(&mut bytes)?;
        let seed = Seed::new(bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        let commitment = Self::from_seed(mode, seed)?;
        tracing::debug!(
            source = entropy.name(),
            commitment = %commitment.commitment.short(),
            "generated house seed"
        );
        Ok(commitment)
    }

    /// Build the commitment from an existing seed (tests, replay).
    pub fn from_seed(mode: CommitMode, seed: Seed) -> Result<Self, CommitmentError> {
        match mode {
            CommitMode::Single => Ok(Self {
                commitment: Commitment::new(sha256(seed.expose())),
                material: SecretMaterial::Single(seed),
            }),
            CommitMode::Chain { length } => {
                let chain = HashChain::build(seed, length)?;
                Ok(Self {
                    commitment: chain.commitment(),
                    material: SecretMaterial::Chain(chain),
                })
            }
        }
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn mode(&self) -> CommitMode {
        match &self.material {
            SecretMaterial::Single(_) => CommitMode::Single,
            SecretMaterial::Chain(chain) => CommitMode::Chain {
                length: chain.length(),
            },
        }
    }

    pub fn commitment_context(&self) -> CommitmentContext {
        self.mode().commitment_context()
    }

    /// The raw secret: the single seed, or `s0` of the chain.
    pub fn seed(&self) -> &Seed {
        match &self.material {
            SecretMaterial::Single(seed) => seed,
            SecretMaterial::Chain(chain) => chain.seed(),
        }
    }

    pub fn chain(&self) -> Option<&HashChain> {
        match &self.material {
            SecretMaterial::Single(_) => None,
            SecretMaterial::Chain(chain) => Some(chain),
        }
    }

    pub fn chain_mut(&mut self) -> Option<&mut HashChain> {
        match &mut self.material {
            SecretMaterial::Single(_) => None,
            SecretMaterial::Chain(chain) => Some(chain),
        }
    }

    /// Rounds still playable; `None` means unbounded (single-seed sessions).
    pub fn remaining_rounds(&self) -> Option<u32> {
        self.chain().map(HashChain::remaining)
    }
}
