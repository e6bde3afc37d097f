//! Per-round contribution derivation.
//!
//! Two interchangeable strategies, fixed when the session is configured:
//!
//! - **Keyed**: `HMAC-SHA256(key = seed, "{client_seed}:{round}[:{move}]")`.
//!   The seed is the HMAC key rather than a hash prefix, so there is no
//!   length extension and rounds stay independent for any client seed.
//! - **Chain link**: the next unconsumed chain link, optionally followed by
//!   the client seed bytes. Links are one-way and single-use.
//!
//! Both are deterministic in `(secret, client_seed, round, move)`, which is
//! what lets a verifier rebuild every message after the reveal.

use serde::{Deserialize, Serialize};
use vx_crypto::hmac_sha256;
use vx_types::{Contribution, RoundKey};

use crate::{CommitmentError, SeedCommitment};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStrategy {
    Keyed,
    ChainLink,
}

impl DerivationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivationStrategy::Keyed => "keyed",
            DerivationStrategy::ChainLink => "chain_link",
        }
    }
}

/// Keyed contribution for one round (and optional move).
pub fn keyed_contribution(seed: &[u8; 32], client_seed: &str, key: RoundKey) -> Contribution {
    let label = match key.sub {
        Some(sub) => format!("{client_seed}:{}:{sub}", key.round),
        None => format!("{client_seed}:{}", key.round),
    };
    Contribution::new(hmac_sha256(seed, label.as_bytes()).to_vec())
}

/// Message signed for a chain-link round: the link, then the client seed if any.
pub fn chain_message(link: &[u8; 32], client_seed: &str) -> Contribution {
    let mut message = Vec::with_capacity(32 + client_seed.len());
    message.extend_from_slice(link);
    message.extend_from_slice(client_seed.as_bytes());
    Contribution::new(message)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionDeriver {
    strategy: DerivationStrategy,
    client_seed: String,
}

impl ContributionDeriver {
    pub fn new(strategy: DerivationStrategy, client_seed: impl Into<String>) -> Self {
        Self {
            strategy,
            client_seed: client_seed.into(),
        }
    }

    pub fn keyed(client_seed: impl Into<String>) -> Self {
        Self::new(DerivationStrategy::Keyed, client_seed)
    }

    pub fn chain_link(client_seed: impl Into<String>) -> Self {
        Self::new(DerivationStrategy::ChainLink, client_seed)
    }

    pub fn strategy(&self) -> DerivationStrategy {
        self.strategy
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    /// Check the strategy fits the commitment before any round is played.
    pub fn check_compatible(&self, secret: &SeedCommitment) -> Result<(), CommitmentError> {
        match (self.strategy, secret.chain().is_some()) {
            (DerivationStrategy::Keyed, false) | (DerivationStrategy::ChainLink, true) => Ok(()),
            (DerivationStrategy::Keyed, true) => Err(CommitmentError::StrategyMismatch {
                strategy: "keyed",
                mode: "chain",
            }),
            (DerivationStrategy::ChainLink, false) => Err(CommitmentError::StrategyMismatch {
                strategy: "chain_link",
                mode: "single",
            }),
        }
    }

    /// Derive the contribution for `key`.
    ///
    /// Chain-link derivation consumes a link, so it must be called exactly
    /// once per round, in round order.
    pub fn derive(
        &self,
        secret: &mut SeedCommitment,
        key: RoundKey,
    ) -> Result<Contribution, CommitmentError> {
        self.check_compatible(secret)?;
        match self.strategy {
            DerivationStrategy::Keyed => Ok(keyed_contribution(
                secret.seed().expose(),
                &self.client_seed,
                key,
            )),
            DerivationStrategy::ChainLink => {
                if key.sub.is_some() {
                    return Err(CommitmentError::MoveNotSupported);
                }
                let chain = secret
                    .chain_mut()
                    .ok_or(CommitmentError::StrategyMismatch {
                        strategy: "chain_link",
                        mode: "single",
                    })?;
                let expected = chain.next_round();
                if key.round != expected {
                    return Err(CommitmentError::RoundOutOfOrder {
                        expected,
                        got: key.round,
                    });
                }
                let (_, link) = chain.next_link()?;
                Ok(chain_message(&link, &self.client_seed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vx_crypto::sha256;
    use vx_types::{CommitMode, Seed};

    fn single() -> SeedCommitment {
        SeedCommitment::from_seed(CommitMode::Single, Seed::new([5u8; 32])).unwrap()
    }

    fn chained(length: u32) -> SeedCommitment {
        SeedCommitment::from_seed(CommitMode::Chain { length }, Seed::new([5u8; 32])).unwrap()
    }

    #[test]
    fn keyed_uses_documented_label() {
        let mut secret = single();
        let deriver = ContributionDeriver::keyed("chicken");
        let c = deriver.derive(&mut secret, RoundKey::new(3)).unwrap();
        assert_eq!(c.as_bytes(), hmac_sha256(&[5u8; 32], b"chicken:3"));

        let m = deriver.derive(&mut secret, RoundKey::with_move(3, 2)).unwrap();
        assert_eq!(m.as_bytes(), hmac_sha256(&[5u8; 32], b"chicken:3:2"));
    }

    #[test]
    fn keyed_is_deterministic_and_round_separated() {
        let mut secret = single();
        let deriver = ContributionDeriver::keyed("p");
        let a = deriver.derive(&mut secret, RoundKey::new(0)).unwrap();
        let b = deriver.derive(&mut secret, RoundKey::new(0)).unwrap();
        let c = deriver.derive(&mut secret, RoundKey::new(1)).unwrap();
        let d = deriver.derive(&mut secret, RoundKey::with_move(0, 0)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn chain_link_consumes_in_order() {
        let mut secret = chained(3);
        let commitment = *secret.commitment().as_bytes();
        let deriver = ContributionDeriver::chain_link("");

        let first = deriver.derive(&mut secret, RoundKey::new(1)).unwrap();
        let first: [u8; 32] = first.as_bytes().try_into().unwrap();
        assert_eq!(sha256(&first), commitment);

        let second = deriver.derive(&mut secret, RoundKey::new(2)).unwrap();
        let second: [u8; 32] = second.as_bytes().try_into().unwrap();
        assert_eq!(sha256(&second), first);

        assert_eq!(
            deriver.derive(&mut secret, RoundKey::new(3)),
            Err(CommitmentError::ChainExhausted { used: 2 })
        );
    }

    #[test]
    fn chain_link_appends_client_seed() {
        let mut secret = chained(5);
        let link = secret.chain().unwrap().link_for_round(1).unwrap();
        let c = ContributionDeriver::chain_link("chicken")
            .derive(&mut secret, RoundKey::new(1))
            .unwrap();
        assert_eq!(&c.as_bytes()[..32], &link);
        assert_eq!(&c.as_bytes()[32..], b"chicken");
    }

    #[test]
    fn chain_link_rejects_out_of_order_and_moves() {
        let mut secret = chained(5);
        let deriver = ContributionDeriver::chain_link("");
        assert_eq!(
            deriver.derive(&mut secret, RoundKey::new(2)),
            Err(CommitmentError::RoundOutOfOrder {
                expected: 1,
                got: 2
            })
        );
        assert_eq!(
            deriver.derive(&mut secret, RoundKey::with_move(1, 0)),
            Err(CommitmentError::MoveNotSupported)
        );
        // nothing was consumed by the rejected calls
        assert_eq!(secret.chain().unwrap().consumed(), 0);
    }

    #[test]
    fn strategy_must_match_mode() {
        assert!(ContributionDeriver::keyed("x")
            .derive(&mut chained(3), RoundKey::new(1))
            .is_err());
        assert!(ContributionDeriver::chain_link("x")
            .derive(&mut single(), RoundKey::new(1))
            .is_err());
    }
}
