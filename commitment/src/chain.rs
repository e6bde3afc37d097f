//! SHA-256 hash chain with a single consumption pointer.
//!
//! Built from one random `s0`: `link_j = SHA256^j(s0)` for `j = 1..=N`.
//! The terminal hash `link_N` is the public commitment and is never handed
//! out as a round input. Rounds consume links from the commitment side toward
//! `s0`: round `k` gets `link_{N-k}`, so `SHA256(round k link)` equals the
//! round `k-1` link (round 0 being the commitment). Someone who has seen the
//! links of rounds `1..=k` cannot compute round `k+1`'s link without
//! inverting SHA-256. `s0` itself is never a round input; it is the reveal.

use vx_crypto::sha256;
use vx_types::{Commitment, Seed};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CommitmentError;

/// Minimum chain length: the commitment plus one usable link.
pub const MIN_CHAIN_LENGTH: u32 = 2;

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HashChain {
    seed: Seed,
    /// `links[j - 1] = SHA256^j(seed)`; the last element is the commitment.
    links: Vec<[u8; 32]>,
    /// Number of links already handed out.
    consumed: u32,
}

impl HashChain {
    /// Build a chain of `length` hashes from `seed`.
    pub fn build(seed: Seed, length: u32) -> Result<Self, CommitmentError> {
        if length < MIN_CHAIN_LENGTH {
            return Err(CommitmentError::InvalidChainLength(length));
        }
        let mut links = Vec::with_capacity(length as usize);
        let mut iterator = sha256(seed.expose());
        links.push(iterator);
        for _ in 1..length {
            iterator = sha256(&iterator);
            links.push(iterator);
        }
        Ok(Self {
            seed,
            links,
            consumed: 0,
        })
    }

    pub fn length(&self) -> u32 {
        self.links.len() as u32
    }

    /// The terminal hash, published before any wager.
    pub fn commitment(&self) -> Commitment {
        Commitment::new(self.links[self.links.len() - 1])
    }

    /// `length - 1`: the commitment occupies one slot.
    pub fn usable_rounds(&self) -> u32 {
        self.length() - 1
    }

    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    pub fn remaining(&self) -> u32 {
        self.usable_rounds() - self.consumed
    }

    /// The round the next call to [`next_link`](Self::next_link) serves (1-based).
    pub fn next_round(&self) -> u64 {
        u64::from(self.consumed) + 1
    }

    /// Hand out the next unconsumed link. Each link is returned exactly once.
    pub fn next_link(&mut self) -> Result<(u64, [u8; 32]), CommitmentError> {
        let round = self.next_round();
        let link = self
            .link_for_round(round)
            .ok_or(CommitmentError::ChainExhausted {
                used: self.consumed,
            })?;
        self.consumed += 1;
        Ok((round, link))
    }

    /// The link round `round` consumes, if the chain has such a round.
    pub fn link_for_round(&self, round: u64) -> Option<[u8; 32]> {
        let n = u64::from(self.length());
        if round == 0 || round >= n {
            return None;
        }
        // round k -> link_{N-k} -> links[N-k-1]
        Some(self.links[(n - round - 1) as usize])
    }

    /// The preimage of round `round`'s link: the next round's link, or the
    /// raw seed after the last usable round.
    pub fn successor_for_round(&self, round: u64) -> Option<[u8; 32]> {
        let n = u64::from(self.length());
        if round == 0 || round >= n {
            return None;
        }
        if round == n - 1 {
            Some(*self.seed.expose())
        } else {
            self.link_for_round(round + 1)
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }
}

/// Recompute the commitment of a chain of `length` from its raw seed.
pub fn chain_commitment(seed: &[u8; 32], length: u32) -> Result<Commitment, CommitmentError> {
    if length < MIN_CHAIN_LENGTH {
        return Err(CommitmentError::InvalidChainLength(length));
    }
    let mut iterator = *seed;
    for _ in 0..length {
        iterator = sha256(&iterator);
    }
    Ok(Commitment::new(iterator))
}

/// `SHA256(link) == previous`: `link` is the one-way predecessor of `previous`.
pub fn verify_link(link: &[u8; 32], previous: &[u8; 32]) -> bool {
    sha256(link) == *previous
}
