//! Fundamental types for the vx provably-fair protocol.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! seeds, commitments, contributions, oracle keys and signatures, round keys,
//! the closed set of game contexts, and the audit/reveal records a third party
//! needs to replay a settled session.

pub mod amount;
pub mod audit;
pub mod context;
pub mod error;
pub mod hash;
pub mod keys;
pub mod round;
pub mod serde_hex;

pub use amount::{Amount, Currency, Multiplier};
pub use audit::{AuditRecord, CommitMode, Registration, RevealPackage};
pub use context::{
    Bet, CoinSide, CommitmentContext, Crash, CrashDice, FairCoinToss, GameFamily, HiLo,
    HiLoChoice, HiLoMove, HiLoStart, MessageContext, Mines, MinesStart, MultiRoulette,
    RevealContext, RouletteOutcome, Tower, TowerStart,
};
pub use error::ContextError;
pub use hash::{Commitment, Contribution};
pub use keys::{PublicKey, Seed, Signature};
pub use round::RoundKey;
