//! Outcome decoders for the vx provably-fair protocol.
//!
//! Every decoder is a pure function of signature bytes (plus, for multi-move
//! games, the state left by earlier moves of the same game). Public entry
//! points only accept a [`VerifiedSignature`], so an outcome cannot be
//! computed from a signature that has not been checked against the oracle's
//! key.
//!
//! | Game | Rule |
//! |---|---|
//! | coin toss | signature mod 2 |
//! | hi-lo | signature mod 13, plus one |
//! | crash dice | 52-bit fraction of `SHA256(sig)`, inverted, with house edge |
//! | chain crash | same fraction of `HMAC(sig, next link)` |
//! | mines / tower | mixed-radix sampling without replacement |
//! | multi-roulette | first cumulative probability above the fraction |

mod bigint;
pub mod coin;
pub mod crash;
pub mod engine;
pub mod error;
pub mod hilo;
pub mod mines;
pub mod roulette;
pub mod sampling;
pub mod tower;

pub use coin::{decode_card, decode_coin_toss, CARD_RANKS};
pub use crash::{
    ceiling_multiplier, decode_chain_crash, decode_crash_dice, multiplier_from_digest, roll_dice,
    DiceRoll, BPS_SCALE,
};
pub use engine::{Outcome, OutcomeEngine};
pub use error::OutcomeError;
pub use hilo::{guess_wins, HiLoHand, HiLoStep};
pub use mines::{MinesBoard, MinesStep};
pub use roulette::{decode_roulette, select_weighted, validate_probabilities};
pub use sampling::sample_without_replacement;
pub use tower::{TowerClimb, TowerStep};

use serde::Serialize;
pub use vx_crypto::VerifiedSignature;

/// Fewest signature bytes any decoder accepts.
pub const MIN_SIGNATURE_LEN: usize = 32;

/// Lifecycle of a multi-move game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Busted,
    CashedOut,
}

pub(crate) fn check_len(bytes: &[u8]) -> Result<(), OutcomeError> {
    if bytes.len() < MIN_SIGNATURE_LEN {
        return Err(OutcomeError::SignatureTooShort {
            len: bytes.len(),
            min: MIN_SIGNATURE_LEN,
        });
    }
    Ok(())
}
