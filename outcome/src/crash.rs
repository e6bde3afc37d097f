//! Crash multipliers from a 52-bit uniform fraction.
//!
//! With `X = r / 2^52`, the multiplier is `(1 - edge) / X` floored to
//! hundredths. It is computed in integers so replays agree bit for bit:
//! `floor(100 * (10000 - bps) * 2^52 / (10000 * r))`.

use vx_crypto::{hmac_sha256, leading_bits, sha256, VerifiedSignature, FRACTION_BITS};
use vx_types::{CrashDice, Multiplier};

use crate::{check_len, OutcomeError};

/// Basis points in 100%.
pub const BPS_SCALE: u16 = 10_000;

/// Result of a single-player crash-dice round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiceRoll {
    pub multiplier: Multiplier,
    pub won: bool,
}

/// Multiplier for the round, `SHA256(signature)` as the fraction source.
pub fn decode_crash_dice(
    signature: &VerifiedSignature,
    house_edge_bps: u16,
) -> Result<Multiplier, OutcomeError> {
    dice_from_bytes(signature.as_bytes(), house_edge_bps)
}

/// Decode a crash-dice wager: the player wins when `target <= multiplier`.
pub fn roll_dice(signature: &VerifiedSignature, wager: &CrashDice) -> Result<DiceRoll, OutcomeError> {
    let multiplier = decode_crash_dice(signature, wager.house_edge_bps)?;
    Ok(DiceRoll {
        multiplier,
        won: wager.target <= multiplier,
    })
}

/// Chain crash: the round's multiplier is keyed by its own signature over
/// the *next* link, which stays secret until the round is played.
pub fn decode_chain_crash(
    signature: &VerifiedSignature,
    next_link: &[u8; 32],
    house_edge_bps: u16,
) -> Result<Multiplier, OutcomeError> {
    chain_crash_from_bytes(signature.as_bytes(), next_link, house_edge_bps)
}

/// Multiplier for a 32-byte digest. `r = 0` gives [`ceiling_multiplier`].
pub fn multiplier_from_digest(
    digest: &[u8; 32],
    house_edge_bps: u16,
) -> Result<Multiplier, OutcomeError> {
    check_edge(house_edge_bps)?;
    Ok(multiplier_from_bits(leading_bits(digest), house_edge_bps))
}

/// The largest multiplier a round can produce: the value for `r = 1`.
pub fn ceiling_multiplier(house_edge_bps: u16) -> Result<Multiplier, OutcomeError> {
    check_edge(house_edge_bps)?;
    Ok(multiplier_from_bits(1, house_edge_bps))
}

pub(crate) fn dice_from_bytes(bytes: &[u8], house_edge_bps: u16) -> Result<Multiplier, OutcomeError> {
    check_len(bytes)?;
    multiplier_from_digest(&sha256(bytes), house_edge_bps)
}

pub(crate) fn chain_crash_from_bytes(
    bytes: &[u8],
    next_link: &[u8; 32],
    house_edge_bps: u16,
) -> Result<Multiplier, OutcomeError> {
    check_len(bytes)?;
    multiplier_from_digest(&hmac_sha256(bytes, next_link), house_edge_bps)
}

fn check_edge(house_edge_bps: u16) -> Result<(), OutcomeError> {
    if house_edge_bps >= BPS_SCALE {
        return Err(OutcomeError::InvalidHouseEdge(house_edge_bps));
    }
    Ok(())
}

fn multiplier_from_bits(r: u64, house_edge_bps: u16) -> Multiplier {
    let r = u128::from(r.max(1));
    let scale = u128::from(BPS_SCALE);
    let numerator = 100 * (scale - u128::from(house_edge_bps)) << FRACTION_BITS;
    let hundredths = (numerator / (scale * r)) as u64;
    Multiplier::from_hundredths(hundredths.max(Multiplier::ONE.hundredths()))
}
