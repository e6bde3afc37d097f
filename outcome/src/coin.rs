//! Coin toss and card draw: small-modulus reductions of the raw signature.

use vx_crypto::VerifiedSignature;
use vx_types::CoinSide;

use crate::bigint::be_mod;
use crate::{check_len, OutcomeError};

/// Number of card ranks, ace (1) through king (13).
pub const CARD_RANKS: u64 = 13;

/// Signature read big-endian, mod 2.
pub fn decode_coin_toss(signature: &VerifiedSignature) -> Result<CoinSide, OutcomeError> {
    coin_from_bytes(signature.as_bytes())
}

/// Signature read big-endian, mod 13, mapped to rank 1..=13.
pub fn decode_card(signature: &VerifiedSignature) -> Result<u8, OutcomeError> {
    card_from_bytes(signature.as_bytes())
}

pub(crate) fn coin_from_bytes(bytes: &[u8]) -> Result<CoinSide, OutcomeError> {
    check_len(bytes)?;
    Ok(CoinSide::from_bit(be_mod(bytes, 2) as u8))
}

pub(crate) fn card_from_bytes(bytes: &[u8]) -> Result<u8, OutcomeError> {
    check_len(bytes)?;
    Ok(be_mod(bytes, CARD_RANKS) as u8 + 1)
}
