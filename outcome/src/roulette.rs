//! Weighted selection over declared, ordered outcomes.

use vx_crypto::{sha256, uniform_fraction, VerifiedSignature};
use vx_types::MultiRoulette;

use crate::{check_len, OutcomeError};

/// Allowed distance between the probability sum and 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Index of the winning outcome, with `X` from `SHA256(signature)`.
pub fn decode_roulette(
    signature: &VerifiedSignature,
    wheel: &MultiRoulette,
) -> Result<usize, OutcomeError> {
    roulette_from_bytes(signature.as_bytes(), &wheel.probabilities())
}

pub(crate) fn roulette_from_bytes(bytes: &[u8], probabilities: &[f64]) -> Result<usize, OutcomeError> {
    check_len(bytes)?;
    select_weighted(uniform_fraction(&sha256(bytes)), probabilities)
}

/// First `k` with `x < p_0 + ... + p_k`.
///
/// When float rounding leaves `x` above the final cumulative sum, the last
/// outcome with non-zero probability is chosen.
pub fn select_weighted(x: f64, probabilities: &[f64]) -> Result<usize, OutcomeError> {
    validate_probabilities(probabilities)?;
    let mut cumulative = 0.0;
    for (k, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if x < cumulative {
            return Ok(k);
        }
    }
    probabilities
        .iter()
        .rposition(|p| *p > 0.0)
        .ok_or_else(|| OutcomeError::InvalidProbabilities("all probabilities are zero".into()))
}

pub fn validate_probabilities(probabilities: &[f64]) -> Result<(), OutcomeError> {
    if probabilities.is_empty() {
        return Err(OutcomeError::InvalidProbabilities("no outcomes".into()));
    }
    if let Some((i, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(OutcomeError::InvalidProbabilities(format!(
            "outcome {i} has probability {p}"
        )));
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(OutcomeError::InvalidProbabilities(format!(
            "probabilities sum to {sum}"
        )));
    }
    Ok(())
}
