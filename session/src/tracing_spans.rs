//! [`tracing::Span`] constructors shared by the session pipeline.

use tracing::{info_span, Span};
use vx_types::{Commitment, RoundKey};

/// One round, from derivation to recorded outcome.
pub fn round_span(commitment: &Commitment, key: RoundKey) -> Span {
    info_span!(
        "round",
        commitment = %commitment.short(),
        round = key.round,
        sub = key.sub.map(i64::from).unwrap_or(-1)
    )
}

pub fn register_span(commitment: &Commitment) -> Span {
    info_span!("register", commitment = %commitment.short())
}

pub fn reveal_span(commitment: &Commitment) -> Span {
    info_span!("reveal", commitment = %commitment.short())
}

pub fn replay_span(commitment: &Commitment, rounds: usize) -> Span {
    info_span!("replay", commitment = %commitment.short(), rounds)
}
