use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one oracle request within a session: the round (nonce / game id)
/// and, for multi-move games, the move index inside that round.
///
/// Together with the commitment this is the idempotency key for oracle
/// resubmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundKey {
    pub round: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<u32>,
}

impl RoundKey {
    pub fn new(round: u64) -> Self {
        Self { round, sub: None }
    }

    pub fn with_move(round: u64, sub: u32) -> Self {
        Self {
            round,
            sub: Some(sub),
        }
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub {
            Some(sub) => write!(f, "{}:{}", self.round, sub),
            None => write!(f, "{}", self.round),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_derivation_suffix() {
        assert_eq!(RoundKey::new(7).to_string(), "7");
        assert_eq!(RoundKey::with_move(7, 2).to_string(), "7:2");
    }

    #[test]
    fn ordering_is_round_then_move() {
        assert!(RoundKey::new(1) < RoundKey::with_move(1, 0));
        assert!(RoundKey::with_move(1, 9) < RoundKey::new(2));
    }
}
