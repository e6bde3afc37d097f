//! Commitment and per-round contribution values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A published 32-byte commitment: `SHA256(seed)` or the terminal hash of a chain.
///
/// Immutable once published; it identifies the session everywhere (oracle
/// key derivation, audit records, reveal slot).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "crate::serde_hex::array32")] [u8; 32]);

impl Commitment {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.short())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The exact message the oracle signs for one round (or one move of a round).
///
/// For keyed derivation this is the 32-byte HMAC output; for chain-link
/// derivation it is the consumed link, optionally followed by the client seed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contribution(#[serde(with = "crate::serde_hex::vec")] Vec<u8>);

impl Contribution {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contribution({})", hex::encode(&self.0[..self.0.len().min(4)]))
    }
}

impl fmt::Display for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_display_is_full_hex() {
        let c = Commitment::new([0xab; 32]);
        assert_eq!(c.to_string(), "ab".repeat(32));
        assert_eq!(format!("{:?}", c), "Commitment(abababab)");
    }

    #[test]
    fn commitment_json_is_hex_string() {
        let c = Commitment::new([1u8; 32]);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn commitment_rejects_wrong_length() {
        let json = format!("\"{}\"", "01".repeat(31));
        assert!(serde_json::from_str::<Commitment>(&json).is_err());
    }

    #[test]
    fn contribution_debug_handles_short_values() {
        let c = Contribution::new(vec![0xff]);
        assert_eq!(format!("{:?}", c), "Contribution(ff)");
        assert_eq!(c.len(), 1);
    }
}
