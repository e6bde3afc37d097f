//! Parsing of 32-byte hex values given on the command line or in config.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Invalid(String),

    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

/// Parse 64 hex digits, with or without a `0x` prefix.
pub fn parse_hex32(s: &str) -> Result<[u8; 32], HexError> {
    let bytes =
        hex::decode(s.trim().trim_start_matches("0x")).map_err(|e| HexError::Invalid(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| HexError::Length(bytes.len()))
}
