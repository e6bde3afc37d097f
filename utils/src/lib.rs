//! Shared utilities for vx.

pub mod hex32;
pub mod logging;

pub use hex32::{parse_hex32, HexError};
pub use logging::{init_logging, init_tracing, LogFormat};
