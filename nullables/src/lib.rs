//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of a session (oracle, audit store, entropy)
//! sits behind a trait. The implementations here:
//! - Return deterministic values
//! - Can be steered programmatically (faults, tampering, delays)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod entropy;
pub mod oracle;
pub mod store;

pub use entropy::NullEntropy;
pub use oracle::{Fault, NullOracle};
pub use store::NullAuditStore;
