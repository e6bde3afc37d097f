//! Cryptographic primitives for the vx protocol.
//!
//! - **SHA-256** for commitments, hash chains and outcome digests
//! - **HMAC-SHA256** for keyed per-round contribution derivation
//! - **BLS12-381** (min-pk, G2 signatures) for oracle signatures; verification
//!   is the only way to obtain a [`VerifiedSignature`], which is what the
//!   outcome decoders accept

pub mod bls;
pub mod error;
pub mod hash;

pub use bls::{
    validate_public_key, verify, verify_signature, BlsKeypair, VerifiedSignature, DST,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
pub use error::VerifyError;
pub use hash::{hmac_sha256, leading_bits, sha256, sha256_multi, uniform_fraction, FRACTION_BITS};
