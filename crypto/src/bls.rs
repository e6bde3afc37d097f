//! BLS12-381 oracle signatures (min-pk: 48-byte G1 keys, 96-byte G2 signatures).
//!
//! Verification is mandatory policy: outcome decoders only accept a
//! [`VerifiedSignature`], and the only constructor for one is
//! [`verify_signature`]. Signatures must be in canonical compressed form so
//! that the decoded outcome is a function of exactly one byte string.

use blst::min_pk::{PublicKey as BlsPublicKey, SecretKey, Signature as BlsSignature};
use blst::BLST_ERROR;
use vx_types::{PublicKey, Signature};
use zeroize::Zeroizing;

use crate::{hmac_sha256, VerifyError};

/// Domain separation tag of the vx oracle (hash-to-G2, SHA-256, SSWU).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// Compressed G1 public key length.
pub const PUBLIC_KEY_LEN: usize = 48;

/// Compressed G2 signature length.
pub const SIGNATURE_LEN: usize = 96;

/// A BLS key pair. Used by the in-process reference oracle and by tests;
/// the production oracle keeps its key material on its own side.
pub struct BlsKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl BlsKeypair {
    /// Derive a key pair from at least 32 bytes of input keying material.
    pub fn from_ikm(ikm: &[u8]) -> Result<Self, VerifyError> {
        let secret = SecretKey::key_gen(ikm, &[])
            .map_err(|e| VerifyError::KeyGen(format!("{e:?}")))?;
        let public = PublicKey::new(secret.sk_to_pk().compress().to_vec());
        Ok(Self { secret, public })
    }

    /// Key pair for `label` under `master`: `key_gen(HMAC-SHA256(master, label))`.
    /// The intermediate key material is wiped before returning.
    pub fn derive(master: &[u8], label: &[u8]) -> Result<Self, VerifyError> {
        let ikm = Zeroizing::new(hmac_sha256(master, label));
        Self::from_ikm(&ikm[..])
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Deterministic signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.secret.sign(message, DST, &[]).compress().to_vec())
    }
}

/// A signature that passed [`verify_signature`] for a specific message and key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSignature {
    signature: Signature,
}

impl VerifiedSignature {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.signature.as_bytes()
    }

    pub fn into_inner(self) -> Signature {
        self.signature
    }
}

/// Check that `public_key` is a canonical, valid, non-identity G1 point.
pub fn validate_public_key(public_key: &PublicKey) -> Result<(), VerifyError> {
    let bytes = public_key.as_bytes();
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(VerifyError::InvalidPublicKey(format!(
            "expected {PUBLIC_KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    BlsPublicKey::key_validate(bytes)
        .map(|_| ())
        .map_err(|e| VerifyError::InvalidPublicKey(format!("G1 point: {e:?}")))
}

/// `verify(signature, message, public_key) -> bool`.
///
/// Malformed keys or signatures verify as `false`.
pub fn verify(signature: &Signature, message: &[u8], public_key: &PublicKey) -> bool {
    if signature.as_bytes().len() != SIGNATURE_LEN
        || public_key.as_bytes().len() != PUBLIC_KEY_LEN
    {
        return false;
    }
    let Ok(pk) = BlsPublicKey::key_validate(public_key.as_bytes()) else {
        return false;
    };
    let Ok(sig) = BlsSignature::from_bytes(signature.as_bytes()) else {
        return false;
    };
    sig.verify(true, message, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}

/// Verify and, on success, wrap the signature as a [`VerifiedSignature`].
pub fn verify_signature(
    signature: Signature,
    message: &[u8],
    public_key: &PublicKey,
) -> Result<VerifiedSignature, VerifyError> {
    if verify(&signature, message, public_key) {
        Ok(VerifiedSignature { signature })
    } else {
        Err(VerifyError::SignatureInvalid)
    }
}
