//! In-process reference oracle.
//!
//! Holds one master secret and derives a BLS key per commitment with
//! `key_gen(HMAC-SHA256(master, commitment))`, so keys are deterministic and
//! distinct per session. Signing is idempotent on `(commitment, round, sub)`:
//! resubmitting the same request returns the same signature, while a
//! different message for an already-signed round key is refused.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use vx_crypto::{sha256, BlsKeypair};
use vx_types::{Commitment, CommitmentContext, Contribution, PublicKey, RoundKey, Signature};
use zeroize::Zeroizing;

use crate::{OracleClient, OracleError, SignRequest};

/// Upper bound on chain length the local oracle walks when checking a reveal.
pub const MAX_REVEAL_CHAIN: u32 = 1 << 20;

struct Registered {
    keypair: BlsKeypair,
    context: Vec<u8>,
    signed: HashMap<RoundKey, (Contribution, Signature)>,
    revealed: bool,
}

pub struct LocalOracle {
    master: Zeroizing<[u8; 32]>,
    sessions: Mutex<HashMap<Commitment, Registered>>,
}

impl LocalOracle {
    pub fn new(master: [u8; 32]) -> Self {
        Self {
            master: Zeroizing::new(master),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Public key the oracle uses (or would use) for `commitment`.
    pub fn public_key_for(&self, commitment: &Commitment) -> Result<PublicKey, OracleError> {
        Ok(self.keypair_for(commitment)?.public_key().clone())
    }

    /// Number of distinct rounds signed for `commitment`.
    pub fn signed_rounds(&self, commitment: &Commitment) -> usize {
        self.lock()
            .map(|s| s.get(commitment).map_or(0, |r| r.signed.len()))
            .unwrap_or(0)
    }

    fn keypair_for(&self, commitment: &Commitment) -> Result<BlsKeypair, OracleError> {
        BlsKeypair::derive(&self.master[..], commitment.as_bytes())
            .map_err(|e| OracleError::Protocol(e.to_string()))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Commitment, Registered>>, OracleError> {
        self.sessions
            .lock()
            .map_err(|_| OracleError::Unavailable("oracle state poisoned".into()))
    }
}

fn check_reveal(
    commitment: &Commitment,
    secret: &[u8; 32],
    context: &[u8],
) -> Result<(), OracleError> {
    let matches = match CommitmentContext::decode(context) {
        Ok(CommitmentContext::Sha256Commitment {}) => sha256(secret) == *commitment.as_bytes(),
        Ok(CommitmentContext::Sha256Chain {}) => {
            let mut link = *secret;
            (0..MAX_REVEAL_CHAIN).any(|_| {
                link = sha256(&link);
                link == *commitment.as_bytes()
            })
        }
        // unknown commitment scheme: nothing to check against
        Err(_) => true,
    };
    if matches {
        Ok(())
    } else {
        Err(OracleError::Protocol(format!(
            "secret does not open commitment {}",
            commitment.short()
        )))
    }
}

#[async_trait]
impl OracleClient for LocalOracle {
    async fn commit(
        &self,
        commitment: &Commitment,
        context: &[u8],
    ) -> Result<PublicKey, OracleError> {
        let mut sessions = self.lock()?;
        if let Some(existing) = sessions.get(commitment) {
            return Ok(existing.keypair.public_key().clone());
        }
        let keypair = self.keypair_for(commitment)?;
        let public = keypair.public_key().clone();
        sessions.insert(
            *commitment,
            Registered {
                keypair,
                context: context.to_vec(),
                signed: HashMap::new(),
                revealed: false,
            },
        );
        tracing::debug!(commitment = %commitment.short(), "local oracle registered commitment");
        Ok(public)
    }

    async fn sign(&self, request: &SignRequest) -> Result<Signature, OracleError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(&request.commitment).ok_or_else(|| {
            OracleError::Protocol(format!(
                "unknown commitment {}",
                request.commitment.short()
            ))
        })?;
        if session.revealed {
            return Err(OracleError::Protocol("commitment already revealed".into()));
        }
        if let Some((message, signature)) = session.signed.get(&request.round) {
            if *message != request.message {
                return Err(OracleError::Protocol(format!(
                    "round {} already signed for a different message",
                    request.round
                )));
            }
            return Ok(signature.clone());
        }
        let signature = session.keypair.sign(request.message.as_bytes());
        session
            .signed
            .insert(request.round, (request.message.clone(), signature.clone()));
        Ok(signature)
    }

    async fn reveal(
        &self,
        commitment: &Commitment,
        secret: &[u8; 32],
        _context: Option<&[u8]>,
    ) -> Result<(), OracleError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(commitment).ok_or_else(|| {
            OracleError::Protocol(format!("unknown commitment {}", commitment.short()))
        })?;
        if session.revealed {
            return Err(OracleError::Protocol("commitment already revealed".into()));
        }
        check_reveal(commitment, secret, &session.context)?;
        session.revealed = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "local"
    }
}
