//! Nullable oracle: a deterministic signer with fault injection.
//!
//! Signs with a real BLS key, so signatures pass the same verification as a
//! production oracle's. Tests can queue faults, corrupt signatures, hand out
//! a malformed public key, and inspect call counts afterwards.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use vx_crypto::BlsKeypair;
use vx_oracle::{OracleClient, OracleError, SignRequest};
use vx_types::{Commitment, Contribution, PublicKey, RoundKey, Signature};

/// A failure injected into the next call of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Fail with [`OracleError::Unavailable`].
    Unavailable,
    /// Fail with [`OracleError::Protocol`].
    Protocol,
    /// Never answer (until the caller's timeout fires).
    Hang,
}

#[derive(Default)]
struct State {
    commit_faults: VecDeque<Fault>,
    sign_faults: VecDeque<Fault>,
    tamper_all: bool,
    tamper_rounds: Vec<u64>,
    bad_public_key: bool,
    signed: HashMap<(Commitment, RoundKey), Contribution>,
    requests: Vec<SignRequest>,
    conflicts: Vec<RoundKey>,
    reveals: Vec<Commitment>,
    commit_calls: usize,
    sign_calls: usize,
}

pub struct NullOracle {
    keypair: BlsKeypair,
    state: Mutex<State>,
}

impl NullOracle {
    pub fn new(tag: u8) -> Self {
        Self {
            keypair: BlsKeypair::from_ikm(&[tag; 32]).expect("32-byte ikm is valid"),
            state: Mutex::new(State::default()),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    /// Fail the next `times` sign calls with `fault`.
    pub fn fail_sign(&self, fault: Fault, times: usize) {
        let mut state = self.state.lock().unwrap();
        state.sign_faults.extend(std::iter::repeat(fault).take(times));
    }

    /// Fail the next `times` commit calls with `fault`.
    pub fn fail_commit(&self, fault: Fault, times: usize) {
        let mut state = self.state.lock().unwrap();
        state.commit_faults.extend(std::iter::repeat(fault).take(times));
    }

    /// Flip one bit of every signature from now on.
    pub fn tamper(&self, on: bool) {
        self.state.lock().unwrap().tamper_all = on;
    }

    /// Flip one bit of the signature for `round` only.
    pub fn tamper_round(&self, round: u64) {
        self.state.lock().unwrap().tamper_rounds.push(round);
    }

    /// Answer commits with an undersized public key.
    pub fn bad_public_key(&self, on: bool) {
        self.state.lock().unwrap().bad_public_key = on;
    }

    pub fn commit_calls(&self) -> usize {
        self.state.lock().unwrap().commit_calls
    }

    pub fn sign_calls(&self) -> usize {
        self.state.lock().unwrap().sign_calls
    }

    /// Every sign request received, including retries.
    pub fn requests(&self) -> Vec<SignRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Round keys that were resubmitted with a different message.
    pub fn conflicts(&self) -> Vec<RoundKey> {
        self.state.lock().unwrap().conflicts.clone()
    }

    pub fn reveals(&self) -> Vec<Commitment> {
        self.state.lock().unwrap().reveals.clone()
    }
}

async fn inject(fault: Fault) -> OracleError {
    match fault {
        Fault::Unavailable => OracleError::Unavailable("null oracle fault".into()),
        Fault::Protocol => OracleError::Protocol("null oracle fault".into()),
        Fault::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            OracleError::Unavailable("null oracle hang".into())
        }
    }
}

#[async_trait]
impl OracleClient for NullOracle {
    async fn commit(
        &self,
        _commitment: &Commitment,
        _context: &[u8],
    ) -> Result<PublicKey, OracleError> {
        let (fault, bad_key) = {
            let mut state = self.state.lock().unwrap();
            state.commit_calls += 1;
            (state.commit_faults.pop_front(), state.bad_public_key)
        };
        if let Some(fault) = fault {
            return Err(inject(fault).await);
        }
        if bad_key {
            return Ok(PublicKey::new(vec![0u8; 10]));
        }
        Ok(self.keypair.public_key().clone())
    }

    async fn sign(&self, request: &SignRequest) -> Result<Signature, OracleError> {
        let (fault, tamper) = {
            let mut state = self.state.lock().unwrap();
            state.sign_calls += 1;
            state.requests.push(request.clone());
            let key = (request.commitment, request.round);
            if let Some(previous) = state.signed.get(&key) {
                if *previous != request.message {
                    state.conflicts.push(request.round);
                    return Err(OracleError::Protocol(format!(
                        "round {} resubmitted with a different message",
                        request.round
                    )));
                }
            }
            let fault = state.sign_faults.pop_front();
            if fault.is_none() {
                state.signed.insert(key, request.message.clone());
            }
            let tamper =
                state.tamper_all || state.tamper_rounds.contains(&request.round.round);
            (fault, tamper)
        };
        if let Some(fault) = fault {
            return Err(inject(fault).await);
        }
        let signature = self.keypair.sign(request.message.as_bytes());
        if tamper {
            let mut bytes = signature.as_bytes().to_vec();
            if let Some(last) = bytes.last_mut() {
                *last ^= 0x01;
            }
            return Ok(Signature::new(bytes));
        }
        Ok(signature)
    }

    async fn reveal(
        &self,
        commitment: &Commitment,
        _secret: &[u8; 32],
        _context: Option<&[u8]>,
    ) -> Result<(), OracleError> {
        self.state.lock().unwrap().reveals.push(*commitment);
        Ok(())
    }

    fn name(&self) -> &str {
        "null-oracle"
    }
}
