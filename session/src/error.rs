use thiserror::Error;
use vx_commitment::CommitmentError;
use vx_oracle::OracleError;
use vx_outcome::OutcomeError;
use vx_store::StoreError;
use vx_types::{Commitment, ContextError, RoundKey};

#[derive(Debug, Error)]
pub enum SessionError {
    /// Retryable. The round stays in flight; resubmit it with
    /// `Session::retry_pending`.
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("oracle protocol error: {0}")]
    OracleProtocolError(String),

    #[error("signature for round {round} failed verification (oracle {oracle})")]
    SignatureVerificationFailed { round: RoundKey, oracle: String },

    #[error("outcome decode error: {0}")]
    OutcomeDecodeError(OutcomeError),

    #[error("commitment {0} was already revealed")]
    DoubleRevealError(Commitment),

    /// The wager cannot be played in the current game state. Nothing was
    /// derived or signed.
    #[error("invalid wager: {0}")]
    InvalidWager(OutcomeError),

    #[error("hash chain exhausted after {used} rounds")]
    ChainExhausted { used: u32 },

    #[error("round {0} is still in flight")]
    RoundInFlight(RoundKey),

    #[error("no round in flight")]
    NoRoundInFlight,

    #[error("no multi-move round is open")]
    NoOpenRound,

    #[error("session is not registered with the oracle")]
    NotRegistered,

    #[error("session aborted: {0}")]
    SessionAborted(String),

    #[error("session already revealed")]
    SessionRevealed,

    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("commitment error: {0}")]
    Commitment(CommitmentError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Fatal errors abort the session they occur in.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::OracleProtocolError(_)
                | SessionError::SignatureVerificationFailed { .. }
                | SessionError::OutcomeDecodeError(_)
                | SessionError::Store(_)
        )
    }
}

impl From<CommitmentError> for SessionError {
    fn from(e: CommitmentError) -> Self {
        match e {
            CommitmentError::ChainExhausted { used } => SessionError::ChainExhausted { used },
            other => SessionError::Commitment(other),
        }
    }
}

impl From<OracleError> for SessionError {
    fn from(e: OracleError) -> Self {
        match e {
            OracleError::Unavailable(_) | OracleError::Timeout { .. } => {
                SessionError::OracleUnavailable(e.to_string())
            }
            OracleError::Protocol(msg) => SessionError::OracleProtocolError(msg),
        }
    }
}
