//! The per-session round pipeline.
//!
//! One session owns one commitment and runs strictly sequentially:
//! derive -> sign -> verify -> record -> decode, end to end, before the next
//! round may start. A round whose signature request failed with a retryable
//! error stays *in flight* with its request frozen; the only way forward is
//! [`Session::retry_pending`] (or abandoning the session), so a retry can never
//! derive a second contribution for the same round.

use std::sync::Arc;

use tracing::Instrument;
use vx_commitment::{ContributionDeriver, EntropySource, SeedCommitment};
use vx_crypto::{validate_public_key, verify_signature};
use vx_oracle::{OracleClient, RetryPolicy, SignRequest};
use vx_outcome::{Outcome, OutcomeEngine, OutcomeError};
use vx_store::AuditStore;
use vx_types::{
    AuditRecord, CommitMode, Commitment, GameFamily, HiLo, MessageContext, Mines, PublicKey,
    Registration, RevealContext, RevealPackage, RoundKey, Tower,
};

use crate::tracing_spans::{register_span, reveal_span, round_span};
use crate::{RevealEngine, SessionConfig, SessionError};

/// A round that was played to completion.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub key: RoundKey,
    pub outcome: Outcome,
    pub record: AuditRecord,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Aborted(String),
    Revealed,
}

struct Pending {
    request: SignRequest,
    context: MessageContext,
}

#[derive(Clone, Copy)]
struct OpenRound {
    round: u64,
    next_sub: u32,
    family: GameFamily,
}

pub struct Session {
    secret: SeedCommitment,
    deriver: ContributionDeriver,
    oracle: Arc<dyn OracleClient>,
    store: Arc<dyn AuditStore>,
    retry: RetryPolicy,
    public_key: Option<PublicKey>,
    engine: OutcomeEngine,
    last_round: u64,
    open_round: Option<OpenRound>,
    pending: Option<Pending>,
    status: SessionStatus,
}

fn starts_multi_move(context: &MessageContext) -> bool {
    matches!(
        context,
        MessageContext::HiLo(HiLo::Start(_))
            | MessageContext::Mines(Mines::Start(_))
            | MessageContext::Tower(Tower::Start(_))
    )
}

/// `context` must be a move or cashout of the open game. A hi-lo move also
/// carries its index, which has to be the move being signed.
fn check_continuation(open: &OpenRound, context: &MessageContext) -> Result<(), SessionError> {
    let continues = match context {
        MessageContext::HiLo(HiLo::Move(mv)) if open.family == GameFamily::HiLo => {
            if mv.move_index != open.next_sub {
                return Err(SessionError::InvalidWager(OutcomeError::InvalidMove(format!(
                    "move index {} does not match move {} of round {}",
                    mv.move_index, open.next_sub, open.round
                ))));
            }
            true
        }
        MessageContext::Mines(Mines::Move { .. } | Mines::Cashout) => {
            open.family == GameFamily::Mines
        }
        MessageContext::Tower(Tower::Move { .. } | Tower::Cashout) => {
            open.family == GameFamily::Tower
        }
        _ => false,
    };
    if !continues {
        return Err(SessionError::InvalidWager(OutcomeError::InvalidMove(format!(
            "{} context cannot continue the open {} round",
            context.family().as_str(),
            open.family.as_str()
        ))));
    }
    Ok(())
}

impl Session {
    /// Generate the house secret and its commitment. Nothing is sent to the
    /// oracle until [`register`](Self::register).
    pub fn open(
        config: &SessionConfig,
        entropy: &dyn EntropySource,
        oracle: Arc<dyn OracleClient>,
        store: Arc<dyn AuditStore>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let secret = SeedCommitment::generate(config.commit_mode(), entropy)?;
        let deriver = config.deriver();
        deriver.check_compatible(&secret)?;
        Ok(Self {
            secret,
            deriver,
            oracle,
            store,
            retry: config.retry_policy(),
            public_key: None,
            engine: OutcomeEngine::new(),
            last_round: 0,
            open_round: None,
            pending: None,
            status: SessionStatus::Open,
        })
    }

    /// [`open`](Self::open) followed by [`register`](Self::register).
    pub async fn start(
        config: &SessionConfig,
        entropy: &dyn EntropySource,
        oracle: Arc<dyn OracleClient>,
        store: Arc<dyn AuditStore>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::open(config, entropy, oracle, store)?;
        session.register().await?;
        Ok(session)
    }

    pub fn commitment(&self) -> Commitment {
        self.secret.commitment()
    }

    pub fn mode(&self) -> CommitMode {
        self.secret.mode()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Rounds left on the chain; `None` for single-seed sessions.
    pub fn remaining_rounds(&self) -> Option<u32> {
        self.secret.remaining_rounds()
    }

    /// Highest round number started so far.
    pub fn last_round(&self) -> u64 {
        self.last_round
    }

    /// The round waiting for a signature, if any.
    pub fn pending_round(&self) -> Option<RoundKey> {
        self.pending.as_ref().map(|p| p.request.round)
    }

    /// True while a multi-move game expects [`play_move`](Self::play_move).
    pub fn has_open_round(&self) -> bool {
        self.open_round.is_some()
    }

    /// `register(commitment, context) -> publicKey`.
    ///
    /// Idempotent once it has succeeded. A key that is not a valid G1 point
    /// is an [`SessionError::OracleProtocolError`] and aborts the session.
    pub async fn register(&mut self) -> Result<PublicKey, SessionError> {
        if let Some(pk) = &self.public_key {
            return Ok(pk.clone());
        }
        self.ensure_open()?;
        let span = register_span(&self.commitment());
        self.register_with_oracle().instrument(span).await
    }

    async fn register_with_oracle(&mut self) -> Result<PublicKey, SessionError> {
        let commitment = self.commitment();
        let context = self.secret.commitment_context().encode()?;
        let oracle = Arc::clone(&self.oracle);
        let result = self
            .retry
            .run("commit", || oracle.commit(&commitment, &context))
            .await;
        let public_key = match result {
            Ok(pk) => pk,
            Err(e) if e.is_retryable() => return Err(e.into()),
            Err(e) => return Err(self.abort(e.into())),
        };
        if let Err(e) = validate_public_key(&public_key) {
            return Err(self.abort(SessionError::OracleProtocolError(e.to_string())));
        }
        let registration = Registration {
            commitment,
            mode: self.mode(),
            public_key: public_key.clone(),
        };
        if let Err(e) = self.store.record_registration(&registration) {
            return Err(self.abort(e.into()));
        }
        tracing::info!(
            mode = ?self.mode(),
            usable_rounds = ?self.remaining_rounds(),
            oracle = self.oracle.name(),
            "session registered"
        );
        self.public_key = Some(public_key.clone());
        Ok(public_key)
    }

    /// Play a new round. Multi-move games (hi-lo, mines, tower) are started
    /// here and continued with [`play_move`](Self::play_move).
    pub async fn play_round(&mut self, context: MessageContext) -> Result<RoundResult, SessionError> {
        if self.open_round.is_some() {
            return Err(SessionError::InvalidWager(OutcomeError::InvalidMove(
                "finish the open round before starting another".into(),
            )));
        }
        let round = self.last_round + 1;
        let key = if starts_multi_move(&context) {
            RoundKey::with_move(round, 0)
        } else {
            RoundKey::new(round)
        };
        let span = round_span(&self.commitment(), key);
        self.execute(key, context).instrument(span).await
    }

    /// Play the next move of the open multi-move round.
    pub async fn play_move(&mut self, context: MessageContext) -> Result<RoundResult, SessionError> {
        let open = self.open_round.ok_or(SessionError::NoOpenRound)?;
        check_continuation(&open, &context)?;
        let key = RoundKey::with_move(open.round, open.next_sub);
        let span = round_span(&self.commitment(), key);
        self.execute(key, context).instrument(span).await
    }

    /// Resubmit the in-flight round's request, unchanged.
    pub async fn retry_pending(&mut self) -> Result<RoundResult, SessionError> {
        self.ensure_open()?;
        let key = self.pending_round().ok_or(SessionError::NoRoundInFlight)?;
        let span = round_span(&self.commitment(), key);
        self.submit().instrument(span).await
    }

    /// Stop playing at a round boundary. Completed rounds stay verifiable
    /// from the audit log; the session can still be revealed.
    pub fn abandon(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::warn!(round = %pending.request.round, "abandoning round in flight");
        }
        self.open_round = None;
        if self.status == SessionStatus::Open {
            self.status = SessionStatus::Aborted("abandoned".into());
        }
        tracing::info!(commitment = %self.commitment().short(), "session abandoned");
    }

    /// Publish the secret. Exactly once per commitment.
    pub async fn reveal(&mut self) -> Result<RevealPackage, SessionError> {
        if self.status == SessionStatus::Revealed {
            return Err(SessionError::DoubleRevealError(self.commitment()));
        }
        if let Some(round) = self.pending_round() {
            return Err(SessionError::RoundInFlight(round));
        }
        let package = self.reveal_package();
        let engine = RevealEngine::new(Arc::clone(&self.store), Arc::clone(&self.oracle), self.retry);
        engine
            .publish(&package)
            .instrument(reveal_span(&package.commitment))
            .await?;
        self.status = SessionStatus::Revealed;
        self.open_round = None;
        Ok(package)
    }

    fn reveal_package(&self) -> RevealPackage {
        let player_seed = self.deriver.client_seed().to_string();
        let context = match self.secret.chain() {
            None => RevealContext::StandardDerivation { player_seed },
            Some(_) => RevealContext::ChainDerivation { player_seed },
        };
        RevealPackage {
            commitment: self.commitment(),
            mode: self.mode(),
            secret: *self.secret.seed().expose(),
            context: Some(context),
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match &self.status {
            SessionStatus::Open => Ok(()),
            SessionStatus::Aborted(reason) => Err(SessionError::SessionAborted(reason.clone())),
            SessionStatus::Revealed => Err(SessionError::SessionRevealed),
        }
    }

    async fn execute(
        &mut self,
        key: RoundKey,
        context: MessageContext,
    ) -> Result<RoundResult, SessionError> {
        self.ensure_open()?;
        if self.public_key.is_none() {
            return Err(SessionError::NotRegistered);
        }
        if let Some(round) = self.pending_round() {
            return Err(SessionError::RoundInFlight(round));
        }
        self.engine
            .check(&context)
            .map_err(SessionError::InvalidWager)?;
        if matches!(context, MessageContext::Crash(_)) && self.secret.chain().is_none() {
            return Err(SessionError::InvalidWager(OutcomeError::MissingChainSuccessor));
        }

        let context_bytes = context.encode()?;
        let message = self.deriver.derive(&mut self.secret, key)?;
        self.last_round = key.round;
        if let Some(sub) = key.sub {
            self.open_round = Some(OpenRound {
                round: key.round,
                next_sub: sub + 1,
                family: context.family(),
            });
        }
        tracing::debug!(family = context.family().as_str(), "contribution derived");

        self.pending = Some(Pending {
            request: SignRequest {
                commitment: self.commitment(),
                message,
                round: key,
                context: context_bytes,
            },
            context,
        });
        self.submit().await
    }

    async fn submit(&mut self) -> Result<RoundResult, SessionError> {
        let (request, public_key) = match (&self.pending, &self.public_key) {
            (Some(pending), Some(pk)) => (pending.request.clone(), pk.clone()),
            (None, _) => return Err(SessionError::NoRoundInFlight),
            (_, None) => return Err(SessionError::NotRegistered),
        };
        let key = request.round;
        let oracle = Arc::clone(&self.oracle);

        let result = self.retry.run("sign", || oracle.sign(&request)).await;
        let signature = match result {
            Ok(signature) => signature,
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "round left in flight");
                return Err(e.into());
            }
            Err(e) => return Err(self.abort(e.into())),
        };

        let verified = match verify_signature(signature, request.message.as_bytes(), &public_key)
        {
            Ok(verified) => verified,
            Err(_) => {
                let oracle = self.oracle.name().to_string();
                tracing::error!(oracle = %oracle, "oracle signature failed verification");
                return Err(self.abort(SessionError::SignatureVerificationFailed {
                    round: key,
                    oracle,
                }));
            }
        };

        let record = request.into_record(verified.signature().clone());
        if let Err(e) = self.store.record_round(&record) {
            return Err(self.abort(e.into()));
        }
        tracing::debug!("audit record written");

        let Some(pending) = self.pending.take() else {
            return Err(SessionError::NoRoundInFlight);
        };
        let successor = self
            .secret
            .chain()
            .and_then(|chain| chain.successor_for_round(key.round));
        let decoded = self
            .engine
            .decode(&pending.context, &verified, successor.as_ref());
        let outcome = match decoded {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.abort(SessionError::OutcomeDecodeError(e))),
        };
        if key.sub.is_some() && !self.engine.game_in_progress() {
            self.open_round = None;
        }
        tracing::info!(family = pending.context.family().as_str(), ?outcome, "round settled");
        Ok(RoundResult {
            key,
            outcome,
            record,
        })
    }

    /// Mark the session aborted and hand back the error that caused it.
    fn abort(&mut self, error: SessionError) -> SessionError {
        self.pending = None;
        self.open_round = None;
        self.status = SessionStatus::Aborted(error.to_string());
        tracing::error!(error = %error, "session aborted");
        error
    }
}
