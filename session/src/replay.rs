//! Independent verification of a finished session.
//!
//! Given only the reveal, the public key and the audit records, rebuild the
//! commitment, recompute every round's message, verify every signature and
//! decode every outcome again. Nothing from the live session is consulted.
//! Signature checks are independent per record and run on the rayon pool;
//! decoding stays sequential because multi-move games carry state.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use vx_commitment::{chain_message, keyed_contribution, CommitmentError, SeedCommitment};
use vx_crypto::{validate_public_key, verify_signature, VerifiedSignature};
use vx_outcome::{Outcome, OutcomeEngine, OutcomeError};
use vx_store::{AuditStore, StoreError};
use vx_types::{
    AuditRecord, CommitMode, Commitment, ContextError, Contribution, HiLo, MessageContext,
    PublicKey, RevealPackage, RoundKey, Seed,
};

use crate::tracing_spans::replay_span;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("revealed secret does not open commitment {0}")]
    CommitmentMismatch(Commitment),

    #[error("record for round {round} belongs to commitment {found}")]
    ForeignRecord { round: RoundKey, found: Commitment },

    #[error("round {round}: message does not match the revealed secret")]
    ContributionMismatch { round: RoundKey },

    #[error("round {round}: round is outside the committed chain")]
    RoundOutOfRange { round: RoundKey },

    #[error("round {round} does not follow round {previous}")]
    OutOfSequence { round: RoundKey, previous: RoundKey },

    #[error("round {round}: signed move index {move_index} does not match the round key")]
    MoveMismatch { round: RoundKey, move_index: u32 },

    #[error("round {round}: signature does not verify")]
    SignatureInvalid { round: RoundKey },

    #[error("round {round}: bad context: {source}")]
    Context { round: RoundKey, source: ContextError },

    #[error("round {round}: {source}")]
    Decode { round: RoundKey, source: OutcomeError },

    #[error("invalid public key: {0}")]
    PublicKey(String),

    #[error("audit log has no {what} for commitment {commitment}")]
    Incomplete {
        what: &'static str,
        commitment: Commitment,
    },

    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplayedRound {
    #[serde(flatten)]
    pub key: RoundKey,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditReport {
    pub commitment: Commitment,
    pub mode: CommitMode,
    pub rounds: Vec<ReplayedRound>,
}

/// Re-verify `records` against a reveal and the oracle key.
pub fn audit_session(
    reveal: &RevealPackage,
    public_key: &PublicKey,
    records: &[AuditRecord],
) -> Result<AuditReport, ReplayError> {
    let span = replay_span(&reveal.commitment, records.len());
    let _enter = span.enter();

    validate_public_key(public_key).map_err(|e| ReplayError::PublicKey(e.to_string()))?;
    let secret = SeedCommitment::from_seed(reveal.mode, Seed::new(reveal.secret))?;
    if secret.commitment() != reveal.commitment {
        return Err(ReplayError::CommitmentMismatch(reveal.commitment));
    }
    let player_seed = reveal
        .context
        .as_ref()
        .map(|c| c.player_seed())
        .unwrap_or_default();

    let verified: Vec<Option<VerifiedSignature>> = records
        .par_iter()
        .map(|r| verify_signature(r.signature.clone(), r.message.as_bytes(), public_key).ok())
        .collect();

    let mut engine = OutcomeEngine::new();
    let mut rounds = Vec::with_capacity(records.len());
    let mut previous = RoundKey::new(0);
    for (record, verified) in records.iter().zip(verified) {
        let round = record.round;
        if record.commitment != reveal.commitment {
            return Err(ReplayError::ForeignRecord {
                round,
                found: record.commitment,
            });
        }
        if !follows(previous, round) {
            return Err(ReplayError::OutOfSequence { round, previous });
        }
        previous = round;
        let expected = expected_contribution(&secret, player_seed, round)?;
        if expected != record.message {
            return Err(ReplayError::ContributionMismatch { round });
        }
        let verified = verified.ok_or(ReplayError::SignatureInvalid { round })?;
        let context = record
            .message_context()
            .map_err(|source| ReplayError::Context { round, source })?;
        if let MessageContext::HiLo(HiLo::Move(mv)) = &context {
            if round.sub != Some(mv.move_index) {
                return Err(ReplayError::MoveMismatch {
                    round,
                    move_index: mv.move_index,
                });
            }
        }
        let successor = secret
            .chain()
            .and_then(|chain| chain.successor_for_round(round.round));
        let outcome = engine
            .decode(&context, &verified, successor.as_ref())
            .map_err(|source| ReplayError::Decode { round, source })?;
        rounds.push(ReplayedRound { key: round, outcome });
    }

    tracing::info!(rounds = rounds.len(), "session replay verified");
    Ok(AuditReport {
        commitment: reveal.commitment,
        mode: reveal.mode,
        rounds,
    })
}

/// Rounds run 1, 2, 3, ... with no gaps. A multi-move round starts at move 0
/// and its moves count up by one.
fn follows(previous: RoundKey, round: RoundKey) -> bool {
    let next_round = previous.round.checked_add(1) == Some(round.round)
        && matches!(round.sub, None | Some(0));
    let next_move = round.round == previous.round
        && previous
            .sub
            .and_then(|s| s.checked_add(1))
            .is_some_and(|next| round.sub == Some(next));
    next_round || next_move
}

fn expected_contribution(
    secret: &SeedCommitment,
    player_seed: &str,
    round: RoundKey,
) -> Result<Contribution, ReplayError> {
    match secret.chain() {
        None => Ok(keyed_contribution(secret.seed().expose(), player_seed, round)),
        Some(chain) => {
            if round.sub.is_some() {
                return Err(ReplayError::RoundOutOfRange { round });
            }
            let link = chain
                .link_for_round(round.round)
                .ok_or(ReplayError::RoundOutOfRange { round })?;
            Ok(chain_message(&link, player_seed))
        }
    }
}

/// Replay one commitment straight out of an audit store.
pub fn audit_store(
    store: &dyn AuditStore,
    commitment: &Commitment,
) -> Result<AuditReport, ReplayError> {
    let incomplete = |what| ReplayError::Incomplete {
        what,
        commitment: *commitment,
    };
    let public_key = store
        .public_key(commitment)?
        .ok_or_else(|| incomplete("registration"))?;
    let reveal = store
        .reveal(commitment)?
        .ok_or_else(|| incomplete("reveal"))?;
    let records = store.rounds(commitment)?;
    audit_session(&reveal, &public_key, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vx_crypto::BlsKeypair;
    use vx_types::{
        Amount, CoinSide, Currency, FairCoinToss, HiLoChoice, HiLoMove, HiLoStart, RevealContext,
    };

    fn sign_rounds(
        seed: [u8; 32],
        client_seed: &str,
        rounds: &[(RoundKey, MessageContext)],
    ) -> (RevealPackage, PublicKey, Vec<AuditRecord>) {
        let keypair = BlsKeypair::from_ikm(&[42u8; 32]).unwrap();
        let secret = SeedCommitment::from_seed(CommitMode::Single, Seed::new(seed)).unwrap();
        let records = rounds
            .iter()
            .map(|(key, context)| {
                let message = keyed_contribution(&seed, client_seed, *key);
                AuditRecord {
                    commitment: secret.commitment(),
                    signature: keypair.sign(message.as_bytes()),
                    message,
                    round: *key,
                    context: context.encode().unwrap(),
                }
            })
            .collect();
        let reveal = RevealPackage {
            commitment: secret.commitment(),
            mode: CommitMode::Single,
            secret: seed,
            context: Some(RevealContext::StandardDerivation {
                player_seed: client_seed.to_string(),
            }),
        };
        (reveal, keypair.public_key().clone(), records)
    }

    fn signed_session(
        seed: [u8; 32],
        client_seed: &str,
        rounds: u64,
    ) -> (RevealPackage, PublicKey, Vec<AuditRecord>) {
        let coin = MessageContext::FairCoinToss(FairCoinToss {
            player_choice: CoinSide::Tails,
        });
        let keys: Vec<_> = (1..=rounds).map(|n| (RoundKey::new(n), coin.clone())).collect();
        sign_rounds(seed, client_seed, &keys)
    }

    fn hilo_start() -> MessageContext {
        MessageContext::HiLo(HiLo::Start(HiLoStart {
            amount: Amount::new(Currency::Btc, 1),
            starting_card: 5,
        }))
    }

    fn hilo_cashout(move_index: u32) -> MessageContext {
        MessageContext::HiLo(HiLo::Move(HiLoMove {
            move_index,
            player_choice: HiLoChoice::Cashout,
        }))
    }

    #[test]
    fn report_serializes_flat_round_keys() {
        let (reveal, pk, records) = signed_session([3u8; 32], "abc", 2);
        let report = audit_session(&reveal, &pk, &records).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rounds"][1]["round"], 2);
        assert_eq!(json["rounds"][0]["outcome"]["game"], "coin_toss");
    }

    #[test]
    fn record_from_another_session_is_rejected() {
        let (reveal, pk, mut records) = signed_session([3u8; 32], "abc", 2);
        let (_, _, other) = signed_session([4u8; 32], "abc", 1);
        records.push(other[0].clone());
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::ForeignRecord { .. })
        ));
    }

    #[test]
    fn wrong_player_seed_breaks_every_contribution() {
        let (mut reveal, pk, records) = signed_session([5u8; 32], "alice", 1);
        reveal.context = Some(RevealContext::StandardDerivation {
            player_seed: "mallory".into(),
        });
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::ContributionMismatch { .. })
        ));
    }

    #[test]
    fn dropped_round_is_reported() {
        let (reveal, pk, mut records) = signed_session([6u8; 32], "abc", 4);
        records.remove(1);
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::OutOfSequence { round, previous })
                if round == RoundKey::new(3) && previous == RoundKey::new(1)
        ));
    }

    #[test]
    fn reordered_rounds_are_reported() {
        let (reveal, pk, mut records) = signed_session([6u8; 32], "abc", 3);
        records.swap(0, 2);
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::OutOfSequence { round, .. }) if round == RoundKey::new(3)
        ));
    }

    #[test]
    fn log_must_start_at_round_one() {
        let (reveal, pk, records) = signed_session([6u8; 32], "abc", 3);
        assert!(matches!(
            audit_session(&reveal, &pk, &records[1..]),
            Err(ReplayError::OutOfSequence { round, .. }) if round == RoundKey::new(2)
        ));
    }

    #[test]
    fn multi_move_round_replays_in_move_order() {
        let coin = MessageContext::FairCoinToss(FairCoinToss {
            player_choice: CoinSide::Heads,
        });
        let rounds = [
            (RoundKey::with_move(1, 0), hilo_start()),
            (RoundKey::with_move(1, 1), hilo_cashout(1)),
            (RoundKey::new(2), coin),
        ];
        let (reveal, pk, records) = sign_rounds([8u8; 32], "abc", &rounds);
        let report = audit_session(&reveal, &pk, &records).unwrap();
        assert_eq!(report.rounds.len(), 3);

        let skipped = [
            (RoundKey::with_move(1, 0), hilo_start()),
            (RoundKey::with_move(1, 2), hilo_cashout(2)),
        ];
        let (reveal, pk, records) = sign_rounds([8u8; 32], "abc", &skipped);
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn hilo_move_index_must_match_round_key() {
        let rounds = [
            (RoundKey::with_move(1, 0), hilo_start()),
            (RoundKey::with_move(1, 1), hilo_cashout(42)),
        ];
        let (reveal, pk, records) = sign_rounds([9u8; 32], "abc", &rounds);
        assert!(matches!(
            audit_session(&reveal, &pk, &records),
            Err(ReplayError::MoveMismatch { move_index: 42, .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn replay_is_deterministic(
            seed in any::<[u8; 32]>(),
            client_seed in "[a-z0-9]{0,12}",
            rounds in 1u64..6,
        ) {
            let (reveal, pk, records) = signed_session(seed, &client_seed, rounds);
            let first = audit_session(&reveal, &pk, &records).unwrap();
            let second = audit_session(&reveal, &pk, &records).unwrap();
            prop_assert_eq!(first.rounds.len() as u64, rounds);
            prop_assert_eq!(first, second);
        }
    }
}
