//! Dispatch from a message context to its decoder.
//!
//! Matching is exhaustive over [`MessageContext`]; there is no fallback
//! decoder. Multi-move games keep their state here between moves, which is
//! why one engine belongs to exactly one session.

use serde::Serialize;
use vx_crypto::VerifiedSignature;
use vx_types::{CoinSide, HiLo, MessageContext, Mines, Multiplier, Tower};

use crate::coin::coin_from_bytes;
use crate::crash::{chain_crash_from_bytes, dice_from_bytes};
use crate::roulette::roulette_from_bytes;
use crate::{
    check_len, GameStatus, HiLoHand, HiLoStep, MinesBoard, MinesStep, OutcomeError, TowerClimb,
    TowerStep,
};

/// A decoded round result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "game")]
pub enum Outcome {
    CoinToss {
        result: CoinSide,
        won: bool,
    },
    CrashDice {
        multiplier: Multiplier,
        target: Multiplier,
        won: bool,
    },
    Crash {
        multiplier: Multiplier,
    },
    HiLoStarted {
        card: u8,
    },
    HiLo(HiLoStep),
    MinesStarted {
        cells: u32,
        mines: u32,
    },
    Mines(MinesStep),
    MinesCashout {
        layout: Vec<u32>,
    },
    TowerStarted {
        levels: u32,
    },
    Tower(TowerStep),
    TowerCashout {
        level: u32,
        mines: Vec<u32>,
    },
    Roulette {
        index: usize,
        multiplier: f64,
    },
}

/// Signature-sized input for [`OutcomeEngine::check`].
const PROBE_LEN: usize = 96;

#[derive(Clone, Debug)]
enum ActiveGame {
    HiLo(HiLoHand),
    Mines(MinesBoard),
    Tower(TowerClimb),
}

impl ActiveGame {
    fn status(&self) -> GameStatus {
        match self {
            ActiveGame::HiLo(h) => h.status(),
            ActiveGame::Mines(m) => m.status(),
            ActiveGame::Tower(t) => t.status(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OutcomeEngine {
    game: Option<ActiveGame>,
}

impl OutcomeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a multi-move game is waiting for its next move.
    pub fn game_in_progress(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.status() == GameStatus::Playing)
    }

    /// Check that `context` would be accepted in the current game state,
    /// without touching that state. Run before asking the oracle to sign, so
    /// an invalid wager never costs a round.
    pub fn check(&self, context: &MessageContext) -> Result<(), OutcomeError> {
        let mut probe = self.clone();
        probe
            .decode_bytes(context, &[0u8; PROBE_LEN], Some(&[0u8; 32]))
            .map(|_| ())
    }

    /// Decode one round. `next_link` is the chain preimage of this round's
    /// link and is only read by chain crash.
    pub fn decode(
        &mut self,
        context: &MessageContext,
        signature: &VerifiedSignature,
        next_link: Option<&[u8; 32]>,
    ) -> Result<Outcome, OutcomeError> {
        self.decode_bytes(context, signature.as_bytes(), next_link)
    }

    pub(crate) fn decode_bytes(
        &mut self,
        context: &MessageContext,
        bytes: &[u8],
        next_link: Option<&[u8; 32]>,
    ) -> Result<Outcome, OutcomeError> {
        check_len(bytes)?;
        match context {
            MessageContext::FairCoinToss(toss) => {
                let result = coin_from_bytes(bytes)?;
                Ok(Outcome::CoinToss {
                    result,
                    won: result == toss.player_choice,
                })
            }
            MessageContext::CrashDice(dice) => {
                let multiplier = dice_from_bytes(bytes, dice.house_edge_bps)?;
                Ok(Outcome::CrashDice {
                    multiplier,
                    target: dice.target,
                    won: dice.target <= multiplier,
                })
            }
            MessageContext::Crash(crash) => {
                let next = next_link.ok_or(OutcomeError::MissingChainSuccessor)?;
                Ok(Outcome::Crash {
                    multiplier: chain_crash_from_bytes(bytes, next, crash.house_edge_bps)?,
                })
            }
            MessageContext::HiLo(HiLo::Start(start)) => {
                let hand = HiLoHand::new(start)?;
                let card = hand.current();
                self.start(ActiveGame::HiLo(hand))?;
                Ok(Outcome::HiLoStarted { card })
            }
            MessageContext::HiLo(HiLo::Move(mv)) => match &mut self.game {
                Some(ActiveGame::HiLo(hand)) => Ok(Outcome::HiLo(hand.play_bytes(mv, bytes)?)),
                _ => Err(OutcomeError::NoGameInProgress("hilo")),
            },
            MessageContext::Mines(Mines::Start(start)) => {
                let board = MinesBoard::new(start)?;
                self.start(ActiveGame::Mines(board))?;
                Ok(Outcome::MinesStarted {
                    cells: start.cells,
                    mines: start.mines,
                })
            }
            MessageContext::Mines(Mines::Move { cell }) => match &mut self.game {
                Some(ActiveGame::Mines(board)) => {
                    Ok(Outcome::Mines(board.reveal_bytes(*cell, bytes)?))
                }
                _ => Err(OutcomeError::NoGameInProgress("mines")),
            },
            MessageContext::Mines(Mines::Cashout) => match &mut self.game {
                Some(ActiveGame::Mines(board)) => Ok(Outcome::MinesCashout {
                    layout: board.cashout_bytes(bytes)?,
                }),
                _ => Err(OutcomeError::NoGameInProgress("mines")),
            },
            MessageContext::Tower(Tower::Start(start)) => {
                let tower = TowerClimb::new(start)?;
                self.start(ActiveGame::Tower(tower))?;
                Ok(Outcome::TowerStarted {
                    levels: start.levels,
                })
            }
            MessageContext::Tower(Tower::Move { choice }) => match &mut self.game {
                Some(ActiveGame::Tower(tower)) => {
                    Ok(Outcome::Tower(tower.climb_bytes(*choice, bytes)?))
                }
                _ => Err(OutcomeError::NoGameInProgress("tower")),
            },
            MessageContext::Tower(Tower::Cashout) => match &mut self.game {
                Some(ActiveGame::Tower(tower)) => {
                    let level = tower.level();
                    Ok(Outcome::TowerCashout {
                        level,
                        mines: tower.cashout_bytes(bytes)?,
                    })
                }
                _ => Err(OutcomeError::NoGameInProgress("tower")),
            },
            MessageContext::MultiRoulette(wheel) => {
                let index = roulette_from_bytes(bytes, &wheel.probabilities())?;
                Ok(Outcome::Roulette {
                    index,
                    multiplier: wheel.outcomes[index].multiplier,
                })
            }
        }
    }

    fn start(&mut self, game: ActiveGame) -> Result<(), OutcomeError> {
        if self.game_in_progress() {
            return Err(OutcomeError::InvalidMove(
                "previous game has not finished".into(),
            ));
        }
        self.game = Some(game);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vx_crypto::{sha256, BlsKeypair};
    use vx_types::{
        Amount, Crash, CrashDice, Currency, FairCoinToss, HiLoChoice, HiLoMove, HiLoStart,
        MinesStart, MultiRoulette, RouletteOutcome,
    };

    fn verified(message: &[u8]) -> VerifiedSignature {
        let kp = BlsKeypair::from_ikm(&[42u8; 32]).unwrap();
        let sig = kp.sign(message);
        vx_crypto::verify_signature(sig, message, kp.public_key()).unwrap()
    }

    fn coin() -> MessageContext {
        MessageContext::FairCoinToss(FairCoinToss {
            player_choice: CoinSide::Heads,
        })
    }

    #[test]
    fn decoding_is_repeatable() {
        let sig = verified(b"round 1");
        let a = OutcomeEngine::new().decode(&coin(), &sig, None).unwrap();
        let b = OutcomeEngine::new().decode(&coin(), &sig, None).unwrap();
        assert_eq!(a, b);
        match a {
            Outcome::CoinToss { result, won } => assert_eq!(won, result == CoinSide::Heads),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn crash_needs_next_link() {
        let sig = verified(b"link");
        let ctx = MessageContext::Crash(Crash {
            house_edge_bps: 100,
        });
        let mut engine = OutcomeEngine::new();
        assert_eq!(
            engine.decode(&ctx, &sig, None),
            Err(OutcomeError::MissingChainSuccessor)
        );
        let next = sha256(b"next");
        assert!(matches!(
            engine.decode(&ctx, &sig, Some(&next)),
            Ok(Outcome::Crash { .. })
        ));
    }

    #[test]
    fn dice_reports_win_against_target() {
        let sig = verified(b"dice");
        let ctx = MessageContext::CrashDice(CrashDice {
            amount: Amount::new(Currency::Btc, 5),
            target: Multiplier::ONE,
            house_edge_bps: 100,
        });
        match OutcomeEngine::new().decode(&ctx, &sig, None).unwrap() {
            Outcome::CrashDice { won, multiplier, .. } => {
                assert!(won);
                assert!(multiplier >= Multiplier::ONE);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn moves_without_a_game_are_rejected() {
        let sig = verified(b"m");
        let mut engine = OutcomeEngine::new();
        assert_eq!(
            engine.decode(&MessageContext::Mines(Mines::Cashout), &sig, None),
            Err(OutcomeError::NoGameInProgress("mines"))
        );
        assert_eq!(
            engine.decode(&MessageContext::Tower(Tower::Move { choice: 0 }), &sig, None),
            Err(OutcomeError::NoGameInProgress("tower"))
        );
    }

    #[test]
    fn mines_game_flows_through_engine() {
        let mut engine = OutcomeEngine::new();
        let start = MessageContext::Mines(Mines::Start(MinesStart {
            amount: Amount::new(Currency::Btc, 1),
            cells: 25,
            cell_line_break: 5,
            mines: 3,
        }));
        engine.decode(&start, &verified(b"start"), None).unwrap();
        assert!(engine.game_in_progress());
        // a second start while playing is refused
        assert!(engine.decode(&start, &verified(b"again"), None).is_err());

        let cashout = engine
            .decode(&MessageContext::Mines(Mines::Cashout), &verified(b"cash"), None)
            .unwrap();
        match cashout {
            Outcome::MinesCashout { layout } => assert_eq!(layout.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!engine.game_in_progress());
        engine.decode(&start, &verified(b"new game"), None).unwrap();
    }

    #[test]
    fn hilo_cashout_through_engine() {
        let mut engine = OutcomeEngine::new();
        let start = MessageContext::HiLo(HiLo::Start(HiLoStart {
            amount: Amount::new(Currency::Eth, 3),
            starting_card: 7,
        }));
        assert_eq!(
            engine.decode(&start, &verified(b"s"), None),
            Ok(Outcome::HiLoStarted { card: 7 })
        );
        let cash = MessageContext::HiLo(HiLo::Move(HiLoMove {
            move_index: 0,
            player_choice: HiLoChoice::Cashout,
        }));
        assert_eq!(
            engine.decode(&cash, &verified(b"c"), None),
            Ok(Outcome::HiLo(HiLoStep::CashedOut { card: 7 }))
        );
    }

    #[test]
    fn check_leaves_state_untouched() {
        let mut engine = OutcomeEngine::new();
        let start = MessageContext::Tower(Tower::Start(vx_types::TowerStart {
            amount: Amount::new(Currency::Btc, 1),
            house_edge_bps: 100,
            levels: 3,
            choices_per_level: 3,
            mines_per_level: 1,
        }));
        engine.check(&start).unwrap();
        assert!(!engine.game_in_progress());
        assert_eq!(
            engine.check(&MessageContext::Tower(Tower::Move { choice: 0 })),
            Err(OutcomeError::NoGameInProgress("tower"))
        );
        engine.decode(&start, &verified(b"t"), None).unwrap();
        assert!(engine.check(&MessageContext::Tower(Tower::Move { choice: 5 })).is_err());
        assert!(engine.check(&MessageContext::Tower(Tower::Move { choice: 2 })).is_ok());
        assert!(engine
            .clone()
            .decode(&MessageContext::Tower(Tower::Cashout), &verified(b"c"), None)
            .is_ok());
        assert!(engine.game_in_progress());
    }

    #[test]
    fn roulette_returns_declared_multiplier() {
        let wheel = MultiRoulette {
            outcomes: vec![
                RouletteOutcome {
                    probability: 0.5,
                    multiplier: 2.0,
                    bets: vec![],
                },
                RouletteOutcome {
                    probability: 0.5,
                    multiplier: 0.0,
                    bets: vec![],
                },
            ],
        };
        let outcome = OutcomeEngine::new()
            .decode(&MessageContext::MultiRoulette(wheel), &verified(b"spin"), None)
            .unwrap();
        match outcome {
            Outcome::Roulette { index: 0, multiplier } => assert_eq!(multiplier, 2.0),
            Outcome::Roulette { index: 1, multiplier } => assert_eq!(multiplier, 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
