//! Hi-lo: guess whether the next card ranks higher or lower than the current one.

use serde::Serialize;
use vx_crypto::VerifiedSignature;
use vx_types::{HiLoChoice, HiLoMove, HiLoStart};

use crate::coin::card_from_bytes;
use crate::{GameStatus, OutcomeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum HiLoStep {
    Drawn { previous: u8, card: u8, won: bool },
    CashedOut { card: u8 },
}

/// `Hi` wins on `next >= current`, `Lo` on `next <= current`; a tie wins both.
pub fn guess_wins(choice: HiLoChoice, current: u8, next: u8) -> bool {
    match choice {
        HiLoChoice::Hi => next >= current,
        HiLoChoice::Lo => next <= current,
        HiLoChoice::Cashout => false,
    }
}

#[derive(Clone, Debug)]
pub struct HiLoHand {
    current: u8,
    last_move: Option<u32>,
    status: GameStatus,
}

impl HiLoHand {
    pub fn new(start: &HiLoStart) -> Result<Self, OutcomeError> {
        if !(1..=13).contains(&start.starting_card) {
            return Err(OutcomeError::InvalidParameters(format!(
                "starting card {} is not a rank",
                start.starting_card
            )));
        }
        Ok(Self {
            current: start.starting_card,
            last_move: None,
            status: GameStatus::Playing,
        })
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn play(
        &mut self,
        mv: &HiLoMove,
        signature: &VerifiedSignature,
    ) -> Result<HiLoStep, OutcomeError> {
        self.play_bytes(mv, signature.as_bytes())
    }

    pub(crate) fn play_bytes(&mut self, mv: &HiLoMove, bytes: &[u8]) -> Result<HiLoStep, OutcomeError> {
        if self.status != GameStatus::Playing {
            return Err(OutcomeError::GameOver);
        }
        if let Some(last) = self.last_move {
            if mv.move_index <= last {
                return Err(OutcomeError::InvalidMove(format!(
                    "move {} after move {last}",
                    mv.move_index
                )));
            }
        }
        if mv.player_choice == HiLoChoice::Cashout {
            self.last_move = Some(mv.move_index);
            self.status = GameStatus::CashedOut;
            return Ok(HiLoStep::CashedOut { card: self.current });
        }
        let card = card_from_bytes(bytes)?;
        self.last_move = Some(mv.move_index);
        let previous = self.current;
        let won = guess_wins(mv.player_choice, previous, card);
        self.current = card;
        if !won {
            self.status = GameStatus::Busted;
        }
        Ok(HiLoStep::Drawn {
            previous,
            card,
            won,
        })
    }
}
