//! Tower: climb `levels` rows of `choices_per_level` doors, some of them mined.

use std::collections::BTreeSet;

use serde::Serialize;
use vx_crypto::VerifiedSignature;
use vx_types::TowerStart;

use crate::sampling::sample_from_bytes;
use crate::{GameStatus, OutcomeError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum TowerStep {
    /// Survived `level` (0-based); `topped` once the last level is cleared.
    Safe { level: u32, mines: Vec<u32>, topped: bool },
    Mine { level: u32, mines: Vec<u32> },
}

#[derive(Clone, Debug)]
pub struct TowerClimb {
    levels: u32,
    choices: u32,
    mines_per_level: u32,
    level: u32,
    status: GameStatus,
}

impl TowerClimb {
    pub fn new(start: &TowerStart) -> Result<Self, OutcomeError> {
        if start.levels == 0
            || start.mines_per_level == 0
            || start.mines_per_level >= start.choices_per_level
        {
            return Err(OutcomeError::InvalidParameters(format!(
                "{} levels of {} choices with {} mines each",
                start.levels, start.choices_per_level, start.mines_per_level
            )));
        }
        Ok(Self {
            levels: start.levels,
            choices: start.choices_per_level,
            mines_per_level: start.mines_per_level,
            level: 0,
            status: GameStatus::Playing,
        })
    }

    /// Current level, 0-based.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn climb(
        &mut self,
        choice: u32,
        signature: &VerifiedSignature,
    ) -> Result<TowerStep, OutcomeError> {
        self.climb_bytes(choice, signature.as_bytes())
    }

    /// Cash out and decode the mines of the level the player stopped at.
    pub fn cashout(&mut self, signature: &VerifiedSignature) -> Result<Vec<u32>, OutcomeError> {
        self.cashout_bytes(signature.as_bytes())
    }

    pub(crate) fn climb_bytes(&mut self, choice: u32, bytes: &[u8]) -> Result<TowerStep, OutcomeError> {
        self.ensure_playing()?;
        if choice >= self.choices {
            return Err(OutcomeError::InvalidMove(format!(
                "choice {choice} on a level of {}",
                self.choices
            )));
        }
        let level = self.level;
        let mines = self.level_mines(bytes)?;
        if mines.contains(&choice) {
            self.status = GameStatus::Busted;
            return Ok(TowerStep::Mine { level, mines });
        }
        self.level += 1;
        let topped = self.level == self.levels;
        if topped {
            self.status = GameStatus::CashedOut;
        }
        Ok(TowerStep::Safe {
            level,
            mines,
            topped,
        })
    }

    pub(crate) fn cashout_bytes(&mut self, bytes: &[u8]) -> Result<Vec<u32>, OutcomeError> {
        self.ensure_playing()?;
        let mines = self.level_mines(bytes)?;
        self.status = GameStatus::CashedOut;
        Ok(mines)
    }

    fn level_mines(&self, bytes: &[u8]) -> Result<Vec<u32>, OutcomeError> {
        sample_from_bytes(bytes, self.choices, self.mines_per_level, &BTreeSet::new())
    }

    fn ensure_playing(&self) -> Result<(), OutcomeError> {
        match self.status {
            GameStatus::Playing => Ok(()),
            _ => Err(OutcomeError::GameOver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vx_crypto::sha256_multi;
    use vx_types::{Amount, Currency};

    fn start(levels: u32, choices: u32, mines: u32) -> TowerStart {
        TowerStart {
            amount: Amount::new(Currency::Eth, 10),
            house_edge_bps: 100,
            levels,
            choices_per_level: choices,
            mines_per_level: mines,
        }
    }

    fn sig(i: u32) -> [u8; 32] {
        sha256_multi(&[b"tower", &i.to_be_bytes()])
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(TowerClimb::new(&start(0, 3, 1)).is_err());
        assert!(TowerClimb::new(&start(5, 3, 3)).is_err());
        assert!(TowerClimb::new(&start(5, 3, 0)).is_err());
    }

    #[test]
    fn climbing_to_the_top_ends_the_game() {
        // pick a safe door each time by decoding first
        let mut tower = TowerClimb::new(&start(4, 4, 1)).unwrap();
        for i in 0..4u32 {
            let mines = tower.level_mines(&sig(i)).unwrap();
            let safe = (0..4).find(|c| !mines.contains(c)).unwrap();
            let step = tower.climb_bytes(safe, &sig(i)).unwrap();
            assert_eq!(
                step,
                TowerStep::Safe {
                    level: i,
                    mines,
                    topped: i == 3
                }
            );
        }
        assert_eq!(tower.status(), GameStatus::CashedOut);
        assert_eq!(tower.climb_bytes(0, &sig(9)), Err(OutcomeError::GameOver));
    }

    #[test]
    fn stepping_on_a_mine_busts() {
        let mut tower = TowerClimb::new(&start(4, 3, 2)).unwrap();
        let mines = tower.level_mines(&sig(0)).unwrap();
        assert_eq!(mines.len(), 2);
        let step = tower.climb_bytes(mines[0], &sig(0)).unwrap();
        assert!(matches!(step, TowerStep::Mine { level: 0, .. }));
        assert_eq!(tower.status(), GameStatus::Busted);
        assert_eq!(tower.level(), 0);
    }

    #[test]
    fn cashout_reveals_current_level() {
        let mut tower = TowerClimb::new(&start(4, 3, 1)).unwrap();
        let mines = tower.cashout_bytes(&sig(5)).unwrap();
        assert_eq!(mines.len(), 1);
        assert!(mines[0] < 3);
        assert_eq!(tower.status(), GameStatus::CashedOut);
    }

    #[test]
    fn choice_out_of_range() {
        let mut tower = TowerClimb::new(&start(2, 3, 1)).unwrap();
        assert!(matches!(
            tower.climb_bytes(3, &sig(0)),
            Err(OutcomeError::InvalidMove(_))
        ));
    }
}
