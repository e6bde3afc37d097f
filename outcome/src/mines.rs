//! Mines: a grid of `cells` hiding `mines`, revealed one pick at a time.
//!
//! Every move has its own signature. The layout for a move is sampled over
//! the cells not yet revealed safe, so a decoded mine can never land on a
//! cell the player already cleared.

use std::collections::BTreeSet;

use serde::Serialize;
use vx_crypto::VerifiedSignature;
use vx_types::MinesStart;

use crate::sampling::sample_from_bytes;
use crate::{GameStatus, OutcomeError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum MinesStep {
    /// The picked cell was safe. `cleared` is set once every safe cell is found.
    Safe { cell: u32, revealed: u32, cleared: bool },
    /// The picked cell held a mine; `layout` is the decoded mine set.
    Mine { cell: u32, layout: Vec<u32> },
}

#[derive(Clone, Debug)]
pub struct MinesBoard {
    cells: u32,
    mines: u32,
    revealed: BTreeSet<u32>,
    status: GameStatus,
}

impl MinesBoard {
    pub fn new(start: &MinesStart) -> Result<Self, OutcomeError> {
        if start.mines == 0 || start.mines >= start.cells {
            return Err(OutcomeError::InvalidParameters(format!(
                "{} mines on {} cells",
                start.mines, start.cells
            )));
        }
        Ok(Self {
            cells: start.cells,
            mines: start.mines,
            revealed: BTreeSet::new(),
            status: GameStatus::Playing,
        })
    }

    pub fn cells(&self) -> u32 {
        self.cells
    }

    pub fn mines(&self) -> u32 {
        self.mines
    }

    pub fn revealed(&self) -> &BTreeSet<u32> {
        &self.revealed
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Open `cell` using this move's verified signature.
    pub fn reveal(
        &mut self,
        cell: u32,
        signature: &VerifiedSignature,
    ) -> Result<MinesStep, OutcomeError> {
        self.reveal_bytes(cell, signature.as_bytes())
    }

    /// Cash out and decode where the mines were: the rest of the board is
    /// filled from the cashout signature.
    pub fn cashout(&mut self, signature: &VerifiedSignature) -> Result<Vec<u32>, OutcomeError> {
        self.cashout_bytes(signature.as_bytes())
    }

    pub(crate) fn reveal_bytes(&mut self, cell: u32, bytes: &[u8]) -> Result<MinesStep, OutcomeError> {
        self.ensure_playing()?;
        if cell >= self.cells {
            return Err(OutcomeError::InvalidMove(format!(
                "cell {cell} outside a {}-cell grid",
                self.cells
            )));
        }
        if self.revealed.contains(&cell) {
            return Err(OutcomeError::InvalidMove(format!("cell {cell} already revealed")));
        }
        let layout = sample_from_bytes(bytes, self.cells, self.mines, &self.revealed)?;
        if layout.contains(&cell) {
            self.status = GameStatus::Busted;
            return Ok(MinesStep::Mine { cell, layout });
        }
        self.revealed.insert(cell);
        let revealed = self.revealed.len() as u32;
        let cleared = revealed == self.cells - self.mines;
        if cleared {
            self.status = GameStatus::CashedOut;
        }
        Ok(MinesStep::Safe {
            cell,
            revealed,
            cleared,
        })
    }

    pub(crate) fn cashout_bytes(&mut self, bytes: &[u8]) -> Result<Vec<u32>, OutcomeError> {
        self.ensure_playing()?;
        let layout = sample_from_bytes(bytes, self.cells, self.mines, &self.revealed)?;
        self.status = GameStatus::CashedOut;
        Ok(layout)
    }

    fn ensure_playing(&self) -> Result<(), OutcomeError> {
        match self.status {
            GameStatus::Playing => Ok(()),
            _ => Err(OutcomeError::GameOver),
        }
    }
}
