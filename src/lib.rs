#![no_std]

extern crate alloc;

use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod types;

/// Board dimensions and target mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Pos,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Pos, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates that the board is non-empty and the mines fit on it. The
    /// tighter safe-zone bound depends on the first click and is enforced
    /// at placement time.
    pub fn new(size: Pos, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 || mines > cell_product(size.0, size.1) {
            return Err(GameError::InvalidConfiguration);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_product(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.0 < self.size.0 && pos.1 < self.size.1
    }
}

/// Where the mines are. Immutable once built: the mask is fixed first, then
/// adjacency counts are derived for the whole board in a second pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    size: Pos,
    mines: Array2<bool>,
    adjacent: Array2<u8>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mines: Array2<bool>) -> Result<Self> {
        let dim = mines.dim();
        let size: Pos = (
            dim.0.try_into().map_err(|_| GameError::InvalidCoords)?,
            dim.1.try_into().map_err(|_| GameError::InvalidCoords)?,
        );

        let mine_count = mines.iter().filter(|&&is_mine| is_mine).count() as CellCount;

        let mut adjacent: Array2<u8> = Array2::default(dim);
        for col in 0..size.0 {
            for row in 0..size.1 {
                let pos = (col, row);
                if mines[pos.to_index()] {
                    continue;
                }
                adjacent[pos.to_index()] = neighbors(pos, size)
                    .into_iter()
                    .filter(|&neighbor| mines[neighbor.to_index()])
                    .count() as u8;
            }
        }

        Ok(Self {
            size,
            mines,
            adjacent,
            mine_count,
        })
    }

    pub fn from_mine_coords(size: Pos, mine_coords: &[Pos]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_index());

        for &pos in mine_coords {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mines[pos.to_index()] = true;
        }

        Self::from_mine_mask(mines)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size,
            mines: self.mine_count,
        }
    }

    pub fn size(&self) -> Pos {
        self.size
    }

    pub fn total_cells(&self) -> CellCount {
        cell_product(self.size.0, self.size.1)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains_mine(&self, pos: Pos) -> bool {
        self.mines[pos.to_index()]
    }

    /// Number of mines among the neighbors of `pos`; 0 for mine cells.
    pub fn adjacent_count(&self, pos: Pos) -> u8 {
        self.adjacent[pos.to_index()]
    }
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Outcome of revealing one or more cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Safe,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges outcomes when several cells are revealed by one action.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Safe, _) | (_, Safe) => Safe,
            (NoChange, NoChange) => NoChange,
        }
    }
}
