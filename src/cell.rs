use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Not yet revealed.
    Hidden,
    /// Revealed safe cell with its adjacent-mine count (0..=8).
    Revealed(u8),
    /// Marked by the player as a suspected mine.
    Flagged,
    /// Mine shown after the game is lost.
    Mine,
    /// The mine that ended the game.
    Exploded,
}

impl Cell {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine | Self::Exploded)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    /// Adjacent-mine count for a revealed safe cell.
    pub const fn adjacent(self) -> Option<u8> {
        match self {
            Self::Revealed(count) => Some(count),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}
