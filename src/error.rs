use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Mine count cannot be satisfied by the board size or by the free
    /// cells left outside the first-click safe zone.
    #[error("mine count incompatible with board configuration")]
    InvalidConfiguration,
    /// Coordinates outside the board passed to layout construction.
    #[error("coordinates outside the board")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;
