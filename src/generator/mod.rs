use crate::{GameConfig, MineLayout, Pos, Result};

pub use random::*;

mod random;

/// Mine-placement strategy, injected into a board so games can run against
/// seeded, deterministic, or hand-built sources.
pub trait MineGenerator {
    /// Produces a layout for `config` where `safe` and its in-bounds
    /// neighbors carry no mine. Fails with `InvalidConfiguration` when the
    /// mine count does not fit outside that zone; implementations must not
    /// return partial layouts.
    fn generate(&mut self, config: GameConfig, safe: Pos) -> Result<MineLayout>;
}
