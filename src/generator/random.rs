use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::{SeedableRng, seq::index};
use smallvec::SmallVec;

use super::MineGenerator;
use crate::{GameConfig, GameError, MineLayout, Pos, Result, neighbors};

/// Uniform placement over every cell outside the first-click safe zone.
/// Seeded rather than wired to a global generator, so identical seeds give
/// identical layouts.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, safe: Pos) -> Result<MineLayout> {
        let mut forbidden: SmallVec<[Pos; 9]> = SmallVec::new();
        forbidden.push(safe);
        forbidden.extend(neighbors(safe, config.size));

        let (cols, rows) = config.size;
        let pool: Vec<Pos> = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .filter(|pos| !forbidden.contains(pos))
            .collect();

        if usize::from(config.mines) > pool.len() {
            return Err(GameError::InvalidConfiguration);
        }

        let picked: Vec<Pos> = index::sample(&mut self.rng, pool.len(), config.mines.into())
            .into_iter()
            .map(|i| pool[i])
            .collect();

        MineLayout::from_mine_coords(config.size, &picked)
    }
}
