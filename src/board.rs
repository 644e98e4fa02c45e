use alloc::collections::VecDeque;
use core::ops::BitOr;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    Cell, CellCount, FlagOutcome, GameConfig, GridIndex, MineGenerator, MineLayout, Pos,
    RandomMineGenerator, Result, RevealOutcome, neighbors,
};

/// Lifecycle of a board.
///
/// Valid transitions:
/// - Uninitialized -> Active (first reveal places the mines)
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No mines on the board yet; the first reveal places them around itself.
    Uninitialized,
    /// Mines placed, game running.
    Active,
    /// Every safe cell revealed.
    Won,
    /// A mine was revealed.
    Lost,
}

impl GamePhase {
    pub const fn is_uninitialized(self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Mine placement is deferred until the first reveal, so the minefield is
/// either the generator still waiting for its safe cell, or the fixed layout.
#[derive(Clone, Debug)]
enum Minefield<G> {
    Deferred(G),
    Placed(MineLayout),
}

/// Minesweeper board: owns the grid, the mine layout, and the game phase.
///
/// All operations are synchronous and run to completion; out-of-bounds
/// coordinates and moves on a finished board are silent no-ops.
#[derive(Clone, Debug)]
pub struct Board<G: MineGenerator = RandomMineGenerator> {
    config: GameConfig,
    minefield: Minefield<G>,
    grid: Array2<Cell>,
    revealed: CellCount,
    flagged: CellCount,
    phase: GamePhase,
}

impl Board {
    /// Board with deferred uniform placement from `seed`.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_generator(config, RandomMineGenerator::from_seed(seed))
    }

    /// Board over an already fixed layout; starts `Active`.
    pub fn from_layout(layout: MineLayout) -> Self {
        let config = layout.game_config();
        Self {
            config,
            minefield: Minefield::Placed(layout),
            grid: Array2::default(config.size.to_index()),
            revealed: 0,
            flagged: 0,
            phase: GamePhase::Active,
        }
    }
}

impl<G: MineGenerator> Board<G> {
    pub fn with_generator(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            minefield: Minefield::Deferred(generator),
            grid: Array2::default(config.size.to_index()),
            revealed: 0,
            flagged: 0,
            phase: GamePhase::Uninitialized,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Pos {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn game_over(&self) -> bool {
        matches!(self.phase, GamePhase::Lost)
    }

    pub fn win(&self) -> bool {
        matches!(self.phase, GamePhase::Won)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged
    }

    /// How many mines have not been flagged yet; negative when overflagged.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged as isize)
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.grid[pos.to_index()]
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        let (cols, rows) = self.config.size;
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| ((col, row), self.cell_at((col, row)))))
    }

    pub fn is_inbounds(&self, pos: Pos) -> bool {
        self.config.contains(pos)
    }

    /// In-bounds neighbors of `pos`; empty for out-of-bounds input.
    pub fn neighbors(&self, pos: Pos) -> SmallVec<[Pos; 8]> {
        if !self.config.contains(pos) {
            return SmallVec::new();
        }
        neighbors(pos, self.config.size)
    }

    /// False while mines are unplaced; renderers use this after the game ends.
    pub fn has_mine_at(&self, pos: Pos) -> bool {
        self.config.contains(pos)
            && match &self.minefield {
                Minefield::Placed(layout) => layout.contains_mine(pos),
                Minefield::Deferred(_) => false,
            }
    }

    /// Reveal a cell. The first reveal of a game places the mines with this
    /// cell as the guaranteed-safe zone center and may fail with
    /// `InvalidConfiguration`; the board then stays `Uninitialized` and a
    /// reveal elsewhere may still succeed.
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome> {
        if !self.config.contains(pos) || self.phase.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }
        self.ensure_mines_placed(pos)?;
        Ok(self.reveal_cell(pos))
    }

    /// On a revealed cell whose flagged neighbors match its count, reveal
    /// all its neighbors; anywhere else this is a plain reveal.
    pub fn chord_reveal(&mut self, pos: Pos) -> Result<RevealOutcome> {
        if !self.config.contains(pos) || self.phase.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }
        self.ensure_mines_placed(pos)?;

        Ok(match self.grid[pos.to_index()] {
            Cell::Revealed(count) if count == self.flagged_neighbor_count(pos) => {
                neighbors(pos, self.config.size)
                    .into_iter()
                    .map(|neighbor| self.reveal_cell(neighbor))
                    .reduce(BitOr::bitor)
                    .unwrap_or(RevealOutcome::NoChange)
            }
            _ => self.reveal_cell(pos),
        })
    }

    pub fn is_chordable(&self, pos: Pos) -> bool {
        if !self.config.contains(pos) || self.phase.is_finished() {
            return false;
        }
        match self.grid[pos.to_index()] {
            Cell::Revealed(count) => count == self.flagged_neighbor_count(pos),
            _ => false,
        }
    }

    /// Toggle the flag on an unrevealed cell.
    pub fn toggle_flag(&mut self, pos: Pos) -> FlagOutcome {
        if !self.config.contains(pos) || self.phase.is_finished() {
            return FlagOutcome::NoChange;
        }
        match self.grid[pos.to_index()] {
            Cell::Hidden => {
                self.grid[pos.to_index()] = Cell::Flagged;
                self.flagged += 1;
                FlagOutcome::Changed
            }
            Cell::Flagged => {
                self.grid[pos.to_index()] = Cell::Hidden;
                self.flagged -= 1;
                FlagOutcome::Changed
            }
            _ => FlagOutcome::NoChange,
        }
    }

    fn ensure_mines_placed(&mut self, safe: Pos) -> Result<()> {
        match &mut self.minefield {
            Minefield::Deferred(generator) => {
                let layout = generator.generate(self.config, safe)?;
                log::debug!(
                    "placed {} mines on {:?} around safe cell {:?}",
                    layout.mine_count(),
                    self.config.size,
                    safe
                );
                self.minefield = Minefield::Placed(layout);
                self.phase = GamePhase::Active;
                Ok(())
            }
            Minefield::Placed(_) => Ok(()),
        }
    }

    fn mine_at(&self, pos: Pos) -> bool {
        match &self.minefield {
            Minefield::Placed(layout) => layout.contains_mine(pos),
            Minefield::Deferred(_) => false,
        }
    }

    fn adjacent_at(&self, pos: Pos) -> u8 {
        match &self.minefield {
            Minefield::Placed(layout) => layout.adjacent_count(pos),
            Minefield::Deferred(_) => 0,
        }
    }

    fn flagged_neighbor_count(&self, pos: Pos) -> u8 {
        neighbors(pos, self.config.size)
            .into_iter()
            .filter(|&neighbor| self.grid[neighbor.to_index()].is_flagged())
            .count() as u8
    }

    fn reveal_cell(&mut self, pos: Pos) -> RevealOutcome {
        match (self.grid[pos.to_index()], self.mine_at(pos)) {
            (Cell::Hidden, true) => {
                self.grid[pos.to_index()] = Cell::Exploded;
                self.revealed += 1;
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (Cell::Hidden, false) => {
                let count = self.adjacent_at(pos);
                self.grid[pos.to_index()] = Cell::Revealed(count);
                self.revealed += 1;
                log::debug!("revealed {:?}, adjacent mines: {}", pos, count);

                if count == 0 {
                    self.flood_from(pos);
                }

                if self.revealed == self.config.safe_cells() {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Safe
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Worklist flood fill over the zero-adjacency region reachable from
    /// `origin`, revealing its numbered border without expanding past it.
    fn flood_from(&mut self, origin: Pos) {
        let size = self.config.size;
        let mut visited: HashSet<Pos> = HashSet::new();
        visited.insert(origin);
        let mut to_visit: VecDeque<Pos> = neighbors(origin, size)
            .into_iter()
            .filter(|&pos| matches!(self.grid[pos.to_index()], Cell::Hidden))
            .collect();
        log::trace!("flood fill from {:?}, frontier: {:?}", origin, to_visit);

        while let Some(pos) = to_visit.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            // flagged cells and cells revealed earlier in this fill stay put
            if !matches!(self.grid[pos.to_index()], Cell::Hidden) {
                continue;
            }

            let count = self.adjacent_at(pos);
            self.grid[pos.to_index()] = Cell::Revealed(count);
            self.revealed += 1;
            log::trace!("flood revealed {:?}, adjacent mines: {}", pos, count);

            if count == 0 {
                to_visit.extend(
                    neighbors(pos, size)
                        .into_iter()
                        .filter(|&next| matches!(self.grid[next.to_index()], Cell::Hidden))
                        .filter(|next| !visited.contains(next)),
                );
            }
        }
    }

    /// Moves the game to its terminal phase and dresses the board: a loss
    /// shows every unflagged mine, a win flags the mines still hidden.
    fn end_game(&mut self, won: bool) {
        if self.phase.is_finished() {
            return;
        }
        self.phase = if won { GamePhase::Won } else { GamePhase::Lost };
        log::debug!("game ended, won: {}", won);

        let (cols, rows) = self.config.size;
        for col in 0..cols {
            for row in 0..rows {
                let pos = (col, row);
                if !self.mine_at(pos) {
                    continue;
                }
                match self.grid[pos.to_index()] {
                    Cell::Hidden if won => {
                        self.grid[pos.to_index()] = Cell::Flagged;
                        self.flagged += 1;
                    }
                    Cell::Hidden => self.grid[pos.to_index()] = Cell::Mine,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;

    fn board(size: Pos, mines: &[Pos]) -> Board {
        Board::from_layout(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    fn fresh(size: Pos, mines: CellCount, seed: u64) -> Board {
        Board::new(GameConfig::new(size, mines).unwrap(), seed)
    }

    #[test]
    fn fresh_board_starts_uninitialized() {
        let board = fresh((9, 9), 10, 1);

        assert_eq!(board.phase(), GamePhase::Uninitialized);
        assert_eq!(board.revealed_count(), 0);
        assert_eq!(board.flagged_count(), 0);
        assert!(!board.game_over());
        assert!(!board.win());
        assert!(board.iter_cells().all(|(_, cell)| cell == Cell::Hidden));
    }

    #[test]
    fn first_reveal_is_never_a_mine() {
        for seed in 0..10 {
            let mut board = fresh((9, 9), 10, seed);
            let outcome = board.reveal((4, 4)).unwrap();

            assert_ne!(outcome, RevealOutcome::HitMine);
            assert!(!board.game_over());
            assert!(!board.phase().is_uninitialized());
            assert!(!board.has_mine_at((4, 4)));
            for neighbor in board.neighbors((4, 4)) {
                assert!(!board.has_mine_at(neighbor));
            }

            let mine_cells = board
                .iter_cells()
                .filter(|&(pos, _)| board.has_mine_at(pos))
                .count();
            assert_eq!(mine_cells, 10);
        }
    }

    #[test]
    fn failed_placement_leaves_the_board_playable() {
        let mut board = fresh((3, 3), 1, 0);

        // center click forbids all nine cells, so the mine cannot fit
        assert_eq!(board.reveal((1, 1)), Err(GameError::InvalidConfiguration));
        assert_eq!(board.phase(), GamePhase::Uninitialized);
        assert_eq!(board.revealed_count(), 0);
        assert!(board.iter_cells().all(|(_, cell)| cell == Cell::Hidden));

        // a corner click leaves five candidate cells and succeeds
        assert!(board.reveal((0, 0)).is_ok());
        assert!(!board.phase().is_uninitialized());
    }

    #[test]
    fn revealing_a_mine_loses_and_shows_unflagged_mines() {
        let mut board = board((3, 3), &[(0, 0), (2, 0), (2, 2)]);
        board.toggle_flag((2, 2));

        let outcome = board.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert!(board.game_over());
        assert!(!board.win());
        assert_eq!(board.phase(), GamePhase::Lost);
        assert_eq!(board.cell_at((0, 0)), Cell::Exploded);
        assert_eq!(board.cell_at((2, 0)), Cell::Mine);
        // a correct flag survives the loss
        assert_eq!(board.cell_at((2, 2)), Cell::Flagged);
    }

    #[test]
    fn finished_board_ignores_further_moves() {
        let mut board = board((3, 3), &[(0, 0)]);
        board.reveal((0, 0)).unwrap();
        assert!(board.game_over());
        let revealed = board.revealed_count();

        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.toggle_flag((1, 1)), FlagOutcome::NoChange);
        assert_eq!(board.chord_reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.revealed_count(), revealed);
        assert!(board.game_over());
    }

    #[test]
    fn flood_fill_reveals_zero_region_and_its_border_only() {
        // a wall of mines at col 2 splits the board in two
        let wall = [(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)];
        let mut board = board((5, 5), &wall);

        let outcome = board.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Safe);
        assert_eq!(board.phase(), GamePhase::Active);
        assert_eq!(board.revealed_count(), 10);
        for row in 0..5 {
            assert_eq!(board.cell_at((0, row)), Cell::Revealed(0));
            assert!(matches!(board.cell_at((1, row)), Cell::Revealed(2..=3)));
            // the wall and the far side stay untouched
            assert_eq!(board.cell_at((2, row)), Cell::Hidden);
            assert_eq!(board.cell_at((3, row)), Cell::Hidden);
            assert_eq!(board.cell_at((4, row)), Cell::Hidden);
        }
        let revealed = board
            .iter_cells()
            .filter(|(_, cell)| cell.is_revealed())
            .count();
        assert_eq!(revealed, usize::from(board.revealed_count()));
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut board = board((3, 3), &[(2, 2)]);
        board.toggle_flag((1, 1));

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::Safe));
        assert_eq!(board.cell_at((1, 1)), Cell::Flagged);
        assert_eq!(board.revealed_count(), 7);
        assert!(!board.win());

        board.toggle_flag((1, 1));
        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::Won));
        assert!(board.win());
    }

    #[test]
    fn zero_mine_board_wins_on_the_first_reveal() {
        let mut board = fresh((4, 4), 0, 5);

        assert_eq!(board.reveal((2, 2)), Ok(RevealOutcome::Won));
        assert!(board.win());
        assert!(!board.game_over());
        assert_eq!(board.revealed_count(), 16);
        assert!(board.iter_cells().all(|(_, cell)| cell.is_revealed()));
    }

    #[test]
    fn winning_flags_the_remaining_mines() {
        let mut board = board((2, 1), &[(0, 0)]);

        assert_eq!(board.reveal((1, 0)), Ok(RevealOutcome::Won));
        assert_eq!(board.phase(), GamePhase::Won);
        assert_eq!(board.cell_at((0, 0)), Cell::Flagged);
        assert_eq!(board.flagged_count(), 1);
        assert_eq!(board.mines_left(), 0);
    }

    #[test]
    fn revealed_and_flagged_cells_cannot_be_revealed_again() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::Safe));
        assert_eq!(board.cell_at((1, 1)), Cell::Revealed(1));
        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.revealed_count(), 1);

        board.toggle_flag((2, 1));
        assert_eq!(board.reveal((2, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.cell_at((2, 1)), Cell::Flagged);
    }

    #[test]
    fn out_of_bounds_coordinates_are_silent_noops() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal((9, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.toggle_flag((0, 9)), FlagOutcome::NoChange);
        assert!(board.neighbors((9, 9)).is_empty());
        assert!(!board.is_inbounds((3, 0)));
        assert!(board.is_inbounds((2, 0)));
        assert!(!board.has_mine_at((9, 9)));
    }

    #[test]
    fn flag_toggling_tracks_counts() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.toggle_flag((0, 0)), FlagOutcome::Changed);
        assert_eq!(board.toggle_flag((0, 1)), FlagOutcome::Changed);
        assert_eq!(board.flagged_count(), 2);
        assert_eq!(board.mines_left(), -1);

        assert_eq!(board.toggle_flag((0, 0)), FlagOutcome::Changed);
        assert_eq!(board.flagged_count(), 1);
        assert_eq!(board.cell_at((0, 0)), Cell::Hidden);

        board.reveal((1, 1)).unwrap();
        assert_eq!(board.toggle_flag((1, 1)), FlagOutcome::NoChange);
    }

    #[test]
    fn first_reveal_on_a_flagged_cell_places_mines_but_reveals_nothing() {
        let mut board = fresh((4, 4), 2, 11);
        board.toggle_flag((1, 1));

        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(board.phase(), GamePhase::Active);
        assert_eq!(board.cell_at((1, 1)), Cell::Flagged);
        assert_eq!(board.revealed_count(), 0);
    }

    #[test]
    fn chord_reveal_opens_neighbors_when_flags_match() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);

        board.reveal((1, 1)).unwrap();
        assert_eq!(board.cell_at((1, 1)), Cell::Revealed(2));
        assert!(!board.is_chordable((1, 1)));

        board.toggle_flag((0, 1));
        board.toggle_flag((2, 1));
        assert!(board.is_chordable((1, 1)));

        assert_eq!(board.chord_reveal((1, 1)), Ok(RevealOutcome::Won));
        assert_eq!(board.cell_at((1, 0)), Cell::Revealed(2));
        assert_eq!(board.cell_at((1, 2)), Cell::Revealed(2));
        assert_eq!(board.cell_at((0, 0)), Cell::Revealed(1));
    }

    #[test]
    fn chord_reveal_with_a_wrong_flag_detonates() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1));
        board.toggle_flag((1, 0));

        assert_eq!(board.chord_reveal((1, 1)), Ok(RevealOutcome::HitMine));
        assert!(board.game_over());
        assert_eq!(board.cell_at((2, 1)), Cell::Exploded);
        assert_eq!(board.cell_at((0, 1)), Cell::Flagged);
        assert_eq!(board.cell_at((1, 0)), Cell::Flagged);
    }

    #[test]
    fn chord_reveal_on_an_unrevealed_cell_is_a_plain_reveal() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.chord_reveal((1, 1)), Ok(RevealOutcome::Safe));
        assert_eq!(board.cell_at((1, 1)), Cell::Revealed(1));
    }

    struct FixedLayout(MineLayout);

    impl MineGenerator for FixedLayout {
        fn generate(&mut self, _config: GameConfig, _safe: Pos) -> Result<MineLayout> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn boards_accept_injected_generators() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let config = GameConfig::new((2, 2), 1).unwrap();
        let mut board = Board::with_generator(config, FixedLayout(layout));

        assert_eq!(board.phase(), GamePhase::Uninitialized);
        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::Safe));
        assert_eq!(board.cell_at((1, 1)), Cell::Revealed(1));
        assert!(board.has_mine_at((0, 0)));
    }
}
