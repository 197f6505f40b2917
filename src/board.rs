//! Board state: tile grid, mine placement, and the reveal/flag mutators every
//! inference engine reads through.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// A `(row, col)` pair. Used as the coordinate type throughout the crate.
pub type Coord = (usize, usize);

/// The sentinel value written into a revealed tile that turned out to be a mine.
pub const MINE_SENTINEL: u8 = 9;

/// The state of a single grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Not yet acted on by the solver.
    Unknown,
    /// Marked as a mine by the solver. May be wrong.
    Flagged,
    /// Revealed, holding an adjacent mine count in `0..=8`, or [`MINE_SENTINEL`]
    /// if this cell was a mine.
    Revealed(u8),
}

impl Tile {
    fn is_mine_hit(self) -> bool {
        matches!(self, Tile::Revealed(MINE_SENTINEL))
    }
}

/// The one condition the board cannot route around with a return value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BoardError {
    /// Deferred mine placement could not find enough cells outside the
    /// first-click safe zone, even after relaxing it to just the clicked cell.
    #[error(
        "cannot place {total_mines} mines on a {rows}x{cols} board while preserving first-click safety"
    )]
    MineDensityInfeasible {
        total_mines: usize,
        rows: usize,
        cols: usize,
    },
}

/// Internal representation of a Minesweeper board.
pub struct Board {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
    mines: HashSet<Coord>,
    revealed_count: usize,
    flagged_count: usize,
    game_over: bool,
    hit_mine_at: Option<Coord>,
    total_mines: Option<usize>,
    rng: StdRng,
    mines_initialized: bool,
    first_reveal_done: bool,
}

impl Board {
    fn empty(rows: usize, cols: usize, seed: u64) -> Self {
        Board {
            rows,
            cols,
            tiles: vec![Tile::Unknown; rows * cols],
            mines: HashSet::new(),
            revealed_count: 0,
            flagged_count: 0,
            game_over: false,
            hit_mine_at: None,
            total_mines: None,
            rng: StdRng::seed_from_u64(seed),
            mines_initialized: false,
            first_reveal_done: false,
        }
    }

    /// Build a board with mines already known (e.g. a fixed test layout).
    /// No deferred placement or first-click relocation ever triggers.
    pub fn with_mines(rows: usize, cols: usize, mines: HashSet<Coord>) -> Self {
        let mut board = Self::empty(rows, cols, 0);
        board.total_mines = Some(mines.len());
        board.mines = mines;
        board.mines_initialized = true;
        board
    }

    /// Build a board that places `total_mines` mines lazily, on the first
    /// `reveal`, keeping the clicked cell's safe zone mine-free. `seed` drives
    /// both mine placement and any later relocation.
    pub fn with_deferred_mines(rows: usize, cols: usize, total_mines: usize, seed: u64) -> Self {
        let mut board = Self::empty(rows, cols, seed);
        board.total_mines = Some(total_mines);
        board.mines_initialized = total_mines == 0;
        board
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    pub(crate) fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.rows && j < self.cols
    }

    /// The up-to-8 in-bounds neighbors of `(i, j)`, diagonals included.
    pub fn neighbors(&self, i: usize, j: usize) -> Vec<Coord> {
        let mut out = Vec::with_capacity(8);
        for di in [-1isize, 0, 1] {
            for dj in [-1isize, 0, 1] {
                if di == 0 && dj == 0 {
                    continue;
                }
                let ni = i as isize + di;
                let nj = j as isize + dj;
                if ni >= 0 && nj >= 0 {
                    let (ni, nj) = (ni as usize, nj as usize);
                    if self.in_bounds(ni, nj) {
                        out.push((ni, nj));
                    }
                }
            }
        }
        out
    }

    fn safe_zone(&self, i: usize, j: usize) -> HashSet<Coord> {
        let mut zone: HashSet<Coord> = self.neighbors(i, j).into_iter().collect();
        zone.insert((i, j));
        zone
    }

    fn all_cells(&self) -> Vec<Coord> {
        (0..self.rows)
            .flat_map(|i| (0..self.cols).map(move |j| (i, j)))
            .collect()
    }

    fn initialize_mines(&mut self, i: usize, j: usize) -> Result<(), BoardError> {
        if self.mines_initialized {
            return Ok(());
        }
        let total_mines = self.total_mines.unwrap_or(0);

        let mut safe_zone = self.safe_zone(i, j);
        let mut candidates: Vec<Coord> = self
            .all_cells()
            .into_iter()
            .filter(|c| !safe_zone.contains(c))
            .collect();

        if candidates.len() < total_mines {
            safe_zone = HashSet::from([(i, j)]);
            candidates = self
                .all_cells()
                .into_iter()
                .filter(|c| !safe_zone.contains(c))
                .collect();
        }

        if candidates.len() < total_mines {
            return Err(BoardError::MineDensityInfeasible {
                total_mines,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let picks = index::sample(&mut self.rng, candidates.len(), total_mines);
        self.mines = picks.iter().map(|idx| candidates[idx]).collect();
        self.mines_initialized = true;
        log::debug!(
            "placed {} mines on {}x{} board, safe zone size {}",
            total_mines,
            self.rows,
            self.cols,
            safe_zone.len()
        );
        Ok(())
    }

    fn relocate_first_click_bombs(&mut self, i: usize, j: usize) -> Result<(), BoardError> {
        let mut safe_zone = self.safe_zone(i, j);
        let mut bombs_in_zone: HashSet<Coord> =
            self.mines.intersection(&safe_zone).copied().collect();
        if bombs_in_zone.is_empty() {
            return Ok(());
        }

        let candidates_for = |board: &Board, zone: &HashSet<Coord>| -> Vec<Coord> {
            board
                .all_cells()
                .into_iter()
                .filter(|c| !board.mines.contains(c) && !zone.contains(c))
                .collect()
        };

        let mut candidates = candidates_for(self, &safe_zone);
        if candidates.len() < bombs_in_zone.len() {
            safe_zone = HashSet::from([(i, j)]);
            bombs_in_zone = self.mines.intersection(&safe_zone).copied().collect();
            candidates = candidates_for(self, &safe_zone);
        }

        if candidates.len() < bombs_in_zone.len() {
            let total_mines = self.mines.len();
            return Err(BoardError::MineDensityInfeasible {
                total_mines,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let picks = index::sample(&mut self.rng, candidates.len(), bombs_in_zone.len());
        for &b in &bombs_in_zone {
            self.mines.remove(&b);
        }
        for idx in picks.iter() {
            self.mines.insert(candidates[idx]);
        }
        log::debug!(
            "relocated {} first-click mine(s) away from ({i}, {j})",
            bombs_in_zone.len()
        );
        Ok(())
    }

    fn count_adjacent_mines(&self, i: usize, j: usize) -> u8 {
        self.neighbors(i, j)
            .iter()
            .filter(|c| self.mines.contains(c))
            .count() as u8
    }

    /// Reveal `(i, j)`. Returns `Ok(false)` without mutation for an
    /// out-of-bounds or already-acted-on cell. The only raising condition is
    /// mine-density infeasibility, which can only occur on a board's first
    /// reveal.
    pub fn reveal(&mut self, i: usize, j: usize) -> Result<bool, BoardError> {
        if !self.in_bounds(i, j) {
            return Ok(false);
        }
        if self.tiles[self.index(i, j)] != Tile::Unknown {
            return Ok(false);
        }

        let first_action = !self.first_reveal_done;

        if !self.mines_initialized {
            self.initialize_mines(i, j)?;
        }
        if first_action && self.mines.contains(&(i, j)) {
            self.relocate_first_click_bombs(i, j)?;
        }

        let idx = self.index(i, j);
        if self.mines.contains(&(i, j)) {
            self.tiles[idx] = Tile::Revealed(MINE_SENTINEL);
            self.revealed_count += 1;
            self.game_over = true;
            self.hit_mine_at = Some((i, j));
            self.first_reveal_done = true;
            return Ok(true);
        }

        let count = self.count_adjacent_mines(i, j);
        self.tiles[idx] = Tile::Revealed(count);
        self.revealed_count += 1;
        self.first_reveal_done = true;
        Ok(true)
    }

    /// Transition UNKNOWN -> FLAGGED. Returns whether the transition happened.
    pub fn flag(&mut self, i: usize, j: usize) -> bool {
        if !self.in_bounds(i, j) {
            return false;
        }
        let idx = self.index(i, j);
        if self.tiles[idx] != Tile::Unknown {
            return false;
        }
        self.tiles[idx] = Tile::Flagged;
        self.flagged_count += 1;
        true
    }

    /// Transition FLAGGED -> UNKNOWN. Returns whether the transition happened.
    pub fn unflag(&mut self, i: usize, j: usize) -> bool {
        if !self.in_bounds(i, j) {
            return false;
        }
        let idx = self.index(i, j);
        if self.tiles[idx] != Tile::Flagged {
            return false;
        }
        self.tiles[idx] = Tile::Unknown;
        self.flagged_count -= 1;
        true
    }

    /// The tile at `(i, j)`, or [`Tile::Unknown`] when out of bounds.
    pub fn get_tile(&self, i: usize, j: usize) -> Tile {
        if !self.in_bounds(i, j) {
            return Tile::Unknown;
        }
        self.tiles[self.index(i, j)]
    }

    pub fn is_revealed(&self, i: usize, j: usize) -> bool {
        matches!(self.get_tile(i, j), Tile::Revealed(_))
    }

    pub fn is_flagged(&self, i: usize, j: usize) -> bool {
        matches!(self.get_tile(i, j), Tile::Flagged)
    }

    pub fn is_unknown(&self, i: usize, j: usize) -> bool {
        matches!(self.get_tile(i, j), Tile::Unknown)
    }

    pub fn revealed_cells(&self) -> HashSet<Coord> {
        (0..self.rows)
            .flat_map(|i| (0..self.cols).map(move |j| (i, j)))
            .filter(|&(i, j)| self.is_revealed(i, j))
            .collect()
    }

    pub fn unknown_cells(&self) -> HashSet<Coord> {
        (0..self.rows)
            .flat_map(|i| (0..self.cols).map(move |j| (i, j)))
            .filter(|&(i, j)| self.is_unknown(i, j))
            .collect()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged_count
    }

    pub fn total_mines(&self) -> Option<usize> {
        self.total_mines
    }

    pub fn remaining_mines(&self) -> Option<usize> {
        self.total_mines
            .map(|total| total.saturating_sub(self.flagged_count))
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn hit_mine_at(&self) -> Option<Coord> {
        self.hit_mine_at
    }

    pub fn is_finished(&self) -> bool {
        !self.game_over && self.revealed_count + self.mines.len() == self.rows * self.cols
    }

    /// Ground-truth mine positions. Exposed for tests and for callers (such
    /// as a board generator) that construct boards from known layouts; the
    /// solver itself never reads this — it only ever sees `Tile`s.
    pub fn mines(&self) -> &HashSet<Coord> {
        &self.mines
    }

    fn split_row(line: &str) -> Vec<char> {
        if line.chars().any(|c| c.is_whitespace()) {
            line.split_whitespace()
                .filter_map(|tok| tok.chars().next())
                .collect()
        } else {
            line.chars().collect()
        }
    }

    /// Parse an ASCII board description (see the board-file-format section of
    /// the crate's design notes). Revealed numbers populate the board
    /// directly, without recomputing from the mine set.
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Board> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse an ASCII board description from an in-memory string.
    pub fn parse(text: &str) -> Board {
        let lines: Vec<&str> = text.lines().map(str::trim_end).filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            return Board::empty(0, 0, 0);
        }

        let header_tokens: Vec<&str> = lines[0].split_whitespace().collect();
        let header_is_numeric = header_tokens
            .first()
            .is_some_and(|tok| tok.parse::<usize>().is_ok());

        let (rows, cols, header_mines, body_start) = if header_is_numeric {
            let rows: usize = header_tokens[0].parse().unwrap_or(0);
            let cols: usize = header_tokens
                .get(1)
                .and_then(|t| t.parse().ok())
                .unwrap_or(0);
            let mines: Option<usize> = header_tokens.get(2).and_then(|t| t.parse().ok());
            (rows, cols, mines, 1)
        } else {
            let body = &lines[..];
            let rows = body.len();
            let cols = body
                .iter()
                .map(|l| Self::split_row(l).len())
                .max()
                .unwrap_or(0);
            (rows, cols, None, 0)
        };

        let mut board = Board::empty(rows, cols, 0);
        let mut mines: HashSet<Coord> = HashSet::new();

        for (i, line) in lines[body_start..].iter().enumerate() {
            if i >= rows {
                break;
            }
            for (j, ch) in Self::split_row(line).into_iter().enumerate() {
                if j >= cols {
                    break;
                }
                match ch {
                    '*' | 'M' | 'm' => {
                        mines.insert((i, j));
                    }
                    '0'..='8' => {
                        let value = ch.to_digit(10).unwrap() as u8;
                        let idx = board.index(i, j);
                        board.tiles[idx] = Tile::Revealed(value);
                        board.revealed_count += 1;
                    }
                    _ => {}
                }
            }
        }

        board.total_mines = Some(header_mines.unwrap_or(mines.len()));
        board.mines = mines;
        board.mines_initialized = true;
        board.first_reveal_done = board.revealed_count > 0;
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_respects_bounds() {
        let board = Board::with_mines(3, 3, HashSet::new());
        let corners = board.neighbors(0, 0);
        assert_eq!(corners.len(), 3);
        let center = board.neighbors(1, 1);
        assert_eq!(center.len(), 8);
    }

    #[test]
    fn reveal_out_of_bounds_is_noop() {
        let mut board = Board::with_mines(2, 2, HashSet::new());
        assert_eq!(board.reveal(5, 5).unwrap(), false);
        assert_eq!(board.revealed_cells().len(), 0);
    }

    #[test]
    fn reveal_redundant_transition_rejected() {
        let mut board = Board::with_mines(2, 2, HashSet::new());
        assert!(board.reveal(0, 0).unwrap());
        assert_eq!(board.reveal(0, 0).unwrap(), false);
        assert!(!board.flag(0, 0));
    }

    #[test]
    fn flag_unflag_round_trip() {
        let mut board = Board::with_mines(2, 2, HashSet::new());
        assert!(board.flag(0, 0));
        assert!(board.is_flagged(0, 0));
        assert_eq!(board.flagged_count(), 1);
        assert!(board.unflag(0, 0));
        assert!(board.is_unknown(0, 0));
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn revealing_a_mine_sets_game_over() {
        let mut board = Board::with_mines(2, 2, HashSet::from([(0, 0)]));
        // Relocation only fires on the very first reveal with first-click
        // safety; force a second cell first so (0,0) stays a real mine hit.
        board.reveal(1, 1).unwrap();
        let revealed = board.reveal(0, 0).unwrap();
        assert!(revealed);
        assert!(board.game_over());
        assert_eq!(board.hit_mine_at(), Some((0, 0)));
        assert_eq!(board.get_tile(0, 0), Tile::Revealed(MINE_SENTINEL));
    }

    #[test]
    fn first_click_never_hits_a_mine() {
        for seed in 0..20u64 {
            let mut board = Board::with_deferred_mines(5, 5, 5, seed);
            board.reveal(2, 2).unwrap();
            assert!(!board.game_over());
        }
    }

    #[test]
    fn first_click_yields_zero_when_density_allows() {
        let mut board = Board::with_deferred_mines(6, 6, 3, 42);
        board.reveal(3, 3).unwrap();
        assert_eq!(board.get_tile(3, 3), Tile::Revealed(0));
    }

    #[test]
    fn deferred_placement_fails_when_density_infeasible() {
        // 2x2 board, first click safe zone is the whole board; 1 mine cannot
        // be placed anywhere outside it even under relaxation... unless we
        // force relaxation to fail entirely with more mines than cells.
        let mut board = Board::with_deferred_mines(1, 1, 1, 0);
        let err = board.reveal(0, 0).unwrap_err();
        matches!(err, BoardError::MineDensityInfeasible { .. });
    }

    #[test]
    fn remaining_mines_tracks_flags() {
        let board = Board::with_mines(3, 3, HashSet::from([(0, 0), (0, 1)]));
        assert_eq!(board.remaining_mines(), Some(2));
    }

    #[test]
    fn is_finished_true_only_when_all_safe_cells_revealed() {
        let mut board = Board::with_mines(1, 2, HashSet::from([(0, 1)]));
        assert!(!board.is_finished());
        board.reveal(0, 0).unwrap();
        assert!(board.is_finished());
    }

    #[test]
    fn load_from_file_concatenated_format() {
        let text = "3 3\n1.2\n...\n.*.\n";
        let board = Board::parse(text);
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cols(), 3);
        assert_eq!(board.get_tile(0, 0), Tile::Revealed(1));
        assert_eq!(board.get_tile(0, 2), Tile::Revealed(2));
        assert!(board.is_unknown(0, 1));
        assert!(board.mines().contains(&(2, 1)));
    }

    #[test]
    fn load_from_file_whitespace_format() {
        let text = "2 2\n1 .\n. *\n";
        let board = Board::parse(text);
        assert_eq!(board.get_tile(0, 0), Tile::Revealed(1));
        assert!(board.mines().contains(&(1, 1)));
    }

    #[test]
    fn load_from_file_infers_dimensions_without_header() {
        let text = "..\n.1\n";
        let board = Board::parse(text);
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 2);
    }

    #[test]
    fn load_from_file_empty_infers_zero_dimensions() {
        let board = Board::parse("");
        assert_eq!(board.rows(), 0);
        assert_eq!(board.cols(), 0);
    }

    #[test]
    fn load_from_file_tolerates_short_rows() {
        let text = "2 3\n1\n..\n";
        let board = Board::parse(text);
        assert!(board.is_unknown(0, 1));
        assert!(board.is_unknown(0, 2));
        assert!(board.is_unknown(1, 2));
    }
}
