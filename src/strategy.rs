//! Strategy coordinator: the fixed-priority decision chain that ties the
//! inference engines together and translates their output into board
//! mutations.

use crate::board::{Board, BoardError, Coord, Tile};
use crate::{csp, expansion, montecarlo, probability, sat};

/// Which flood-fill traversal `solve_step` dispatches to after revealing a
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionKind {
    Bfs,
    Dfs,
}

/// Immutable, `Copy` configuration threaded through every `step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub use_csp: bool,
    pub use_sat: bool,
    pub use_probability: bool,
    pub use_monte_carlo: bool,
    pub expansion: ExpansionKind,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            use_csp: true,
            use_sat: true,
            use_probability: true,
            use_monte_carlo: true,
            expansion: ExpansionKind::Bfs,
        }
    }
}

impl SolverConfig {
    /// Parse one of the driver-facing preset names, with an optional
    /// `:bfs`/`:dfs` suffix selecting the expansion variant. Returns `None`
    /// for anything unrecognized rather than panicking.
    pub fn from_preset(name: &str) -> Option<SolverConfig> {
        let (base, expansion) = match name.split_once(':') {
            Some((base, "bfs")) => (base, ExpansionKind::Bfs),
            Some((base, "dfs")) => (base, ExpansionKind::Dfs),
            Some(_) => return None,
            None => (name, ExpansionKind::Bfs),
        };

        let (use_csp, use_sat, use_probability, use_monte_carlo) = match base {
            "full" => (true, true, true, true),
            "full-nomc" => (true, true, true, false),
            "csp" => (true, false, false, false),
            "csp-sat" => (true, true, false, false),
            "csp-prob" => (true, false, true, false),
            "prob-only" => (false, false, true, false),
            "sat-only" => (false, true, false, false),
            _ => return None,
        };

        Some(SolverConfig {
            use_csp,
            use_sat,
            use_probability,
            use_monte_carlo,
            expansion,
        })
    }
}

/// A single decision emitted by [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RevealSafe,
    FlagMines,
    Guess,
    None,
    GameOver,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::RevealSafe => "reveal_safe",
            Action::FlagMines => "flag_mines",
            Action::Guess => "guess",
            Action::None => "none",
            Action::GameOver => "game_over",
        }
    }
}

/// Decide the next move against a read-only board snapshot. Pure: never
/// mutates `board`, never raises, and for a given `(board state, config)`
/// pair always returns the same decision.
pub fn step(board: &Board, config: &SolverConfig) -> (Action, Vec<Coord>) {
    if board.game_over() {
        return (Action::GameOver, Vec::new());
    }

    if config.use_csp {
        let (safe, mines) = csp::infer(board);
        if !safe.is_empty() {
            log::debug!("csp engine certified {} safe cell(s)", safe.len());
            return (Action::RevealSafe, safe);
        }
        if !mines.is_empty() {
            log::debug!("csp engine certified {} mine(s)", mines.len());
            return (Action::FlagMines, mines);
        }
    }

    if config.use_sat {
        let (safe, mines) = sat::infer(board);
        if !safe.is_empty() {
            log::debug!("sat engine certified {} safe cell(s)", safe.len());
            return (Action::RevealSafe, safe);
        }
        if !mines.is_empty() {
            log::debug!("sat engine certified {} mine(s)", mines.len());
            return (Action::FlagMines, mines);
        }
    }

    if config.use_monte_carlo {
        if let Some(cell) = montecarlo::choose_cell(board) {
            log::debug!("monte carlo sampler guessed {:?}", cell);
            return (Action::Guess, vec![cell]);
        }
    }

    if config.use_probability {
        if let Some(cell) = probability::choose_cell(board) {
            log::debug!("heuristic probability guessed {:?}", cell);
            return (Action::Guess, vec![cell]);
        }
    }

    let unknown = board.unknown_cells();
    if let Some(&cell) = unknown.iter().min() {
        log::trace!("no engine produced a decision, falling back to {:?}", cell);
        return (Action::Guess, vec![cell]);
    }

    (Action::None, Vec::new())
}

/// Apply a decision produced by [`step`] to the board, dispatching flood-fill
/// expansion whenever a reveal uncovers a zero. Returns whether any
/// operation actually changed the board.
pub fn solve_step(
    board: &mut Board,
    action: Action,
    cells: &[Coord],
    config: &SolverConfig,
) -> Result<bool, BoardError> {
    if board.game_over() {
        return Ok(false);
    }

    let mut success = false;

    match action {
        Action::RevealSafe | Action::Guess => {
            for &(i, j) in cells {
                if board.game_over() {
                    break;
                }
                if board.reveal(i, j)? {
                    success = true;
                    if board.game_over() {
                        break;
                    }
                    if let Tile::Revealed(0) = board.get_tile(i, j) {
                        match config.expansion {
                            ExpansionKind::Bfs => {
                                expansion::bfs_reveal(board, i, j)?;
                            }
                            ExpansionKind::Dfs => {
                                expansion::dfs_reveal(board, i, j)?;
                            }
                        }
                    }
                }
            }
        }
        Action::FlagMines => {
            for &(i, j) in cells {
                if board.game_over() {
                    break;
                }
                if board.flag(i, j) {
                    success = true;
                }
            }
        }
        Action::None | Action::GameOver => {}
    }

    Ok(success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;

    #[test]
    fn game_over_board_returns_game_over_action() {
        let mut board = Board::with_mines(2, 2, Set::from([(0, 0)]));
        board.reveal(0, 0).unwrap();
        let (action, cells) = step(&board, &SolverConfig::default());
        assert_eq!(action, Action::GameOver);
        assert!(cells.is_empty());
    }

    #[test]
    fn csp_certified_safe_cells_take_priority() {
        let mut board = Board::with_mines(3, 3, Set::from([(0, 1)]));
        board.reveal(0, 0).unwrap();
        board.flag(0, 1);
        board.reveal(0, 2).unwrap();
        let (action, cells) = step(&board, &SolverConfig::default());
        assert_eq!(action, Action::RevealSafe);
        assert!(!cells.is_empty());
    }

    #[test]
    fn step_never_mutates_the_board() {
        let mut board = Board::with_mines(3, 3, Set::from([(0, 1)]));
        board.reveal(0, 0).unwrap();
        let before = board.revealed_cells();
        let _ = step(&board, &SolverConfig::default());
        assert_eq!(board.revealed_cells(), before);
    }

    #[test]
    fn step_is_deterministic_across_repeated_calls() {
        let mut board = Board::with_deferred_mines(6, 6, 5, 7);
        board.reveal(3, 3).unwrap();
        let a = step(&board, &SolverConfig::default());
        let b = step(&board, &SolverConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn solve_step_expands_a_revealed_zero() {
        let mut board = Board::with_mines(5, 5, Set::from([(4, 4)]));
        let ok = solve_step(&mut board, Action::Guess, &[(2, 2)], &SolverConfig::default()).unwrap();
        assert!(ok);
        assert!(board.revealed_cells().len() > 1);
    }

    #[test]
    fn solve_step_stops_on_mine_hit() {
        let mut board = Board::with_mines(2, 2, Set::from([(0, 0), (1, 1)]));
        let ok = solve_step(
            &mut board,
            Action::FlagMines,
            &[(0, 1)],
            &SolverConfig::default(),
        )
        .unwrap();
        assert!(ok);
        let ok = solve_step(&mut board, Action::Guess, &[(0, 0), (1, 1)], &SolverConfig::default()).unwrap();
        assert!(ok);
        assert!(board.game_over());
    }

    #[test]
    fn from_preset_parses_known_names_and_rejects_unknown() {
        let full = SolverConfig::from_preset("full").unwrap();
        assert!(full.use_csp && full.use_sat && full.use_probability && full.use_monte_carlo);

        let csp_only = SolverConfig::from_preset("csp").unwrap();
        assert!(csp_only.use_csp && !csp_only.use_sat && !csp_only.use_probability && !csp_only.use_monte_carlo);

        let with_dfs = SolverConfig::from_preset("full-nomc:dfs").unwrap();
        assert_eq!(with_dfs.expansion, ExpansionKind::Dfs);
        assert!(!with_dfs.use_monte_carlo);

        assert!(SolverConfig::from_preset("not-a-real-preset").is_none());
        assert!(SolverConfig::from_preset("full:nope").is_none());
    }

    #[test]
    fn action_as_str_matches_external_string_surface() {
        assert_eq!(Action::RevealSafe.as_str(), "reveal_safe");
        assert_eq!(Action::FlagMines.as_str(), "flag_mines");
        assert_eq!(Action::Guess.as_str(), "guess");
        assert_eq!(Action::None.as_str(), "none");
        assert_eq!(Action::GameOver.as_str(), "game_over");
    }
}
