//! Constraint-propagation engine: unit rules plus pairwise subset reasoning
//! over overlapping constraints.

use std::collections::HashSet;

use itertools::Itertools;

use crate::board::{Board, Coord};
use crate::constraints::{self, Constraint};

/// Run deterministic inference on the board's current constraints.
///
/// Returns `(safe, mines)` as two disjoint, coordinate-sorted lists.
pub fn infer(board: &Board) -> (Vec<Coord>, Vec<Coord>) {
    let constraints = constraints::extract(board);
    infer_from(&constraints)
}

fn infer_from(constraints: &[Constraint]) -> (Vec<Coord>, Vec<Coord>) {
    let mut safe: HashSet<Coord> = HashSet::new();
    let mut mines: HashSet<Coord> = HashSet::new();

    for c in constraints {
        if c.is_empty() {
            continue;
        }
        if c.required == 0 {
            safe.extend(&c.cells);
        } else if c.required == c.len() {
            mines.extend(&c.cells);
        }
    }

    let (subset_safe, subset_mines) = subset_implications(constraints);
    safe.extend(subset_safe);
    mines.extend(subset_mines);

    let mut safe: Vec<Coord> = safe.into_iter().collect();
    let mut mines: Vec<Coord> = mines.into_iter().collect();
    safe.sort_unstable();
    mines.sort_unstable();
    (safe, mines)
}

/// Pairwise subset rule: for `A.cells` strictly contained in `B.cells`, the
/// difference `E = B.cells \ A.cells` must hold `B.required - A.required`
/// mines. Both orderings of every pair are checked since neither constraint
/// is known up front to be the smaller one.
fn subset_implications(constraints: &[Constraint]) -> (HashSet<Coord>, HashSet<Coord>) {
    let mut safe = HashSet::new();
    let mut mines = HashSet::new();

    let nonempty: Vec<&Constraint> = constraints.iter().filter(|c| !c.is_empty()).collect();
    for (a, b) in nonempty.iter().tuple_combinations() {
        for (smaller, larger) in [(*a, *b), (*b, *a)] {
            apply_subset_pair(smaller, larger, &mut safe, &mut mines);
        }
    }

    (safe, mines)
}

fn apply_subset_pair(
    smaller: &Constraint,
    larger: &Constraint,
    safe: &mut HashSet<Coord>,
    mines: &mut HashSet<Coord>,
) {
    if smaller.cells == larger.cells || !smaller.cells.is_subset(&larger.cells) {
        return;
    }
    let extra: HashSet<Coord> = larger.cells.difference(&smaller.cells).copied().collect();
    if extra.is_empty() {
        return;
    }
    let required_diff = larger.required as isize - smaller.required as isize;
    if required_diff < 0 || required_diff as usize > extra.len() {
        // Inconsistent pair, likely from a mistaken flag. Tolerated: this
        // rule simply contributes nothing for it.
        return;
    }
    let required_diff = required_diff as usize;
    if required_diff == 0 {
        safe.extend(extra);
    } else if required_diff == extra.len() {
        mines.extend(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;

    fn constraint(origin: Coord, cells: &[Coord], required: usize) -> Constraint {
        Constraint {
            origin,
            cells: cells.iter().copied().collect(),
            required,
        }
    }

    #[test]
    fn unit_rule_all_safe() {
        let constraints = vec![constraint((0, 0), &[(0, 1), (1, 0)], 0)];
        let (safe, mines) = infer_from(&constraints);
        assert_eq!(safe, vec![(0, 1), (1, 0)]);
        assert!(mines.is_empty());
    }

    #[test]
    fn unit_rule_all_mines() {
        let constraints = vec![constraint((0, 0), &[(0, 1), (1, 0)], 2)];
        let (safe, mines) = infer_from(&constraints);
        assert!(safe.is_empty());
        assert_eq!(mines, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn subset_rule_deduces_safe_difference() {
        // A = {(0,1),(1,1)} needs 1; B = {(0,1),(1,1),(2,1)} needs 1.
        // E = {(2,1)}, d = 0 => (2,1) safe.
        let constraints = vec![
            constraint((0, 0), &[(0, 1), (1, 1)], 1),
            constraint((1, 0), &[(0, 1), (1, 1), (2, 1)], 1),
        ];
        let (safe, _mines) = infer_from(&constraints);
        assert!(safe.contains(&(2, 1)));
    }

    #[test]
    fn subset_rule_deduces_mine_difference() {
        // d = |E| => every cell in E is a mine.
        let constraints = vec![
            constraint((0, 0), &[(0, 1)], 0),
            constraint((1, 0), &[(0, 1), (1, 1)], 1),
        ];
        let (_safe, mines) = infer_from(&constraints);
        assert!(mines.contains(&(1, 1)));
    }

    #[test]
    fn inconsistent_subset_pair_is_tolerated() {
        // required_diff negative: larger.required < smaller.required.
        let constraints = vec![
            constraint((0, 0), &[(0, 1)], 1),
            constraint((1, 0), &[(0, 1), (1, 1)], 0),
        ];
        // Must not panic; should simply not produce a result for this pair.
        let (safe, mines) = infer_from(&constraints);
        assert!(!mines.contains(&(1, 1)) || safe.contains(&(0, 1)));
    }

    #[test]
    fn safe_and_mine_sets_are_disjoint() {
        let constraints = vec![
            constraint((0, 0), &[(0, 1)], 0),
            constraint((1, 0), &[(1, 1)], 1),
        ];
        let (safe, mines) = infer_from(&constraints);
        let safe_set: Set<_> = safe.into_iter().collect();
        let mine_set: Set<_> = mines.into_iter().collect();
        assert!(safe_set.is_disjoint(&mine_set));
    }

    #[test]
    fn scenario_a_csp_unit_rule_all_safe() {
        let mut board = Board::with_mines(3, 3, Set::from([(0, 1)]));
        board.reveal(0, 0).unwrap(); // shows 1
        board.flag(0, 1);
        board.reveal(0, 2).unwrap(); // shows 0
        let (safe, _mines) = infer(&board);
        let expected: Set<Coord> = board
            .neighbors(0, 2)
            .into_iter()
            .filter(|&(i, j)| board.is_unknown(i, j))
            .collect();
        let safe_set: Set<_> = safe.into_iter().collect();
        assert!(expected.is_subset(&safe_set));
    }

    #[test]
    fn scenario_b_csp_unit_rule_all_mines() {
        let mut board = Board::with_mines(3, 3, Set::from([(0, 1), (0, 2)]));
        board.reveal(0, 0).unwrap(); // shows 2
        let (_safe, mines) = infer(&board);
        assert!(mines.contains(&(0, 1)));
        assert!(mines.contains(&(0, 2)));
    }
}
