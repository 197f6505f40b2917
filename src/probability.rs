//! Heuristic mine-probability estimate: a cheap fallback used once both the
//! CSP and SAT engines have exhausted what they can certify. Combines
//! per-constraint local ratios with a global density prior.

use std::collections::HashMap;

use crate::board::{Board, Coord};
use crate::constraints::{self, Constraint};

/// Mine-density prior used when the board's total mine count is unknown.
const ESTIMATED_DENSITY: f64 = 0.15;

/// Local mine probability per cell, derived from every constraint touching
/// it. Cells certified safe (`r = 0`) or certified mines (`r = |U|`) report
/// exactly 0.0 / 1.0; every other cell gets the symmetric mean of the ratio
/// `r / |U|` across every constraint it participates in.
fn local_probabilities(constraints: &[Constraint]) -> HashMap<Coord, f64> {
    let mut sums: HashMap<Coord, f64> = HashMap::new();
    let mut counts: HashMap<Coord, usize> = HashMap::new();
    let mut certain: HashMap<Coord, f64> = HashMap::new();

    for c in constraints {
        if c.is_empty() {
            continue;
        }
        if c.required == 0 {
            for &cell in &c.cells {
                certain.insert(cell, 0.0);
            }
            continue;
        }
        if c.required == c.len() {
            for &cell in &c.cells {
                certain.insert(cell, 1.0);
            }
            continue;
        }
        let ratio = c.required as f64 / c.len() as f64;
        for &cell in &c.cells {
            *sums.entry(cell).or_insert(0.0) += ratio;
            *counts.entry(cell).or_insert(0) += 1;
        }
    }

    let mut result: HashMap<Coord, f64> = sums
        .into_iter()
        .map(|(cell, sum)| (cell, sum / counts[&cell] as f64))
        .collect();
    // Certainty from a unit rule always wins over an averaged ratio from
    // some other overlapping constraint.
    result.extend(certain);
    result
}

/// `remaining_mines / |unknown|` when the total is known; otherwise a flat
/// density prior net of already-placed flags, clamped to `[0, 1]`.
fn global_probability(board: &Board) -> f64 {
    let unknown_count = board.unknown_cells().len();
    if unknown_count == 0 {
        return 0.0;
    }

    if let Some(remaining) = board.remaining_mines() {
        return (remaining as f64 / unknown_count as f64).min(1.0);
    }

    let total_cells = board.rows() * board.cols();
    let estimated_total_mines = (total_cells as f64 * ESTIMATED_DENSITY) as usize;
    let estimated_remaining = estimated_total_mines.saturating_sub(board.flagged_count());
    (estimated_remaining as f64 / unknown_count as f64).min(1.0)
}

/// Mine probability for every unknown cell on the board: local ratio where a
/// constraint touches the cell, global fallback otherwise.
pub fn compute_all(board: &Board) -> HashMap<Coord, f64> {
    let constraints = constraints::extract(board);
    let local = local_probabilities(&constraints);
    let fallback = global_probability(board);

    board
        .unknown_cells()
        .into_iter()
        .map(|cell| {
            let p = local.get(&cell).copied().unwrap_or(fallback);
            (cell, p)
        })
        .collect()
}

/// Choose the unknown cell with minimum mine probability, breaking ties by
/// distance to board center and then by lexicographic coordinate order.
pub fn choose_cell(board: &Board) -> Option<Coord> {
    let unknown = board.unknown_cells();
    if unknown.is_empty() {
        return None;
    }

    let probabilities = compute_all(board);
    if probabilities.is_empty() {
        return unknown.into_iter().min();
    }

    let center = (board.rows() as f64 / 2.0, board.cols() as f64 / 2.0);
    probabilities
        .into_iter()
        .min_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap()
                .then_with(|| distance_to_center(a.0, center).partial_cmp(&distance_to_center(b.0, center)).unwrap())
                .then(a.0.cmp(&b.0))
        })
        .map(|(cell, _)| cell)
}

fn distance_to_center(cell: Coord, center: (f64, f64)) -> f64 {
    let dr = cell.0 as f64 - center.0;
    let dc = cell.1 as f64 - center.1;
    (dr * dr + dc * dc).sqrt()
}
