//! Randomized feasible-assignment sampling: estimates per-cell mine
//! frequency for components too large (or not fully determined) for exact
//! SAT enumeration to settle.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Coord, Tile};
use crate::components;
use crate::constraints::{self, Constraint};

const DEFAULT_SAMPLES: usize = 256;
const MAX_COMPONENT_SIZE: usize = 18;

/// Estimate, for every cell touched by some constraint, the fraction of
/// sampled feasible assignments in which it held a mine.
pub fn compute_probabilities(board: &Board) -> HashMap<Coord, f64> {
    let constraints = constraints::extract(board);
    let mut rng = StdRng::seed_from_u64(board_state_seed(board));
    let mut probabilities = HashMap::new();

    for component in components::build(&constraints) {
        let size = component.len();
        if size == 0 {
            continue;
        }
        let relevant = components::local_constraints(&component, &constraints);
        if relevant.is_empty() {
            continue;
        }
        let cells: Vec<Coord> = component.into_iter().collect();
        let samples = if size > MAX_COMPONENT_SIZE {
            let scale = MAX_COMPONENT_SIZE as f64 / size as f64;
            ((DEFAULT_SAMPLES as f64 * scale) as usize).max(32)
        } else {
            DEFAULT_SAMPLES
        };
        probabilities.extend(sample_component(&cells, &relevant, samples, &mut rng));
    }
    probabilities
}

/// Hash the board's revealed/flagged tile layout into a seed, so repeated
/// calls against an unchanged board draw the identical sample sequence
/// without depending on OS entropy or the board's own RNG.
fn board_state_seed(board: &Board) -> u64 {
    let mut hasher = DefaultHasher::new();
    board.rows().hash(&mut hasher);
    board.cols().hash(&mut hasher);
    for j in 0..board.cols() {
        for i in 0..board.rows() {
            match board.get_tile(i, j) {
                Tile::Unknown => 0u8.hash(&mut hasher),
                Tile::Flagged => 1u8.hash(&mut hasher),
                Tile::Revealed(v) => {
                    2u8.hash(&mut hasher);
                    v.hash(&mut hasher);
                }
            }
        }
    }
    hasher.finish()
}

fn sample_component(
    cells: &[Coord],
    constraints: &[Constraint],
    samples: usize,
    rng: &mut StdRng,
) -> HashMap<Coord, f64> {
    let mut counts: HashMap<Coord, usize> = cells.iter().map(|&c| (c, 0)).collect();
    let mut attempts = 0usize;
    let mut successes = 0usize;
    let max_attempts = samples * 5;

    while successes < samples && attempts < max_attempts {
        attempts += 1;
        if let Some(assignment) = random_assignment(cells, constraints, rng) {
            successes += 1;
            for (cell, value) in assignment {
                if value {
                    *counts.get_mut(&cell).unwrap() += 1;
                }
            }
        }
    }

    if successes == 0 {
        return HashMap::new();
    }
    counts
        .into_iter()
        .map(|(cell, count)| (cell, count as f64 / successes as f64))
        .collect()
}

/// Randomized DFS over cells ordered by descending constraint degree (with
/// random jitter among ties), trying both values in random order at each
/// step and pruning as soon as a partial assignment cannot satisfy some
/// constraint's remaining budget.
fn random_assignment(
    cells: &[Coord],
    constraints: &[Constraint],
    rng: &mut StdRng,
) -> Option<HashMap<Coord, bool>> {
    if cells.is_empty() {
        return Some(HashMap::new());
    }

    let mut membership: HashMap<Coord, Vec<usize>> = HashMap::new();
    for (idx, c) in constraints.iter().enumerate() {
        for &cell in &c.cells {
            membership.entry(cell).or_default().push(idx);
        }
    }

    let mut ordered: Vec<Coord> = cells.to_vec();
    ordered.sort_by_cached_key(|c| {
        let degree = membership.get(c).map(Vec::len).unwrap_or(0);
        (std::cmp::Reverse(degree), rng.random::<u64>())
    });

    let mut remaining: Vec<isize> = constraints.iter().map(|c| c.required as isize).collect();
    let mut unassigned: Vec<usize> = constraints.iter().map(Constraint::len).collect();
    let mut assignment: HashMap<Coord, bool> = HashMap::new();

    if assign(0, &ordered, &membership, &mut remaining, &mut unassigned, &mut assignment, rng) {
        Some(assignment)
    } else {
        None
    }
}

fn assign(
    index: usize,
    ordered: &[Coord],
    membership: &HashMap<Coord, Vec<usize>>,
    remaining: &mut [isize],
    unassigned: &mut [usize],
    assignment: &mut HashMap<Coord, bool>,
    rng: &mut StdRng,
) -> bool {
    if index == ordered.len() {
        return remaining.iter().all(|&r| r == 0);
    }

    let cell = ordered[index];
    let participating = membership.get(&cell).cloned().unwrap_or_default();
    let mut choices = [false, true];
    choices.shuffle(rng);

    for value in choices {
        let mut feasible = true;
        let mut touched = 0;
        for &idx in &participating {
            unassigned[idx] -= 1;
            if value {
                remaining[idx] -= 1;
            }
            touched += 1;
            if remaining[idx] < 0 || remaining[idx] as usize > unassigned[idx] {
                feasible = false;
                break;
            }
        }

        if feasible {
            assignment.insert(cell, value);
            if assign(index + 1, ordered, membership, remaining, unassigned, assignment, rng) {
                return true;
            }
            assignment.remove(&cell);
        }

        // revert only the constraints actually touched above: the inner loop
        // may have broken early on infeasibility.
        for &idx in &participating[..touched] {
            unassigned[idx] += 1;
            if value {
                remaining[idx] += 1;
            }
        }
    }
    false
}

/// Pick the component cell with minimum estimated mine probability, breaking
/// ties by lexicographic coordinate order.
pub fn choose_cell(board: &Board) -> Option<Coord> {
    let probabilities = compute_probabilities(board);
    probabilities
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)))
        .map(|(cell, _)| cell)
}
