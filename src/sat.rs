//! Bounded SAT enumeration: for each connected component of the constraint
//! frontier, enumerate satisfying mine/safe assignments with a blocking-clause
//! solver loop and certify a cell only once every enumerated solution agrees
//! on its value.

use std::collections::{HashMap, HashSet};

use varisat::{ExtendFormula, Lit, Solver};

use crate::board::{Board, Coord};
use crate::cnf::{self, Encoding};
use crate::components;
use crate::constraints::{self, Constraint};

/// Stop enumerating a single component's solutions past this many models.
const MAX_SOLUTIONS_PER_COMPONENT: usize = 200_000;
/// Components larger than this many cells are skipped entirely: the
/// cardinality encoding stays polynomial, but enumerating every assignment of
/// a large frontier is not worth the wall-clock it costs a live solver loop.
const MAX_COMPONENT_SIZE: usize = 18;

/// Run exhaustive, per-component SAT inference on the board's current
/// constraints.
///
/// Returns `(safe, mines)` as two disjoint, coordinate-sorted lists. A cell
/// only appears when every satisfying assignment of its component agrees on
/// its value.
pub fn infer(board: &Board) -> (Vec<Coord>, Vec<Coord>) {
    let constraints = constraints::extract(board);
    infer_from(&constraints)
}

fn infer_from(constraints: &[Constraint]) -> (Vec<Coord>, Vec<Coord>) {
    let mut safe = HashSet::new();
    let mut mines = HashSet::new();

    for component in components::build(constraints) {
        if component.len() > MAX_COMPONENT_SIZE {
            continue;
        }
        let local = components::local_constraints(&component, constraints);
        let cells: Vec<Coord> = component.into_iter().collect();
        let (component_safe, component_mines) = solve_component(&cells, &local);
        safe.extend(component_safe);
        mines.extend(component_mines);
    }

    let mut safe: Vec<Coord> = safe.into_iter().collect();
    let mut mines: Vec<Coord> = mines.into_iter().collect();
    safe.sort_unstable();
    mines.sort_unstable();
    (safe, mines)
}

/// Enumerate every satisfying assignment of one component's local constraints
/// and certify the cells that are settled (always mine, or always safe)
/// across all of them.
fn solve_component(cells: &[Coord], constraints: &[Constraint]) -> (Vec<Coord>, Vec<Coord>) {
    let encoding = cnf::encode(cells, constraints);
    let mut solver = Solver::new();
    for clause in &encoding.clauses {
        solver.add_clause(&to_lits(clause));
    }

    // `true_count`/`false_count` track, per cell, how many enumerated
    // solutions assigned it a mine vs. safe; a cell is settled once one of
    // the two counts stays at zero across every solution seen so far.
    let mut true_count: HashMap<Coord, usize> = HashMap::new();
    let mut false_count: HashMap<Coord, usize> = HashMap::new();
    let mut solutions_seen = 0usize;

    while solutions_seen < MAX_SOLUTIONS_PER_COMPONENT {
        let Ok(true) = solver.solve() else { break };
        let model = solver.model().expect("solver reported SAT with no model");
        record_model(&model, &encoding, &mut true_count, &mut false_count);
        solutions_seen += 1;

        let blocking: Vec<Lit> = model.iter().map(|&lit| !lit).collect();
        solver.add_clause(&blocking);

        if cells.iter().all(|c| {
            true_count.get(c).copied().unwrap_or(0) > 0 && false_count.get(c).copied().unwrap_or(0) > 0
        }) {
            // Every cell's value set has already become {0,1} (both a mine
            // and a safe assignment observed): no further solution can
            // certify anything that isn't already settled.
            break;
        }
    }

    if solutions_seen == 0 {
        // Locally unsatisfiable: should not happen for constraints derived
        // from a live board, but yields nothing rather than panicking.
        return (Vec::new(), Vec::new());
    }

    let mut safe = Vec::new();
    let mut mines = Vec::new();
    for &cell in cells {
        let t = true_count.get(&cell).copied().unwrap_or(0);
        let f = false_count.get(&cell).copied().unwrap_or(0);
        if t > 0 && f == 0 {
            mines.push(cell);
        } else if f > 0 && t == 0 {
            safe.push(cell);
        }
    }
    (safe, mines)
}

fn record_model(
    model: &[Lit],
    encoding: &Encoding,
    true_count: &mut HashMap<Coord, usize>,
    false_count: &mut HashMap<Coord, usize>,
) {
    for &lit in model {
        let var = lit.var().to_dimacs();
        let Some(&cell) = encoding.cell_of_var.get(&var) else {
            continue; // auxiliary counter variable, not a cell
        };
        if lit.is_positive() {
            *true_count.entry(cell).or_insert(0) += 1;
        } else {
            *false_count.entry(cell).or_insert(0) += 1;
        }
    }
}

fn to_lits(clause: &[isize]) -> Vec<Lit> {
    clause.iter().map(|&lit| Lit::from_dimacs(lit)).collect()
}
