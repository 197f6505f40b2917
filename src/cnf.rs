//! CNF clause construction: maps unknown cells to SAT variables and encodes
//! `exactly k of n` cardinality constraints using Sinz's sequential-counter
//! encoding, so the SAT engine never pays the combinatorial cost of a naive
//! "choose k+1" clause blow-up.

use std::collections::HashMap;

use crate::board::Coord;
use crate::constraints::Constraint;

pub type Clause = Vec<isize>;

/// A CNF formula together with the mapping between board cells and the
/// 1-based SAT variables that represent "this cell is a mine".
pub struct Encoding {
    pub clauses: Vec<Clause>,
    pub var_of_cell: HashMap<Coord, isize>,
    pub cell_of_var: HashMap<isize, Coord>,
}

/// Encode every constraint local to one component as an `exactly k`
/// cardinality clause set, per Carsten Sinz, "Towards an Optimal CNF
/// Encoding of Boolean Cardinality Constraints" (2005).
pub fn encode(cells: &[Coord], constraints: &[Constraint]) -> Encoding {
    let var_of_cell: HashMap<Coord, isize> = cells
        .iter()
        .enumerate()
        .map(|(i, &cell)| (cell, (i + 1) as isize))
        .collect();
    let cell_of_var: HashMap<isize, Coord> = var_of_cell.iter().map(|(&c, &v)| (v, c)).collect();

    let mut clauses = Vec::new();
    let mut next_var = (cells.len() + 1) as isize;

    for constraint in constraints {
        let sat_vars: Vec<isize> = constraint
            .cells
            .iter()
            .filter_map(|cell| var_of_cell.get(cell).copied())
            .collect();
        if sat_vars.is_empty() {
            continue;
        }
        exactly_k(&mut clauses, &mut next_var, &sat_vars, constraint.required);
    }

    Encoding {
        clauses,
        var_of_cell,
        cell_of_var,
    }
}

/// Sequential-counter encoding of "exactly `k` of `sat_vars` are true".
/// `s[i][j]` is an auxiliary variable meaning "at least `j+1` of the first
/// `i+1` variables are true".
fn exactly_k(clauses: &mut Vec<Clause>, next_var: &mut isize, sat_vars: &[isize], k: usize) {
    let n = sat_vars.len();
    if k > n {
        clauses.push(vec![]); // unsatisfiable: force the formula UNSAT
        return;
    }
    if n == 0 {
        if k > 0 {
            clauses.push(vec![]);
        }
        return;
    }
    if k == 0 {
        for &var in sat_vars {
            clauses.push(vec![-var]);
        }
        return;
    }

    let width = k + 1;
    let mut s = vec![0isize; n * width];
    for slot in s.iter_mut() {
        *slot = *next_var;
        *next_var += 1;
    }

    clauses.push(vec![-sat_vars[0], s[0]]);
    clauses.push(vec![sat_vars[0], -s[0]]);
    for j in 1..width {
        clauses.push(vec![-s[j]]);
    }

    for i in 1..n {
        clauses.push(vec![-s[(i - 1) * width], s[i * width]]);
        clauses.push(vec![-sat_vars[i], s[i * width]]);
        clauses.push(vec![s[(i - 1) * width], sat_vars[i], -s[i * width]]);

        for j in 1..width {
            clauses.push(vec![-s[(i - 1) * width + j], s[i * width + j]]);
            clauses.push(vec![
                -sat_vars[i],
                -s[(i - 1) * width + (j - 1)],
                s[i * width + j],
            ]);
            clauses.push(vec![s[(i - 1) * width + j], sat_vars[i], -s[i * width + j]]);
            clauses.push(vec![
                s[(i - 1) * width + j],
                s[(i - 1) * width + (j - 1)],
                -s[i * width + j],
            ]);
        }
    }

    clauses.push(vec![s[(n - 1) * width + (k - 1)]]);
    if k < n {
        clauses.push(vec![-s[(n - 1) * width + k]]);
    }
}
