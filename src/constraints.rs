//! Constraint extraction: turns revealed numbered tiles into `(unknown
//! neighbors, residual mine count)` pairs.

use std::collections::HashSet;

use crate::board::{Board, Coord};

/// A single `sum(mines in cells) == required` constraint, extracted fresh on
/// every solver step and never cached across steps.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// The revealed tile this constraint was derived from, kept for
    /// debugging/display purposes only — inference never reads it.
    pub origin: Coord,
    pub cells: HashSet<Coord>,
    pub required: usize,
}

impl Constraint {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Scan every revealed numbered tile and emit its constraint. Revealed zeros
/// and the mine sentinel contribute nothing.
pub fn extract(board: &Board) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    for (i, j) in board.revealed_cells() {
        let value = match board.get_tile(i, j) {
            crate::board::Tile::Revealed(v) if (1..=8).contains(&v) => v as usize,
            _ => continue,
        };

        let neighbors = board.neighbors(i, j);
        let flagged = neighbors.iter().filter(|&&(ni, nj)| board.is_flagged(ni, nj)).count();
        let unknown: HashSet<Coord> = neighbors
            .into_iter()
            .filter(|&(ni, nj)| board.is_unknown(ni, nj))
            .collect();

        if unknown.is_empty() {
            continue;
        }

        let required = value.saturating_sub(flagged).min(unknown.len());
        constraints.push(Constraint {
            origin: (i, j),
            cells: unknown,
            required,
        });
    }
    constraints
}
