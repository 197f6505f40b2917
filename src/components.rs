//! Component decomposition: partitions the unknown cells touched by any
//! constraint into connected blocks, so SAT and Monte-Carlo can work on each
//! independently instead of the whole frontier at once.

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;

use crate::board::Coord;
use crate::constraints::Constraint;

/// Build adjacency where two cells are linked iff they co-occur in some
/// constraint's cell set (not spatial adjacency), then flood-fill it into
/// disjoint blocks.
pub fn build(constraints: &[Constraint]) -> Vec<HashSet<Coord>> {
    let mut adjacency: HashMap<Coord, HashSet<Coord>> = HashMap::new();
    for constraint in constraints {
        for (a, b) in constraint.cells.iter().tuple_combinations() {
            adjacency.entry(*a).or_default().insert(*b);
            adjacency.entry(*b).or_default().insert(*a);
        }
        // A constraint with exactly one unknown cell still needs that cell
        // to end up in some component on its own.
        if constraint.cells.len() == 1 {
            let only = *constraint.cells.iter().next().unwrap();
            adjacency.entry(only).or_default();
        }
    }

    let mut visited: HashSet<Coord> = HashSet::new();
    let mut blocks = Vec::new();

    for &start in adjacency.keys() {
        if visited.contains(&start) {
            continue;
        }
        let mut block = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            if !visited.insert(cell) {
                continue;
            }
            block.insert(cell);
            if let Some(neighbors) = adjacency.get(&cell) {
                for &n in neighbors {
                    if !visited.contains(&n) {
                        queue.push_back(n);
                    }
                }
            }
        }
        blocks.push(block);
    }

    blocks
}

/// Restrict the full constraint list to the ones touching `component`,
/// intersecting each constraint's cell set with the component.
pub fn local_constraints(component: &HashSet<Coord>, constraints: &[Constraint]) -> Vec<Constraint> {
    constraints
        .iter()
        .filter_map(|c| {
            let overlap: HashSet<Coord> = c.cells.intersection(component).copied().collect();
            if overlap.is_empty() {
                None
            } else {
                Some(Constraint {
                    origin: c.origin,
                    cells: overlap,
                    required: c.required,
                })
            }
        })
        .collect()
}
