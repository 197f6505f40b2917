//! Inference core for an autonomous Minesweeper solver.
//!
//! This crate owns board state and the four inference layers consulted in
//! fixed priority order by [`strategy::step`]: constraint propagation
//! ([`csp`]), bounded SAT enumeration ([`sat`], built on [`cnf`]), Monte
//! Carlo sampling ([`montecarlo`]), and a heuristic fallback
//! ([`probability`]). [`expansion`] provides the flood-fill that follows a
//! revealed zero. The command-line driver, batch runner, and rendering layer
//! that would consume this crate are out of scope here.

pub mod board;
pub mod cnf;
pub mod components;
pub mod constraints;
pub mod csp;
pub mod expansion;
pub mod montecarlo;
pub mod probability;
pub mod sat;
pub mod strategy;

pub use board::{Board, BoardError, Coord, Tile, MINE_SENTINEL};
pub use constraints::Constraint;
pub use strategy::{solve_step, step, Action, ExpansionKind, SolverConfig};
