//! Early-game expansion planner for a grid-based territory game.
//!
//! Exposes the board representation, path search, the expansion planner,
//! the knapsack solvers, and the benchmark harness used by the
//! `expand-bench` binary.

pub mod benchmark;
pub mod board;
pub mod expand;
pub mod knapsack;
pub mod search;
