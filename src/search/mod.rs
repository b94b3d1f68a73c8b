//! Path search over the board.
//!
//! A best-first frontier search parameterized by caller strategies, plus
//! breadth-first distance helpers and the path/move value types.

pub mod bfs;
pub mod frontier;
pub mod path;

pub use bfs::{
    distance_map, distance_map_through_obstacles, for_each_within, furthest_tile,
    opposite_weight_map, UNREACHABLE,
};
pub use frontier::{FrontierSearch, PathNode, SearchOutcome, SearchStrategy};
pub use path::{Move, Path};
