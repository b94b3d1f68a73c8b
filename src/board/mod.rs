//! Board representation consumed by the planner.
//!
//! Tiles, four-way adjacency, dense tile sets, per-tile matrices, and a
//! plain-text notation for building boards in tests and benchmarks.

pub mod map;
pub mod matrix;
pub mod text;
pub mod tile;
pub mod tileset;

pub use map::Board;
pub use matrix::TileMatrix;
pub use text::{encode_board, parse_board, MapParseError};
pub use tile::{PlayerId, Tile, TileId};
pub use tileset::TileSet;
