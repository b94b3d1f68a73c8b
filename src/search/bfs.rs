//! Breadth-first helpers: distance maps and bounded neighborhood walks.

use std::collections::VecDeque;

use crate::board::{Board, TileId, TileMatrix, TileSet};

/// Distance reported for tiles that cannot be reached.
pub const UNREACHABLE: i32 = 1000;

/// Move distance from the nearest of `starts` to every tile, walking only
/// pathable tiles. Unreachable tiles (mountains included) get
/// [`UNREACHABLE`].
pub fn distance_map(board: &Board, starts: &[TileId]) -> TileMatrix<i32> {
    flood(board, starts, false)
}

/// Like [`distance_map`] but walks through mountains as well.
pub fn distance_map_through_obstacles(board: &Board, starts: &[TileId]) -> TileMatrix<i32> {
    flood(board, starts, true)
}

fn flood(board: &Board, starts: &[TileId], through_obstacles: bool) -> TileMatrix<i32> {
    let mut dist = TileMatrix::filled(board.len(), UNREACHABLE);
    let mut queue = VecDeque::new();
    for &start in starts {
        if dist[start] != 0 {
            dist[start] = 0;
            queue.push_back(start);
        }
    }
    while let Some(tile) = queue.pop_front() {
        let next_dist = dist[tile] + 1;
        for &next in board.adjacent(tile) {
            if !through_obstacles && !board.tile(next).is_pathable() {
                continue;
            }
            if dist[next] > next_dist {
                dist[next] = next_dist;
                queue.push_back(next);
            }
        }
    }
    dist
}

/// The pathable tile farthest from `from`, first in id order on ties.
pub fn furthest_tile(board: &Board, from: TileId) -> TileId {
    let dist = distance_map_through_obstacles(board, &[from]);
    let mut best = from;
    for tile in board.tiles() {
        if tile.is_pathable() && dist[tile.id] > dist[best] && dist[tile.id] < UNREACHABLE {
            best = tile.id;
        }
    }
    best
}

/// Tie-break weights that favor tiles far from `root`: each tile's distance
/// from the tile farthest from `root`, measured through obstacles.
pub fn opposite_weight_map(board: &Board, root: TileId) -> TileMatrix<i32> {
    let far = furthest_tile(board, root);
    distance_map_through_obstacles(board, &[far])
}

/// Calls `visit` once for every pathable tile within `max_depth` moves of
/// any tile in `starts`, the starts included.
pub fn for_each_within<F>(board: &Board, starts: &TileSet, max_depth: usize, mut visit: F)
where
    F: FnMut(TileId),
{
    let mut seen = starts.clone();
    let mut queue: VecDeque<(TileId, usize)> = starts.iter().map(|t| (t, 0)).collect();
    while let Some((tile, depth)) = queue.pop_front() {
        visit(tile);
        if depth >= max_depth {
            continue;
        }
        for next in board.movable(tile) {
            if seen.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }
}
