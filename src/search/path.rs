//! Paths and moves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, TileId};

/// A single army movement between adjacent tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub source: TileId,
    pub dest: TileId,
    /// Move half of the source army instead of all but one.
    pub move_half: bool,
}

impl Move {
    pub fn new(source: TileId, dest: TileId) -> Self {
        Move {
            source,
            dest,
            move_half: false,
        }
    }
}

/// An ordered walk over adjacent tiles starting at [`Path::start`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    tiles: Vec<TileId>,
}

impl Path {
    /// A zero-move path sitting on `start`.
    pub fn new(start: TileId) -> Self {
        Path { tiles: vec![start] }
    }

    /// Builds a path from its tiles, start first. Returns `None` when empty.
    pub fn from_tiles(tiles: Vec<TileId>) -> Option<Self> {
        (!tiles.is_empty()).then_some(Path { tiles })
    }

    pub fn push(&mut self, tile: TileId) {
        self.tiles.push(tile);
    }

    #[inline]
    pub fn start(&self) -> TileId {
        self.tiles[0]
    }

    #[inline]
    pub fn tail(&self) -> TileId {
        self.tiles[self.tiles.len() - 1]
    }

    /// Number of moves (one fewer than the number of tiles).
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len() - 1
    }

    /// True for a path with no moves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.len() <= 1
    }

    /// Tiles in walk order, start included.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    /// The `index`-th move of the path.
    pub fn move_at(&self, index: usize) -> Option<Move> {
        (index < self.len()).then(|| Move::new(self.tiles[index], self.tiles[index + 1]))
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.tiles.windows(2).map(|pair| Move::new(pair[0], pair[1]))
    }

    /// Human-readable `(x,y)->(x,y)` form for logging.
    pub fn describe(&self, board: &Board) -> String {
        self.tiles
            .iter()
            .map(|&id| {
                let tile = board.tile(id);
                format!("({},{})", tile.x, tile.y)
            })
            .collect::<Vec<_>>()
            .join("->")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tile) in self.tiles.iter().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{}", tile)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_follow_tiles() {
        let path = Path::from_tiles(vec![0, 1, 4]).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.start(), 0);
        assert_eq!(path.tail(), 4);
        let moves: Vec<_> = path.moves().collect();
        assert_eq!(moves, vec![Move::new(0, 1), Move::new(1, 4)]);
        assert_eq!(path.move_at(1), Some(Move::new(1, 4)));
        assert_eq!(path.move_at(2), None);
    }

    #[test]
    fn single_tile_path_is_empty() {
        let path = Path::new(5);
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.moves().count(), 0);
        assert!(Path::from_tiles(Vec::new()).is_none());
    }

    #[test]
    fn display_joins_ids() {
        let path = Path::from_tiles(vec![3, 2, 1]).unwrap();
        assert_eq!(path.to_string(), "3->2->1");
    }

    #[test]
    fn describe_uses_coordinates() {
        let board = Board::new(3, 2, 1);
        let path = Path::from_tiles(vec![0, 1, 4]).unwrap();
        assert_eq!(path.describe(&board), "(0,0)->(1,0)->(1,1)");
    }
}
