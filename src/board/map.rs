//! Rectangular board of tiles with four-way adjacency.
//!
//! Neighbors are always listed in up, down, left, right order so that every
//! search over the board is deterministic.

use super::tile::{PlayerId, Tile, TileId};

/// A rectangular game board.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    turn: u32,
    tiles: Vec<Tile>,
    /// In-bounds neighbors per tile, up/down/left/right. Mountains included.
    adjacent: Vec<Vec<TileId>>,
}

impl Board {
    /// Creates a board of empty neutral tiles.
    pub fn new(width: usize, height: usize, turn: u32) -> Self {
        let tiles = (0..width * height)
            .map(|id| Tile::new(id, id % width, id / width))
            .collect();
        Self::from_tiles(width, height, turn, tiles)
    }

    /// Builds a board from row-major tiles. Tile ids and positions are
    /// reassigned from each tile's index.
    pub fn from_tiles(width: usize, height: usize, turn: u32, mut tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        for (id, tile) in tiles.iter_mut().enumerate() {
            tile.id = id;
            tile.x = id % width;
            tile.y = id / width;
        }

        let mut adjacent = Vec::with_capacity(tiles.len());
        for id in 0..tiles.len() {
            let (x, y) = (id % width, id / width);
            let mut neighbors = Vec::with_capacity(4);
            if y > 0 {
                neighbors.push(id - width);
            }
            if y + 1 < height {
                neighbors.push(id + width);
            }
            if x > 0 {
                neighbors.push(id - 1);
            }
            if x + 1 < width {
                neighbors.push(id + 1);
            }
            adjacent.push(neighbors);
        }

        Board {
            width,
            height,
            turn,
            tiles,
            adjacent,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Current game turn.
    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Returns the tile id at `(x, y)`, if on the board.
    pub fn index(&self, x: usize, y: usize) -> Option<TileId> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Returns the tile with the given id.
    ///
    /// Panics if `id` is off the board; ids come from this board.
    #[inline]
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    #[inline]
    pub fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id]
    }

    /// Returns the tile at `(x, y)`, if on the board.
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        self.index(x, y).map(|id| &self.tiles[id])
    }

    /// Whether `id` names a tile on this board.
    #[inline]
    pub fn contains(&self, id: TileId) -> bool {
        id < self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// All in-bounds neighbors, obstacles included.
    #[inline]
    pub fn adjacent(&self, id: TileId) -> &[TileId] {
        &self.adjacent[id]
    }

    /// Neighbors an army could move onto from `id`.
    pub fn movable(&self, id: TileId) -> impl Iterator<Item = TileId> + '_ {
        self.adjacent[id]
            .iter()
            .copied()
            .filter(move |&n| self.tiles[n].is_pathable())
    }

    /// Ids of every tile owned by `player`.
    pub fn player_tiles(&self, player: PlayerId) -> impl Iterator<Item = TileId> + '_ {
        self.tiles
            .iter()
            .filter(move |t| t.player == Some(player))
            .map(|t| t.id)
    }

    /// The general of `player`, if visible.
    pub fn general_of(&self, player: PlayerId) -> Option<TileId> {
        self.tiles
            .iter()
            .find(|t| t.is_general && t.player == Some(player))
            .map(|t| t.id)
    }

    /// Marks a tile as a mountain.
    pub fn set_mountain(&mut self, id: TileId) {
        let tile = &mut self.tiles[id];
        tile.is_mountain = true;
        tile.player = None;
        tile.army = 0;
        tile.is_city = false;
        tile.is_general = false;
    }

    /// Places a general for `player` with the given army.
    pub fn set_general(&mut self, id: TileId, player: PlayerId, army: i32) {
        let tile = &mut self.tiles[id];
        tile.player = Some(player);
        tile.army = army;
        tile.is_general = true;
        tile.is_mountain = false;
    }

    /// Gives `player` ownership of a tile.
    pub fn set_owner(&mut self, id: TileId, player: Option<PlayerId>, army: i32) {
        let tile = &mut self.tiles[id];
        tile.player = player;
        tile.army = army;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_ordered_up_down_left_right() {
        let board = Board::new(3, 3, 1);
        let center = board.index(1, 1).unwrap();
        let expected = vec![
            board.index(1, 0).unwrap(),
            board.index(1, 2).unwrap(),
            board.index(0, 1).unwrap(),
            board.index(2, 1).unwrap(),
        ];
        assert_eq!(board.adjacent(center), expected.as_slice());
    }

    #[test]
    fn corner_has_two_neighbors() {
        let board = Board::new(4, 3, 1);
        assert_eq!(board.adjacent(0).len(), 2);
        let last = board.index(3, 2).unwrap();
        assert_eq!(board.adjacent(last).len(), 2);
    }

    #[test]
    fn movable_skips_mountains() {
        let mut board = Board::new(3, 1, 1);
        board.set_mountain(2);
        let moves: Vec<_> = board.movable(1).collect();
        assert_eq!(moves, vec![0], "Mountain at 2 should not be movable");
    }

    #[test]
    fn index_out_of_bounds_is_none() {
        let board = Board::new(2, 2, 1);
        assert!(board.index(2, 0).is_none());
        assert!(board.index(0, 2).is_none());
        assert!(board.tile_at(5, 5).is_none());
    }

    #[test]
    fn general_lookup_by_player() {
        let mut board = Board::new(3, 3, 1);
        board.set_general(4, 0, 1);
        board.set_general(8, 1, 1);
        assert_eq!(board.general_of(0), Some(4));
        assert_eq!(board.general_of(1), Some(8));
        assert_eq!(board.general_of(2), None);
        assert_eq!(board.player_tiles(0).collect::<Vec<_>>(), vec![4]);
    }
}
