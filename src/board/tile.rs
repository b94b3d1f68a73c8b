//! Tile type: the smallest unit of territory on the board.

use serde::{Deserialize, Serialize};

/// Stable index of a tile within its board (row-major).
pub type TileId = usize;

/// Player index. Neutral tiles carry `None`.
pub type PlayerId = usize;

/// A single board tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub x: usize,
    pub y: usize,
    /// Owning player, or `None` for neutral tiles.
    pub player: Option<PlayerId>,
    /// Army standing on the tile. Never negative.
    pub army: i32,
    pub is_city: bool,
    pub is_general: bool,
    pub is_mountain: bool,
}

impl Tile {
    /// Creates an empty neutral tile.
    pub fn new(id: TileId, x: usize, y: usize) -> Self {
        Tile {
            id,
            x,
            y,
            player: None,
            army: 0,
            is_city: false,
            is_general: false,
            is_mountain: false,
        }
    }

    /// Whether an army may ever move onto this tile.
    #[inline]
    pub fn is_pathable(&self) -> bool {
        !self.is_mountain
    }

    #[inline]
    pub fn is_neutral(&self) -> bool {
        self.player.is_none()
    }

    /// Neutral cities hold large garrisons and are never expansion targets.
    #[inline]
    pub fn is_neutral_city(&self) -> bool {
        self.is_city && self.player.is_none()
    }

    /// A neutral, empty, non-city, pathable tile: the cheapest possible capture.
    #[inline]
    pub fn is_open_neutral(&self) -> bool {
        self.player.is_none() && self.army == 0 && !self.is_city && !self.is_mountain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_open_neutral() {
        let tile = Tile::new(3, 1, 2);
        assert!(tile.is_open_neutral());
        assert!(tile.is_pathable());
        assert!(!tile.is_neutral_city());
    }

    #[test]
    fn neutral_city_is_not_open() {
        let mut tile = Tile::new(0, 0, 0);
        tile.is_city = true;
        tile.army = 40;
        assert!(tile.is_neutral_city());
        assert!(!tile.is_open_neutral());

        tile.player = Some(1);
        assert!(!tile.is_neutral_city(), "Owned cities are not neutral cities");
    }

    #[test]
    fn mountains_are_not_pathable() {
        let mut tile = Tile::new(0, 0, 0);
        tile.is_mountain = true;
        assert!(!tile.is_pathable());
        assert!(!tile.is_open_neutral());
    }
}
