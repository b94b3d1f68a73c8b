//! Dense tile membership set.
//!
//! Planner recursion copies its owned-tile set at every branch, so the set
//! is a flat bit per tile rather than a hash set.

use super::tile::TileId;

/// A set of tiles on a board of fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    bits: Vec<bool>,
    len: usize,
}

impl TileSet {
    /// Creates an empty set sized for a board of `capacity` tiles.
    pub fn new(capacity: usize) -> Self {
        TileSet {
            bits: vec![false; capacity],
            len: 0,
        }
    }

    /// Creates a set holding `tiles`.
    pub fn from_tiles(capacity: usize, tiles: impl IntoIterator<Item = TileId>) -> Self {
        let mut set = TileSet::new(capacity);
        set.extend(tiles);
        set
    }

    /// Adds a tile. Returns `true` if it was not already present.
    #[inline]
    pub fn insert(&mut self, tile: TileId) -> bool {
        if self.bits[tile] {
            return false;
        }
        self.bits[tile] = true;
        self.len += 1;
        true
    }

    #[inline]
    pub fn remove(&mut self, tile: TileId) -> bool {
        if !self.bits[tile] {
            return false;
        }
        self.bits[tile] = false;
        self.len -= 1;
        true
    }

    #[inline]
    pub fn contains(&self, tile: TileId) -> bool {
        self.bits.get(tile).copied().unwrap_or(false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Board size this set was created for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(id, &present)| present.then_some(id))
    }
}

impl Extend<TileId> for TileSet {
    fn extend<I: IntoIterator<Item = TileId>>(&mut self, iter: I) {
        for tile in iter {
            self.insert(tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_tracks_length() {
        let mut set = TileSet::new(10);
        assert!(set.insert(3));
        assert!(!set.insert(3), "Second insert of the same tile should report false");
        assert!(set.insert(7));
        assert_eq!(set.len(), 2);
        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn contains_out_of_range_is_false() {
        let set = TileSet::from_tiles(4, [0, 1]);
        assert!(set.contains(1));
        assert!(!set.contains(2));
        assert!(!set.contains(99));
    }

    #[test]
    fn clones_are_independent() {
        let original = TileSet::from_tiles(5, [1]);
        let mut copy = original.clone();
        copy.insert(4);
        assert!(!original.contains(4), "Mutating a copy must not touch the original");
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
