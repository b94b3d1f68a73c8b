//! Per-tile value matrix (distances, tie-break weights).

use std::ops::{Index, IndexMut};

use super::tile::TileId;

/// One value per board tile, indexed by [`TileId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMatrix<T> {
    values: Vec<T>,
}

impl<T: Clone> TileMatrix<T> {
    /// Creates a matrix of `len` copies of `fill`.
    pub fn filled(len: usize, fill: T) -> Self {
        TileMatrix {
            values: vec![fill; len],
        }
    }
}

impl<T> TileMatrix<T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        TileMatrix { values }
    }

    /// Number of tiles covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> Index<TileId> for TileMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, tile: TileId) -> &T {
        &self.values[tile]
    }
}

impl<T> IndexMut<TileId> for TileMatrix<T> {
    #[inline]
    fn index_mut(&mut self, tile: TileId) -> &mut T {
        &mut self.values[tile]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_matrix_indexes_by_tile() {
        let mut matrix = TileMatrix::filled(4, 0i32);
        matrix[2] = 7;
        assert_eq!(matrix[2], 7);
        assert_eq!(matrix.iter().sum::<i32>(), 7);
        assert_eq!(matrix.len(), 4);
    }
}
