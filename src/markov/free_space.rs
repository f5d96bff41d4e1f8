//! Dense index over the free cells of a map.
//!
//! The discretized belief only covers free space. Free cells are numbered
//! `0..len()` in row-major order (y outer, x inner) and an inverse table maps
//! grid coordinates back to that dense index.

use crate::map::OccupancyMap;

/// Bidirectional mapping between free grid cells and dense indices.
#[derive(Debug, Clone)]
pub struct FreeSpaceIndex {
    width: usize,
    height: usize,
    /// Grid coordinates of each free cell, by dense index.
    coordinates: Vec<(usize, usize)>,
    /// World position (cell center) of each free cell, by dense index.
    positions: Vec<(f64, f64)>,
    /// Dense index per grid cell (row-major), `None` for non-free cells.
    lookup: Vec<Option<u32>>,
}

impl FreeSpaceIndex {
    /// Enumerate every free cell of `map`.
    pub fn build<M: OccupancyMap + ?Sized>(map: &M) -> Self {
        let (width, height) = map.dimensions();
        let mut coordinates = Vec::new();
        let mut positions = Vec::new();
        let mut lookup = vec![None; width * height];

        for cy in 0..height {
            for cx in 0..width {
                if map.is_free(cx, cy) {
                    lookup[cy * width + cx] = Some(coordinates.len() as u32);
                    coordinates.push((cx, cy));
                    positions.push(map.grid_to_world(cx, cy));
                }
            }
        }

        log::debug!(
            "Free-space index: {} free cells of {}x{}",
            coordinates.len(),
            width,
            height
        );

        Self {
            width,
            height,
            coordinates,
            positions,
            lookup,
        }
    }

    /// Number of free cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Whether the map has no free cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Dimensions (width, height) of the indexed map.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Dense index of a grid cell, if it is free.
    #[inline]
    pub fn to_index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return None;
        }
        self.lookup[cy as usize * self.width + cx as usize].map(|i| i as usize)
    }

    /// Grid coordinates of a dense index.
    #[inline]
    pub fn to_coordinate(&self, index: usize) -> (usize, usize) {
        self.coordinates[index]
    }

    /// World position (cell center) of a dense index.
    #[inline]
    pub fn position(&self, index: usize) -> (f64, f64) {
        self.positions[index]
    }

    /// All free cell coordinates in index order.
    pub fn coordinates(&self) -> &[(usize, usize)] {
        &self.coordinates
    }

    /// All free cell positions in index order.
    pub fn positions(&self) -> &[(f64, f64)] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{GridMap, GridMapConfig};

    fn map() -> GridMap {
        let text = "\
####
#..#
#.##
####
";
        GridMap::from_ascii(GridMapConfig::default(), text).unwrap()
    }

    #[test]
    fn test_enumerates_free_cells_row_major() {
        let index = FreeSpaceIndex::build(&map());
        assert_eq!(index.len(), 3);
        // Row y=1 is the "#.##" line, row y=2 is "#..#"
        assert_eq!(index.coordinates(), &[(1, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_lookup_roundtrip() {
        let index = FreeSpaceIndex::build(&map());
        for i in 0..index.len() {
            let (cx, cy) = index.to_coordinate(i);
            assert_eq!(index.to_index(cx as i32, cy as i32), Some(i));
        }
    }

    #[test]
    fn test_non_free_and_out_of_bounds() {
        let index = FreeSpaceIndex::build(&map());
        assert_eq!(index.to_index(0, 0), None);
        assert_eq!(index.to_index(-1, 2), None);
        assert_eq!(index.to_index(2, 7), None);
    }

    #[test]
    fn test_positions_are_cell_centers() {
        let map = map();
        let index = FreeSpaceIndex::build(&map);
        assert_eq!(index.position(0), map.grid_to_world(1, 1));
    }
}
