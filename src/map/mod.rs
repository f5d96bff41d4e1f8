//! Occupancy map adapter.
//!
//! The localizer never owns a map representation. It consumes any type
//! implementing [`OccupancyMap`]: grid validity, world↔grid conversion,
//! free-space classification and the precomputed distance to the nearest
//! obstacle.
//!
//! [`GridMap`] is an in-memory implementation backed by a dense cell array
//! and a BFS distance field. It is used by the replay binary and the tests.

mod grid_map;

pub use grid_map::{GridMap, GridMapConfig, MapLoadError};

/// Cell occupancy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Unknown (never observed)
    Unknown,
    /// Free space (definitely empty)
    Free,
    /// Occupied (definitely contains obstacle)
    Occupied,
}

/// Read-only view of an occupancy grid as needed by the localizer.
///
/// Grid coordinates are signed so callers can probe outside the map and
/// check [`is_valid_cell`](OccupancyMap::is_valid_cell) afterwards.
pub trait OccupancyMap: Sync {
    /// Grid dimensions (width, height) in cells.
    fn dimensions(&self) -> (usize, usize);

    /// Cell size in meters.
    fn resolution(&self) -> f64;

    /// Check if grid coordinates lie inside the map.
    fn is_valid_cell(&self, cx: i32, cy: i32) -> bool;

    /// Convert world coordinates to (possibly out of bounds) grid coordinates.
    fn world_to_grid(&self, x: f64, y: f64) -> (i32, i32);

    /// World coordinates of the center of a cell.
    fn grid_to_world(&self, cx: usize, cy: usize) -> (f64, f64);

    /// Whether a valid cell is classified as free space.
    fn is_free(&self, cx: usize, cy: usize) -> bool;

    /// Distance in meters from a valid cell to the nearest obstacle.
    fn obstacle_distance(&self, cx: usize, cy: usize) -> f64;

    /// Distance value used for off-map lookups.
    fn max_obstacle_distance(&self) -> f64;
}
