//! Dense occupancy grid with a precomputed obstacle distance field.
//!
//! # ASCII format
//!
//! ```text
//! ##########
//! #........#
//! #..??....#
//! ##########
//! ```
//!
//! `#` is occupied, `.` is free, anything else is unknown. The first line is
//! the top row (highest y), matching how map images are drawn.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CellState, OccupancyMap};

/// Map loading errors
#[derive(Error, Debug)]
pub enum MapLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty map")]
    Empty,

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Cell count {found} does not match {width}x{height}")]
    SizeMismatch {
        found: usize,
        width: usize,
        height: usize,
    },
}

/// Geometry and distance-field settings for a [`GridMap`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMapConfig {
    /// Cell size in meters.
    pub resolution: f64,

    /// World X coordinate of the lower-left corner of cell (0, 0).
    pub origin_x: f64,

    /// World Y coordinate of the lower-left corner of cell (0, 0).
    pub origin_y: f64,

    /// Distance field cap in meters. Also returned for off-map lookups.
    pub max_obstacle_distance: f64,
}

impl Default for GridMapConfig {
    fn default() -> Self {
        Self {
            resolution: 0.05,
            origin_x: 0.0,
            origin_y: 0.0,
            max_obstacle_distance: 2.0,
        }
    }
}

/// In-memory occupancy map.
///
/// Row-major storage: index = y * width + x
#[derive(Debug, Clone)]
pub struct GridMap {
    config: GridMapConfig,
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    distance_field: Vec<f64>,
}

impl GridMap {
    /// Create a map from explicit cell states.
    pub fn new(
        config: GridMapConfig,
        width: usize,
        height: usize,
        cells: Vec<CellState>,
    ) -> Result<Self, MapLoadError> {
        if width == 0 || height == 0 {
            return Err(MapLoadError::Empty);
        }
        if cells.len() != width * height {
            return Err(MapLoadError::SizeMismatch {
                found: cells.len(),
                width,
                height,
            });
        }

        let mut map = Self {
            config,
            width,
            height,
            cells,
            distance_field: Vec::new(),
        };
        map.compute_distance_field();
        Ok(map)
    }

    /// Create a map where every cell is free.
    pub fn free(config: GridMapConfig, width: usize, height: usize) -> Result<Self, MapLoadError> {
        Self::new(config, width, height, vec![CellState::Free; width * height])
    }

    /// Parse an ASCII map.
    pub fn from_ascii(config: GridMapConfig, text: &str) -> Result<Self, MapLoadError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).ok_or(MapLoadError::Empty)?;

        let mut cells = vec![CellState::Unknown; width * height];
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapLoadError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }
            let cy = height - 1 - row;
            for (cx, ch) in line.chars().enumerate() {
                cells[cy * width + cx] = match ch {
                    '#' => CellState::Occupied,
                    '.' => CellState::Free,
                    _ => CellState::Unknown,
                };
            }
        }

        Self::new(config, width, height, cells)
    }

    /// Load an ASCII map from a file.
    pub fn load<P: AsRef<Path>>(path: P, config: GridMapConfig) -> Result<Self, MapLoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ascii(config, &text)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GridMapConfig {
        &self.config
    }

    /// Get cell state.
    pub fn get_state(&self, cx: usize, cy: usize) -> CellState {
        if cx < self.width && cy < self.height {
            self.cells[cy * self.width + cx]
        } else {
            CellState::Unknown
        }
    }

    /// Count (free, occupied, unknown) cells.
    pub fn count_cells(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for cell in &self.cells {
            match cell {
                CellState::Free => counts.0 += 1,
                CellState::Occupied => counts.1 += 1,
                CellState::Unknown => counts.2 += 1,
            }
        }
        counts
    }

    /// Compute distance field from occupied cells using BFS.
    ///
    /// Each cell holds the distance to the nearest occupied cell, capped at
    /// `max_obstacle_distance`.
    fn compute_distance_field(&mut self) {
        let (width, height) = (self.width, self.height);
        let resolution = self.config.resolution;
        let max_dist = self.config.max_obstacle_distance;

        self.distance_field = vec![max_dist; width * height];

        // BFS from all occupied cells simultaneously
        let mut queue: VecDeque<(usize, usize, f64)> = VecDeque::new();
        for cy in 0..height {
            for cx in 0..width {
                if self.cells[cy * width + cx] == CellState::Occupied {
                    self.distance_field[cy * width + cx] = 0.0;
                    queue.push_back((cx, cy, 0.0));
                }
            }
        }

        let neighbors: [(i32, i32, f64); 8] = [
            (-1, 0, 1.0),
            (1, 0, 1.0),
            (0, -1, 1.0),
            (0, 1, 1.0),
            (-1, -1, std::f64::consts::SQRT_2),
            (1, -1, std::f64::consts::SQRT_2),
            (-1, 1, std::f64::consts::SQRT_2),
            (1, 1, std::f64::consts::SQRT_2),
        ];

        while let Some((cx, cy, dist)) = queue.pop_front() {
            // Stale entry, a shorter path was already found
            if dist > self.distance_field[cy * width + cx] + 1e-9 {
                continue;
            }

            for &(dx, dy, step) in &neighbors {
                let nx = cx as i32 + dx;
                let ny = cy as i32 + dy;
                if !self.is_valid_cell(nx, ny) {
                    continue;
                }
                let idx = ny as usize * width + nx as usize;
                let new_dist = dist + step * resolution;
                if new_dist < self.distance_field[idx] && new_dist < max_dist {
                    self.distance_field[idx] = new_dist;
                    queue.push_back((nx as usize, ny as usize, new_dist));
                }
            }
        }
    }
}

impl OccupancyMap for GridMap {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn resolution(&self) -> f64 {
        self.config.resolution
    }

    #[inline]
    fn is_valid_cell(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cy >= 0 && (cx as usize) < self.width && (cy as usize) < self.height
    }

    #[inline]
    fn world_to_grid(&self, x: f64, y: f64) -> (i32, i32) {
        let cx = ((x - self.config.origin_x) / self.config.resolution).floor() as i32;
        let cy = ((y - self.config.origin_y) / self.config.resolution).floor() as i32;
        (cx, cy)
    }

    #[inline]
    fn grid_to_world(&self, cx: usize, cy: usize) -> (f64, f64) {
        let x = self.config.origin_x + (cx as f64 + 0.5) * self.config.resolution;
        let y = self.config.origin_y + (cy as f64 + 0.5) * self.config.resolution;
        (x, y)
    }

    #[inline]
    fn is_free(&self, cx: usize, cy: usize) -> bool {
        self.get_state(cx, cy) == CellState::Free
    }

    #[inline]
    fn obstacle_distance(&self, cx: usize, cy: usize) -> f64 {
        if cx < self.width && cy < self.height {
            self.distance_field[cy * self.width + cx]
        } else {
            self.config.max_obstacle_distance
        }
    }

    fn max_obstacle_distance(&self) -> f64 {
        self.config.max_obstacle_distance
    }
}
