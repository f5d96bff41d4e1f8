//! Test utilities for the Markov localizer.
//!
//! Maps, synthetic scans, and small configurations that keep the belief
//! to a few thousand samples.

#![allow(dead_code)]

use std::f64::consts::TAU;

use dhruva_markov::config::MarkovConfig;
use dhruva_markov::map::{CellState, GridMap, GridMapConfig, OccupancyMap};
use dhruva_markov::{LaserScan, Pose2D};

/// Resolution used by every test map.
pub const RESOLUTION: f64 = 0.1;

/// Map configuration at [`RESOLUTION`].
pub fn map_config() -> GridMapConfig {
    GridMapConfig {
        resolution: RESOLUTION,
        max_obstacle_distance: 1.0,
        ..Default::default()
    }
}

/// Fully free `width` x `height` grid.
pub fn free_map(width: usize, height: usize) -> GridMap {
    GridMap::free(map_config(), width, height).unwrap()
}

/// Walled room with an asymmetric block so poses are distinguishable.
///
/// 16 x 12 cells, block in the upper left.
pub fn room_map() -> GridMap {
    let text = "\
################
#..............#
#..###.........#
#..###.........#
#..............#
#..............#
#..............#
#..............#
#..........#...#
#..............#
#..............#
################
";
    GridMap::from_ascii(map_config(), text).unwrap()
}

/// Configuration with `bins` heading bins, a fixed seed and `workers`.
pub fn config(bins: usize, workers: usize) -> MarkovConfig {
    let mut config = MarkovConfig::default();
    config.grid.angular_resolution_deg = 360.0 / bins as f64;
    config.filter.workers = workers;
    config.filter.seed = 17;
    config.filter.cloud_size = 200;
    config.map = map_config();
    config
}

/// Scan with every beam at the maximum range.
pub fn max_range_scan(beams: usize, range_max: f64) -> LaserScan {
    let increment = TAU / beams as f64;
    LaserScan::new(
        -std::f64::consts::PI,
        -std::f64::consts::PI + increment * (beams - 1) as f64,
        increment,
        0.05,
        range_max,
        vec![range_max; beams],
    )
}

/// Ray-cast a 360 degree scan from `pose` against the occupied cells of
/// `map`. Rays that leave the map or exceed `range_max` report `range_max`.
pub fn simulate_scan(map: &GridMap, pose: &Pose2D, beams: usize, range_max: f64) -> LaserScan {
    let mut scan = max_range_scan(beams, range_max);
    let step = map.resolution() * 0.25;

    for i in 0..beams {
        let angle = pose.theta + scan.bearing(i);
        let (sin, cos) = angle.sin_cos();
        let mut range = 0.0;
        while range < range_max {
            let (cx, cy) = map.world_to_grid(pose.x + range * cos, pose.y + range * sin);
            if !map.is_valid_cell(cx, cy) {
                range = range_max;
                break;
            }
            if map.get_state(cx as usize, cy as usize) == CellState::Occupied {
                break;
            }
            range += step;
        }
        scan.ranges[i] = range.min(range_max);
    }
    scan
}
