//! Likelihood field sensor model.
//!
//! Scores a range scan against the map by looking up, for each beam
//! endpoint, the distance to the nearest obstacle. The per-beam probability
//! mixes an (unnormalized) Gaussian hit term with a uniform random term:
//!
//! ```text
//! p = z_hit · exp(-d² / 2σ²) + z_rand / range_max
//! ```
//!
//! Beams are combined as a sum of logs. Readings at or beyond `range_max`
//! and NaN readings carry no information and are skipped.

use serde::{Deserialize, Serialize};

use crate::core::types::{LaserScan, Pose2D};
use crate::map::OccupancyMap;

use super::error::{LocalizationError, Result};

/// Configuration for the sensor model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModelConfig {
    /// Standard deviation of the hit model (meters).
    pub sigma_hit: f64,

    /// Weight of the hit model.
    pub z_hit: f64,

    /// Weight of the uniform random model.
    pub z_rand: f64,

    /// Maximum number of beams evaluated per scan.
    pub max_beams: usize,

    /// Overrides the scan's `range_max` when set.
    pub max_range: Option<f64>,

    /// Laser mounting pose in the robot frame.
    pub laser_offset: Pose2D,
}

impl Default for SensorModelConfig {
    fn default() -> Self {
        Self {
            sigma_hit: 0.2,
            z_hit: 0.95,
            z_rand: 0.05,
            max_beams: 30,
            max_range: None,
            laser_offset: Pose2D::identity(),
        }
    }
}

impl SensorModelConfig {
    /// Create a fast configuration (fewer beams).
    pub fn fast() -> Self {
        Self {
            max_beams: 15,
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if !(self.sigma_hit.is_finite() && self.sigma_hit > 0.0) {
            return Err(format!("sigma_hit must be > 0: {}", self.sigma_hit));
        }
        if self.z_hit < 0.0 || self.z_rand < 0.0 {
            return Err(format!(
                "z_hit and z_rand must be >= 0: {} / {}",
                self.z_hit, self.z_rand
            ));
        }
        if self.max_beams < 2 {
            return Err(format!("max_beams must be >= 2: {}", self.max_beams));
        }
        if let Some(max_range) = self.max_range {
            if !(max_range.is_finite() && max_range > 0.0) {
                return Err(format!("max_range must be > 0: {max_range}"));
            }
            let peak = self.z_hit + self.z_rand / max_range;
            if peak > 1.0 {
                return Err(format!(
                    "z_hit + z_rand / max_range = {peak} exceeds 1, beam probabilities would leave [0, 1]"
                ));
            }
        }
        Ok(())
    }
}

/// Likelihood field model over any [`OccupancyMap`].
///
/// The distance field lives in the map; the model only holds parameters.
#[derive(Debug, Clone)]
pub struct LikelihoodFieldModel {
    config: SensorModelConfig,
    hit_denominator: f64,
}

impl LikelihoodFieldModel {
    /// Create a new likelihood field model.
    pub fn new(config: SensorModelConfig) -> Self {
        Self {
            config,
            hit_denominator: 2.0 * config.sigma_hit * config.sigma_hit,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SensorModelConfig {
        &self.config
    }

    /// Range beyond which readings are ignored for this scan.
    #[inline]
    pub fn range_max(&self, scan: &LaserScan) -> f64 {
        self.config.max_range.unwrap_or(scan.range_max)
    }

    /// Beam stride so that at most `max_beams` beams are used.
    #[inline]
    pub fn beam_step(&self, range_count: usize) -> usize {
        let divisor = self.config.max_beams.saturating_sub(1).max(1);
        (range_count.saturating_sub(1) / divisor).max(1)
    }

    /// Probability of a single beam whose endpoint lies `distance` meters
    /// from the nearest obstacle.
    #[inline]
    pub fn beam_probability(&self, distance: f64, range_max: f64) -> f64 {
        self.config.z_hit * (-(distance * distance) / self.hit_denominator).exp()
            + self.config.z_rand / range_max
    }

    /// Sum of per-beam log probabilities of `scan` taken from `pose`.
    ///
    /// Fails with [`LocalizationError::SensorModelRangeError`] on the first
    /// beam probability outside `[0, 1]`.
    pub fn log_likelihood<M: OccupancyMap + ?Sized>(
        &self,
        scan: &LaserScan,
        pose: &Pose2D,
        map: &M,
    ) -> Result<f64> {
        let range_max = self.range_max(scan);
        let step = self.beam_step(scan.len());
        let laser = pose.compose(&self.config.laser_offset);

        let mut log_likelihood = 0.0;
        for i in (0..scan.len()).step_by(step) {
            let range = scan.ranges[i];
            if range.is_nan() || range >= range_max {
                continue;
            }

            let angle = laser.theta + scan.bearing(i);
            let (cx, cy) =
                map.world_to_grid(laser.x + range * angle.cos(), laser.y + range * angle.sin());

            // Off-map endpoints are penalized as far from any obstacle
            let distance = if map.is_valid_cell(cx, cy) {
                map.obstacle_distance(cx as usize, cy as usize)
            } else {
                map.max_obstacle_distance()
            };

            let p = self.beam_probability(distance, range_max);
            if !(0.0..=1.0).contains(&p) {
                return Err(LocalizationError::SensorModelRangeError { probability: p });
            }
            log_likelihood += p.ln();
        }

        Ok(log_likelihood)
    }
}
