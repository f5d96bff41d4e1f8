//! Discretized belief store.
//!
//! The belief is a weight per discretized pose `(free_index, heading_bin)`.
//! Two generation buffers alternate roles: the motion update reads
//! `previous` and writes `current`, the sensor update reweights `current` in
//! place. A successful cycle ends with [`BeliefStore::swap_generations`], so
//! between cycles `previous` always holds the latest belief.
//!
//! ```text
//! sample index = free_index * num_headings + heading_bin
//! ```

use std::f64::consts::PI;

use crate::core::math::normalize_angle;
use crate::core::types::Pose2D;

use super::free_space::FreeSpaceIndex;

/// Uniform heading discretization over [-π, π).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingBins {
    count: usize,
    resolution: f64,
}

impl HeadingBins {
    /// Create bins from an angular resolution in degrees.
    ///
    /// The bin count is `round(360 / resolution_deg)`, at least one.
    pub fn from_degrees(resolution_deg: f64) -> Self {
        let count = ((360.0 / resolution_deg).round() as usize).max(1);
        Self::new(count)
    }

    /// Create `count` evenly spaced bins.
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        Self {
            count,
            resolution: 2.0 * PI / count as f64,
        }
    }

    /// Number of bins.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Bin width in radians.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Heading of a bin center.
    #[inline]
    pub fn angle(&self, bin: usize) -> f64 {
        -PI + bin as f64 * self.resolution
    }

    /// Nearest bin for a heading.
    #[inline]
    pub fn bin(&self, theta: f64) -> usize {
        let shifted = (normalize_angle(theta) + PI) / self.resolution;
        (shifted.round() as usize) % self.count
    }
}

/// Identifier of a discretized pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscretizedPose {
    pub free_index: usize,
    pub heading_bin: usize,
}

/// A pose with an importance weight.
///
/// Implemented by grid samples and by resampled particles so that the
/// sensor update runs over either.
pub trait WeightedPose: Send {
    fn pose(&self) -> &Pose2D;
    fn weight(&self) -> f64;
    fn set_weight(&mut self, weight: f64);

    /// Record the log-likelihood of the last observation.
    fn set_log_weight(&mut self, _log_weight: f64) {}
}

/// One slot of a generation buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    /// Continuous pose of the discretized cell (cell center, bin heading).
    pub pose: Pose2D,
    /// Relative (unnormalized) probability mass.
    pub weight: f64,
    /// Sum of per-beam log-likelihoods from the last sensor update.
    pub log_weight: f64,
}

impl WeightedPose for WeightedSample {
    #[inline]
    fn pose(&self) -> &Pose2D {
        &self.pose
    }

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    #[inline]
    fn set_log_weight(&mut self, log_weight: f64) {
        self.log_weight = log_weight;
    }
}

/// Double-buffered discretized belief.
#[derive(Debug, Clone)]
pub struct BeliefStore {
    headings: HeadingBins,
    num_cells: usize,
    generations: [Vec<WeightedSample>; 2],
    current: usize,
}

impl BeliefStore {
    /// Allocate both generations with a uniform belief.
    pub fn new(free_space: &FreeSpaceIndex, headings: HeadingBins) -> Self {
        let num_cells = free_space.len();
        let total = num_cells * headings.count();
        let uniform = if total > 0 { 1.0 / total as f64 } else { 0.0 };

        let mut samples = Vec::with_capacity(total);
        for free_index in 0..num_cells {
            let (x, y) = free_space.position(free_index);
            for bin in 0..headings.count() {
                samples.push(WeightedSample {
                    pose: Pose2D::new(x, y, headings.angle(bin)),
                    weight: uniform,
                    log_weight: 0.0,
                });
            }
        }

        Self {
            headings,
            num_cells,
            generations: [samples.clone(), samples],
            current: 0,
        }
    }

    /// Heading discretization.
    #[inline]
    pub fn headings(&self) -> HeadingBins {
        self.headings
    }

    /// Number of free cells covered.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Samples per generation (`num_cells * num_headings`).
    #[inline]
    pub fn len(&self) -> usize {
        self.num_cells * self.headings.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dense sample index of a discretized pose.
    #[inline]
    pub fn sample_index(&self, pose: DiscretizedPose) -> usize {
        pose.free_index * self.headings.count() + pose.heading_bin
    }

    /// Discretized pose of a dense sample index.
    #[inline]
    pub fn discretized(&self, sample: usize) -> DiscretizedPose {
        DiscretizedPose {
            free_index: sample / self.headings.count(),
            heading_bin: sample % self.headings.count(),
        }
    }

    /// Generation being written by the running cycle.
    #[inline]
    pub fn current(&self) -> &[WeightedSample] {
        &self.generations[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut [WeightedSample] {
        &mut self.generations[self.current]
    }

    /// Generation read by the motion update (the latest completed belief).
    #[inline]
    pub fn previous(&self) -> &[WeightedSample] {
        &self.generations[1 - self.current]
    }

    /// Latest completed belief. Between cycles this is the previous
    /// generation.
    #[inline]
    pub fn latest(&self) -> &[WeightedSample] {
        self.previous()
    }

    /// Read the previous generation while writing the current one.
    pub fn split_mut(&mut self) -> (&[WeightedSample], &mut [WeightedSample]) {
        let [first, second] = &mut self.generations;
        if self.current == 0 {
            (second.as_slice(), first.as_mut_slice())
        } else {
            (first.as_slice(), second.as_mut_slice())
        }
    }

    /// Exchange the roles of the two generations.
    #[inline]
    pub fn swap_generations(&mut self) {
        self.current = 1 - self.current;
    }

    /// Copy the previous generation's weights into the current one.
    pub fn carry_forward(&mut self) {
        let (previous, current) = self.split_mut();
        for (dst, src) in current.iter_mut().zip(previous) {
            dst.weight = src.weight;
            dst.log_weight = src.log_weight;
        }
    }

    /// Reset both generations to the uniform belief.
    pub fn reset_uniform(&mut self) {
        let total = self.len();
        if total == 0 {
            return;
        }
        let uniform = 1.0 / total as f64;
        for generation in &mut self.generations {
            for sample in generation.iter_mut() {
                sample.weight = uniform;
                sample.log_weight = 0.0;
            }
        }
    }
}
