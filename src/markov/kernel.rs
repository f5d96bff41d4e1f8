//! Transition kernel builder.
//!
//! For one odometry step, precomputes the probability of moving from a
//! source pose `(dx, dy, θ_source)` to the destination pose
//! `(0, 0, θ_destination)` for every heading pair and every offset in a
//! bounded spatial window.
//!
//! # Layout
//!
//! ```text
//! rows[destination][source * window_cells + offset]
//!
//! offsets (window_size = 2m + 1, spacing = map resolution):
//!   offset index = i * window_size + j  →  (side[i], side[j])
//!   side = [-m·res, …, 0, …, m·res]
//! ```
//!
//! Rows are independent, so they are built in parallel, one contiguous
//! block of destination headings per worker.

use crate::core::math::angle_diff;

use super::belief::HeadingBins;
use super::error::{LocalizationError, Result};
use super::motion_model::{MotionDecomposition, MotionModel};
use super::workers::WorkerPool;

/// Precomputed transition probabilities for one odometry step.
#[derive(Debug, Clone)]
pub struct TransitionKernel {
    num_headings: usize,
    window_size: usize,
    offsets: Vec<(f64, f64)>,
    rows: Vec<Vec<f64>>,
    observed: MotionDecomposition,
}

impl TransitionKernel {
    /// Number of heading bins.
    #[inline]
    pub fn num_headings(&self) -> usize {
        self.num_headings
    }

    /// Side length of the square offset window, in cells.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Relative world offsets `(dx, dy)` of the window, by offset index.
    #[inline]
    pub fn offsets(&self) -> &[(f64, f64)] {
        &self.offsets
    }

    /// Motion decomposition the kernel was built for.
    pub fn observed(&self) -> &MotionDecomposition {
        &self.observed
    }

    /// Probability matrix for a heading pair, indexed by offset.
    #[inline]
    pub fn matrix(&self, destination: usize, source: usize) -> &[f64] {
        let cells = self.offsets.len();
        &self.rows[destination][source * cells..(source + 1) * cells]
    }

    /// Probability of reaching `destination` heading at the window center
    /// from `source` heading at `offset`.
    #[inline]
    pub fn probability(&self, destination: usize, source: usize, offset: usize) -> f64 {
        self.rows[destination][source * self.offsets.len() + offset]
    }

    /// Total probability leaving a source heading, over all destinations.
    pub fn outgoing_mass(&self, source: usize) -> f64 {
        (0..self.num_headings)
            .map(|d| self.matrix(d, source).iter().sum::<f64>())
            .sum()
    }
}

/// Builds [`TransitionKernel`]s for a fixed heading discretization.
#[derive(Debug, Clone)]
pub struct KernelBuilder {
    model: MotionModel,
    headings: HeadingBins,
    resolution: f64,
}

impl KernelBuilder {
    /// Create a builder for a map resolution and heading discretization.
    pub fn new(model: MotionModel, headings: HeadingBins, resolution: f64) -> Self {
        Self {
            model,
            headings,
            resolution,
        }
    }

    /// Motion model used for evaluation.
    pub fn model(&self) -> &MotionModel {
        &self.model
    }

    /// Offsets at map resolution covering `[-radius, radius]` on one axis.
    ///
    /// Always contains 0, so the window is never empty.
    pub fn window_side(&self, radius: f64) -> Vec<f64> {
        let steps = self.window_steps(radius) as i64;
        (-steps..=steps)
            .map(|i| i as f64 * self.resolution)
            .collect()
    }

    /// Side length in cells of the window for `radius`.
    pub fn window_cells(&self, radius: f64) -> usize {
        let steps = self.window_steps(radius);
        steps.saturating_mul(2).saturating_add(1)
    }

    fn window_steps(&self, radius: f64) -> usize {
        // Saturating float-to-int cast; NaN maps to zero
        (radius / self.resolution + 1e-9).floor().max(0.0) as usize
    }

    /// Build the kernel for an observed motion.
    ///
    /// Fails with [`LocalizationError::KernelWindowTooLarge`] before any
    /// allocation if the window side exceeds the configured maximum, and
    /// with [`LocalizationError::DegenerateTransitionKernel`] if any
    /// heading pair receives zero total probability. On success the kernel
    /// is normalized so that the mass leaving each source heading sums to
    /// one.
    pub fn build(
        &self,
        observed: &MotionDecomposition,
        pool: &WorkerPool,
    ) -> Result<TransitionKernel> {
        let radius = self.model.window_radius(observed);
        let max = self.model.config().max_window_cells;
        let window_size = self.window_cells(radius);
        if window_size > max {
            log::warn!(
                "Kernel window {}x{} for trans={:.3} exceeds limit {}x{}",
                window_size,
                window_size,
                observed.trans,
                max,
                max
            );
            return Err(LocalizationError::KernelWindowTooLarge {
                window: window_size,
                max,
            });
        }
        let side = self.window_side(radius);
        let offsets: Vec<(f64, f64)> = side
            .iter()
            .flat_map(|&x| side.iter().map(move |&y| (x, y)))
            .collect();

        let num_headings = self.headings.count();
        let cells = offsets.len();
        let angles: Vec<f64> = (0..num_headings).map(|b| self.headings.angle(b)).collect();

        log::debug!(
            "Building kernel: rot1={:.4} trans={:.4} rot2={:.4} radius={:.3} window={}x{}",
            observed.rot1,
            observed.trans,
            observed.rot2,
            radius,
            window_size,
            window_size
        );

        let mut rows: Vec<Vec<f64>> = vec![Vec::new(); num_headings];
        let degenerate: Vec<Vec<(usize, usize)>> = pool.run_chunks(&mut rows, |start, chunk| {
            let mut zero_pairs = Vec::new();
            for (k, row) in chunk.iter_mut().enumerate() {
                let destination = start + k;
                let theta_dst = angles[destination];
                row.reserve_exact(num_headings * cells);

                for (source, &theta_src) in angles.iter().enumerate() {
                    let heading_change = angle_diff(theta_src, theta_dst);
                    let mut matrix_sum = 0.0;
                    for &(ox, oy) in &offsets {
                        let hyp = hypothesis(-ox, -oy, theta_src, heading_change);
                        let p = self.model.probability(observed, &hyp);
                        matrix_sum += p;
                        row.push(p);
                    }
                    if matrix_sum <= 0.0 {
                        zero_pairs.push((destination, source));
                    }
                }
            }
            zero_pairs
        });

        let degenerate: Vec<(usize, usize)> = degenerate.into_iter().flatten().collect();
        if let Some(&(destination_heading, source_heading)) = degenerate.first() {
            log::warn!(
                "Degenerate transition kernel: {} heading pairs with zero mass (first {:?})",
                degenerate.len(),
                (destination_heading, source_heading)
            );
            return Err(LocalizationError::DegenerateTransitionKernel {
                destination_heading,
                source_heading,
                count: degenerate.len(),
            });
        }

        let mut kernel = TransitionKernel {
            num_headings,
            window_size,
            offsets,
            rows,
            observed: *observed,
        };
        normalize_per_source(&mut kernel);
        Ok(kernel)
    }
}

/// Decomposition of a move by `(dx, dy)` starting at `theta_src` and turning
/// by `heading_change` overall.
#[inline]
fn hypothesis(dx: f64, dy: f64, theta_src: f64, heading_change: f64) -> MotionDecomposition {
    MotionDecomposition::from_components(dx, dy, theta_src, theta_src + heading_change)
}

/// Scale so that every source heading distributes exactly unit mass.
fn normalize_per_source(kernel: &mut TransitionKernel) {
    let cells = kernel.offsets.len();
    let mut sums = vec![0.0; kernel.num_headings];
    for row in &kernel.rows {
        for (source, sum) in sums.iter_mut().enumerate() {
            *sum += row[source * cells..(source + 1) * cells].iter().sum::<f64>();
        }
    }

    for row in &mut kernel.rows {
        for (source, sum) in sums.iter().enumerate() {
            let scale = 1.0 / sum;
            for p in &mut row[source * cells..(source + 1) * cells] {
                *p *= scale;
            }
        }
    }
}
