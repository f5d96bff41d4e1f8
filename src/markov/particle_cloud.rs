//! Continuous particle cloud produced by resampling the discretized belief.

use serde::{Deserialize, Serialize};

use crate::core::math::angle_diff;
use crate::core::types::{Covariance2D, Pose2D};

use super::belief::WeightedPose;

/// A single particle representing a possible robot pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Hypothesized robot pose.
    pub pose: Pose2D,
    /// Importance weight.
    pub weight: f64,
}

impl Particle {
    /// Create a new particle with unit weight.
    pub fn new(pose: Pose2D) -> Self {
        Self { pose, weight: 1.0 }
    }

    /// Create a new particle with specified weight.
    pub fn with_weight(pose: Pose2D, weight: f64) -> Self {
        Self { pose, weight }
    }
}

impl WeightedPose for Particle {
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
}

/// Fixed-size set of weighted particles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleCloud {
    particles: Vec<Particle>,
}

impl ParticleCloud {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Sum of particle weights.
    pub fn total_weight(&self) -> f64 {
        self.particles.iter().map(|p| p.weight).sum()
    }

    /// Scale weights to sum to one. Returns the previous total.
    ///
    /// A cloud with no usable weight is reset to uniform weights.
    pub fn normalize(&mut self) -> f64 {
        let total = self.total_weight();
        if total > 1e-300 && total.is_finite() {
            for p in &mut self.particles {
                p.weight /= total;
            }
        } else if !self.particles.is_empty() {
            let uniform = 1.0 / self.particles.len() as f64;
            for p in &mut self.particles {
                p.weight = uniform;
            }
        }
        total
    }

    /// Weighted mean pose, with a circular mean for the heading.
    ///
    /// Falls back to the unweighted mean if all weights are zero.
    pub fn mean(&self) -> Option<Pose2D> {
        if self.particles.is_empty() {
            return None;
        }

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_sin = 0.0;
        let mut sum_cos = 0.0;
        let mut total_weight = 0.0;

        for p in &self.particles {
            let w = p.weight;
            sum_x += w * p.pose.x;
            sum_y += w * p.pose.y;
            sum_sin += w * p.pose.theta.sin();
            sum_cos += w * p.pose.theta.cos();
            total_weight += w;
        }

        if total_weight > 1e-10 {
            return Some(Pose2D::new(
                sum_x / total_weight,
                sum_y / total_weight,
                sum_sin.atan2(sum_cos),
            ));
        }

        let n = self.particles.len() as f64;
        let (mut x, mut y, mut s, mut c) = (0.0, 0.0, 0.0, 0.0);
        for p in &self.particles {
            x += p.pose.x;
            y += p.pose.y;
            s += p.pose.theta.sin();
            c += p.pose.theta.cos();
        }
        Some(Pose2D::new(x / n, y / n, s.atan2(c)))
    }

    /// Weighted covariance around [`mean`](Self::mean).
    ///
    /// Cross terms with the heading are left at zero.
    pub fn covariance(&self) -> Option<Covariance2D> {
        let mean = self.mean()?;
        let mut cov_xx = 0.0;
        let mut cov_xy = 0.0;
        let mut cov_yy = 0.0;
        let mut cov_tt = 0.0;
        let mut total_weight = 0.0;

        for p in &self.particles {
            let dx = p.pose.x - mean.x;
            let dy = p.pose.y - mean.y;
            let dtheta = angle_diff(mean.theta, p.pose.theta);

            cov_xx += p.weight * dx * dx;
            cov_xy += p.weight * dx * dy;
            cov_yy += p.weight * dy * dy;
            cov_tt += p.weight * dtheta * dtheta;
            total_weight += p.weight;
        }

        if total_weight <= 1e-10 {
            return Some(Covariance2D::diagonal(1.0, 1.0, 0.5));
        }

        let xy = cov_xy / total_weight;
        Some(Covariance2D::from_array([
            cov_xx / total_weight,
            xy,
            0.0,
            xy,
            cov_yy / total_weight,
            0.0,
            0.0,
            0.0,
            cov_tt / total_weight,
        ]))
    }
}
