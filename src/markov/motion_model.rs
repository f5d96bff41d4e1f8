//! Odometry motion model (evaluation form).
//!
//! Implements the `motion_model_odometry` density from Probabilistic Robotics
//! (Thrun et al.). Motion between two poses is decomposed into:
//! 1. Initial rotation to face the target
//! 2. Translation toward the target
//! 3. Final rotation to match the target heading
//!
//! The density compares the decomposition observed by odometry with the
//! decomposition of a hypothesized transition. Noise variances grow
//! linearly with the hypothesized motion (absolute-value form).

use serde::{Deserialize, Serialize};

use crate::core::math::{angle_diff, gaussian_density};
use crate::core::types::Pose2D;

/// Translations shorter than this have no meaningful bearing, so the first
/// rotation is taken as zero.
pub const MIN_BEARING_TRANSLATION: f64 = 0.01;

/// Configuration for the odometry motion model.
///
/// The alpha parameters control noise proportional to motion:
/// - `alpha1`: Rotation noise from rotation
/// - `alpha2`: Rotation noise from translation
/// - `alpha3`: Translation noise from translation
/// - `alpha4`: Translation noise from rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionModelConfig {
    pub alpha1: f64,
    pub alpha2: f64,
    pub alpha3: f64,
    pub alpha4: f64,

    /// Multiplier on `alpha3` bounding the neighbor window:
    /// `radius = trans * (1 + window_safety_factor * alpha3)`.
    pub window_safety_factor: f64,

    /// Lower bound on every noise variance. Hypotheses without rotation or
    /// translation would otherwise get a point-mass density.
    pub min_variance: f64,

    /// Largest neighbor window side, in cells. Odometry jumps needing a
    /// wider window fail the cycle instead of building the kernel.
    pub max_window_cells: usize,
}

impl Default for MotionModelConfig {
    fn default() -> Self {
        Self {
            alpha1: 0.2,
            alpha2: 0.2,
            alpha3: 0.2,
            alpha4: 0.2,
            window_safety_factor: 4.0,
            min_variance: 0.01,
            max_window_cells: 41,
        }
    }
}

impl MotionModelConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        let alphas = [self.alpha1, self.alpha2, self.alpha3, self.alpha4];
        if alphas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(format!("motion alphas must be finite and >= 0: {alphas:?}"));
        }
        if !self.window_safety_factor.is_finite() || self.window_safety_factor < 0.0 {
            return Err(format!(
                "window_safety_factor must be >= 0: {}",
                self.window_safety_factor
            ));
        }
        if !self.min_variance.is_finite() || self.min_variance < 0.0 {
            return Err(format!("min_variance must be >= 0: {}", self.min_variance));
        }
        if self.max_window_cells == 0 {
            return Err("max_window_cells must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Rotate-translate-rotate decomposition of a relative motion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionDecomposition {
    pub rot1: f64,
    pub trans: f64,
    pub rot2: f64,
}

impl MotionDecomposition {
    /// Decompose the motion from `old` to `new`.
    ///
    /// Both poses are in the same frame; `rot1` is the bearing of the
    /// translation relative to `old.theta`.
    pub fn between(old: &Pose2D, new: &Pose2D) -> Self {
        Self::from_components(new.x - old.x, new.y - old.y, old.theta, new.theta)
    }

    /// Decompose a translation `(dx, dy)` that starts at heading `old_theta`
    /// and ends at heading `new_theta`.
    #[inline]
    pub fn from_components(dx: f64, dy: f64, old_theta: f64, new_theta: f64) -> Self {
        let trans = (dx * dx + dy * dy).sqrt();
        let rot1 = if trans < MIN_BEARING_TRANSLATION {
            0.0
        } else {
            angle_diff(old_theta, dy.atan2(dx))
        };
        let rot2 = angle_diff(rot1, angle_diff(old_theta, new_theta));
        Self { rot1, trans, rot2 }
    }
}

/// Odometry motion model evaluating transition likelihoods.
#[derive(Debug, Clone)]
pub struct MotionModel {
    config: MotionModelConfig,
}

impl MotionModel {
    /// Create a new motion model with the given configuration.
    pub fn new(config: MotionModelConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MotionModelConfig {
        &self.config
    }

    /// Radius of the spatial window that can carry probability mass for an
    /// observed motion.
    pub fn window_radius(&self, observed: &MotionDecomposition) -> f64 {
        observed.trans * (1.0 + self.config.window_safety_factor * self.config.alpha3)
    }

    /// Likelihood of a hypothesized transition given the observed one.
    ///
    /// ```text
    /// p = N(rot1 - rot1^, a1|rot1^| + a2 trans^)
    ///   · N(trans - trans^, a3 trans^ + a4(|rot1^| + |rot2^|))
    ///   · N(rot2 - rot2^, a1|rot2^| + a2 trans^)
    /// ```
    ///
    /// Each variance is clamped to at least `min_variance`.
    pub fn probability(&self, observed: &MotionDecomposition, hyp: &MotionDecomposition) -> f64 {
        let c = &self.config;
        let rot1_abs = hyp.rot1.abs();
        let rot2_abs = hyp.rot2.abs();

        let var_rot1 = (c.alpha1 * rot1_abs + c.alpha2 * hyp.trans).max(c.min_variance);
        let var_trans =
            (c.alpha3 * hyp.trans + c.alpha4 * (rot1_abs + rot2_abs)).max(c.min_variance);
        let var_rot2 = (c.alpha1 * rot2_abs + c.alpha2 * hyp.trans).max(c.min_variance);

        let p_rot1 = gaussian_density(angle_diff(hyp.rot1, observed.rot1), var_rot1);
        if p_rot1 == 0.0 {
            return 0.0;
        }
        let p_trans = gaussian_density(observed.trans - hyp.trans, var_trans);
        let p_rot2 = gaussian_density(angle_diff(hyp.rot2, observed.rot2), var_rot2);

        p_rot1 * p_trans * p_rot2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_decomposition_forward() {
        let d = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.0),
            &Pose2D::new(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(d.trans, 1.0);
        assert_relative_eq!(d.rot1, 0.0);
        assert_relative_eq!(d.rot2, 0.0);
    }

    #[test]
    fn test_decomposition_bearing_relative_to_prior_heading() {
        // Facing +Y, moving along +Y: no initial rotation
        let d = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, FRAC_PI_2),
            &Pose2D::new(0.0, 2.0, FRAC_PI_2),
        );
        assert_relative_eq!(d.rot1, 0.0, epsilon = 1e-12);
        assert_relative_eq!(d.trans, 2.0);
        assert_relative_eq!(d.rot2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decomposition_small_translation_has_no_bearing() {
        let d = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.0),
            &Pose2D::new(0.0, 0.005, 1.0),
        );
        assert_eq!(d.rot1, 0.0);
        assert_relative_eq!(d.rot2, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decomposition_sums_to_heading_change() {
        let old = Pose2D::new(1.0, 1.0, 0.3);
        let new = Pose2D::new(2.0, 3.0, -0.4);
        let d = MotionDecomposition::between(&old, &new);
        assert_relative_eq!(
            crate::core::math::normalize_angle(d.rot1 + d.rot2),
            angle_diff(old.theta, new.theta),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_probability_peaks_at_observed_motion() {
        let model = MotionModel::new(MotionModelConfig::default());
        let observed = MotionDecomposition {
            rot1: 0.1,
            trans: 1.0,
            rot2: -0.1,
        };
        let near = model.probability(&observed, &observed);
        let far = model.probability(
            &observed,
            &MotionDecomposition {
                rot1: 0.1,
                trans: 1.5,
                rot2: -0.1,
            },
        );
        assert!(near > far, "near {} should exceed far {}", near, far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_probability_identity_is_point_mass() {
        let model = MotionModel::new(MotionModelConfig {
            min_variance: 0.0,
            ..Default::default()
        });
        let zero = MotionDecomposition::default();
        assert_eq!(model.probability(&zero, &zero), 1.0);

        let turned = MotionDecomposition {
            rot2: 0.5,
            ..Default::default()
        };
        assert_eq!(model.probability(&turned, &zero), 0.0);
    }

    #[test]
    fn test_variance_floor_keeps_rotation_plausible() {
        // Staying put while odometry reports a quarter turn is unlikely, not
        // impossible.
        let model = MotionModel::new(MotionModelConfig::default());
        let turned = MotionDecomposition {
            rot2: FRAC_PI_2,
            ..Default::default()
        };
        let p = model.probability(&turned, &MotionDecomposition::default());
        assert!(p > 0.0);
        assert!(p < model.probability(&turned, &turned));
    }

    #[test]
    fn test_window_radius() {
        let model = MotionModel::new(MotionModelConfig::default());
        let observed = MotionDecomposition {
            rot1: 0.0,
            trans: 0.5,
            rot2: 0.0,
        };
        assert_relative_eq!(model.window_radius(&observed), 0.5 * 1.8);
    }

    #[test]
    fn test_validate_rejects_negative_alpha() {
        let config = MotionModelConfig {
            alpha2: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(MotionModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let config = MotionModelConfig {
            max_window_cells: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
