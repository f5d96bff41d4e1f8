//! Angle primitives shared by the motion and sensor models.

use std::f64::consts::PI;

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use dhruva_markov::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(1.5 * PI) - (-0.5 * PI)).abs() < 1e-9);
/// assert!((normalize_angle(-2.5 * PI) - (-0.5 * PI)).abs() < 1e-9);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Shortest angular difference from angle `a` to angle `b`.
///
/// Returns the signed angle you need to add to `a` to reach `b`.
///
/// # Example
/// ```
/// use dhruva_markov::core::math::angle_diff;
/// use std::f64::consts::PI;
///
/// assert!((angle_diff(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-9);
/// let diff = angle_diff(PI - 0.1, -PI + 0.1);
/// assert!((diff - 0.2).abs() < 1e-9);
/// ```
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}

/// Zero-mean Gaussian density with the given variance.
///
/// A (near-)zero variance degenerates to a point mass: 1 at `x == 0`,
/// 0 elsewhere.
#[inline]
pub fn gaussian_density(x: f64, variance: f64) -> f64 {
    if variance < 1e-12 {
        return if x.abs() < 1e-9 { 1.0 } else { 0.0 };
    }
    (-0.5 * x * x / variance).exp() / (2.0 * PI * variance).sqrt()
}
