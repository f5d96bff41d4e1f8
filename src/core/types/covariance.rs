//! Pose uncertainty.

use serde::{Deserialize, Serialize};

/// 3x3 covariance matrix of a 2D pose estimate (x, y, theta).
///
/// Stored as row-major array: [xx, xy, xt, yx, yy, yt, tx, ty, tt]
/// where t = theta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariance2D {
    data: [f64; 9],
}

impl Covariance2D {
    /// Create a zero covariance matrix.
    #[inline]
    pub fn zero() -> Self {
        Self { data: [0.0; 9] }
    }

    /// Create a diagonal covariance matrix from variances.
    #[inline]
    pub fn diagonal(xx: f64, yy: f64, tt: f64) -> Self {
        Self {
            data: [xx, 0.0, 0.0, 0.0, yy, 0.0, 0.0, 0.0, tt],
        }
    }

    /// Create from row-major array.
    #[inline]
    pub fn from_array(data: [f64; 9]) -> Self {
        Self { data }
    }

    /// Element at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * 3 + col]
    }

    #[inline]
    pub fn var_x(&self) -> f64 {
        self.data[0]
    }

    #[inline]
    pub fn var_y(&self) -> f64 {
        self.data[4]
    }

    #[inline]
    pub fn var_theta(&self) -> f64 {
        self.data[8]
    }

    /// Get raw data as slice.
    #[inline]
    pub fn as_slice(&self) -> &[f64; 9] {
        &self.data
    }
}

impl Default for Covariance2D {
    fn default() -> Self {
        Self::zero()
    }
}
