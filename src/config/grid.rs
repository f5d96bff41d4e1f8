//! Pose-space discretization settings.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Discretization of the heading axis and the belief floor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Heading bin width in degrees. Must divide 360.
    #[serde(default = "defaults::angular_resolution_deg")]
    pub angular_resolution_deg: f64,

    /// Floor weight is `1 / (total_cells * floor_divisor)`.
    #[serde(default = "defaults::floor_divisor")]
    pub floor_divisor: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            angular_resolution_deg: defaults::angular_resolution_deg(),
            floor_divisor: defaults::floor_divisor(),
        }
    }
}

impl GridSection {
    /// Number of heading bins.
    pub fn heading_bins(&self) -> usize {
        (360.0 / self.angular_resolution_deg).round() as usize
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let res = self.angular_resolution_deg;
        if !(res.is_finite() && res > 0.0 && res <= 360.0) {
            return Err(format!("angular_resolution_deg must be in (0, 360]: {res}"));
        }
        let bins = 360.0 / res;
        if (bins - bins.round()).abs() > 1e-6 {
            return Err(format!("angular_resolution_deg must divide 360: {res}"));
        }
        if !(self.floor_divisor.is_finite() && self.floor_divisor >= 1.0) {
            return Err(format!("floor_divisor must be >= 1: {}", self.floor_divisor));
        }
        Ok(())
    }
}
