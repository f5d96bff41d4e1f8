//! Filter cycle settings.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Cycle gating, resampling and worker settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterSection {
    /// Particles drawn on each resample.
    #[serde(default = "defaults::cloud_size")]
    pub cloud_size: usize,

    /// Resample every N filter updates.
    #[serde(default = "defaults::resample_interval")]
    pub resample_interval: usize,

    /// Translation (meters, per axis) that triggers an update.
    #[serde(default = "defaults::update_min_d")]
    pub update_min_d: f64,

    /// Rotation (radians) that triggers an update.
    #[serde(default = "defaults::update_min_a")]
    pub update_min_a: f64,

    /// Run the motion phase. When disabled the sensor phase reweights the
    /// previous belief directly.
    #[serde(default = "defaults::enabled")]
    pub motion_update: bool,

    /// Worker threads per phase (0 = available parallelism).
    #[serde(default)]
    pub workers: usize,

    /// Random seed for resampling (0 = seed from the OS).
    #[serde(default)]
    pub seed: u64,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            cloud_size: defaults::cloud_size(),
            resample_interval: defaults::resample_interval(),
            update_min_d: defaults::update_min_d(),
            update_min_a: defaults::update_min_a(),
            motion_update: defaults::enabled(),
            workers: 0,
            seed: 0,
        }
    }
}

impl FilterSection {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.cloud_size == 0 {
            return Err("cloud_size must be > 0".to_string());
        }
        if self.resample_interval == 0 {
            return Err("resample_interval must be > 0".to_string());
        }
        if self.update_min_d < 0.0 || self.update_min_a < 0.0 {
            return Err(format!(
                "update thresholds must be >= 0: {} m / {} rad",
                self.update_min_d, self.update_min_a
            ));
        }
        Ok(())
    }
}
