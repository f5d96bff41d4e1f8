//! Main MarkovConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::map::GridMapConfig;
use crate::markov::{HeadingBins, MotionModelConfig, SensorModelConfig};

use super::error::ConfigLoadError;
use super::filter::FilterSection;
use super::grid::GridSection;

/// Default config path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/markov.yaml";

/// Full localizer configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct MarkovConfig {
    /// Pose-space discretization
    #[serde(default)]
    pub grid: GridSection,

    /// Odometry noise model
    #[serde(default)]
    pub motion: MotionModelConfig,

    /// Range sensor model
    #[serde(default)]
    pub sensor: SensorModelConfig,

    /// Cycle gating and resampling
    #[serde(default)]
    pub filter: FilterSection,

    /// Map geometry (used when loading ASCII maps)
    #[serde(default)]
    pub map: GridMapConfig,
}

impl MarkovConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/markov.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        serde_yaml::to_string(self).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.grid
            .validate()
            .and_then(|_| self.motion.validate())
            .and_then(|_| self.sensor.validate())
            .and_then(|_| self.filter.validate())
            .and_then(|_| {
                if self.map.resolution > 0.0 && self.map.max_obstacle_distance >= 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "map resolution must be > 0 and max_obstacle_distance >= 0: {} / {}",
                        self.map.resolution, self.map.max_obstacle_distance
                    ))
                }
            })
            .map_err(ConfigLoadError::Invalid)
    }

    /// Heading discretization.
    pub fn heading_bins(&self) -> HeadingBins {
        HeadingBins::new(self.grid.heading_bins())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = MarkovConfig::default();
        assert_eq!(config.heading_bins().count(), 72);
        assert_eq!(config.filter.cloud_size, 10_000);
        assert_eq!(config.filter.resample_interval, 2);
        assert_relative_eq!(config.grid.floor_divisor, 1024.0);
        assert_relative_eq!(config.motion.alpha1, 0.2);
        assert_eq!(config.sensor.max_beams, 30);
        assert!(config.filter.motion_update);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
grid:
  angular_resolution_deg: 10.0
sensor:
  sigma_hit: 0.1
filter:
  seed: 42
"#;
        let config = MarkovConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.heading_bins().count(), 36);
        assert_relative_eq!(config.grid.floor_divisor, 1024.0);
        assert_relative_eq!(config.sensor.sigma_hit, 0.1);
        assert_relative_eq!(config.sensor.z_hit, 0.95);
        assert_eq!(config.filter.seed, 42);
        assert_eq!(config.filter.cloud_size, 10_000);
    }

    #[test]
    fn test_invalid_resolution_rejected() {
        let yaml = "grid:\n  angular_resolution_deg: 7.0\n";
        assert!(matches!(
            MarkovConfig::from_yaml(yaml),
            Err(ConfigLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            MarkovConfig::from_yaml("grid: [1, 2"),
            Err(ConfigLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = MarkovConfig::default();
        config.sensor.max_range = Some(6.0);
        config.filter.workers = 3;
        let yaml = config.to_yaml().unwrap();
        let parsed = MarkovConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.sensor.max_range, Some(6.0));
        assert_eq!(parsed.filter.workers, 3);
    }
}
