//! Recorded odometry/scan sequences.
//!
//! A replay log is a YAML document:
//!
//! ```yaml
//! name: corridor
//! frames:
//!   - odom: { x: 0.0, y: 0.0, theta: 0.0 }
//!     scan:
//!       angle_min: -1.57
//!       angle_max: 1.57
//!       angle_increment: 1.57
//!       range_min: 0.05
//!       range_max: 4.0
//!       ranges: [1.0, 2.5, 1.0]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{LaserScan, Pose2D};

/// Error type for replay loading
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Replay log has no frames")]
    Empty,
}

/// One odometry pose with the scan taken at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Odometry pose in the odometry frame
    pub odom: Pose2D,
    pub scan: LaserScan,
}

/// A recorded sequence loaded from YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    pub frames: Vec<ReplayFrame>,
}

impl ReplayLog {
    /// Load a replay log from a YAML file
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ReplayError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ReplayError> {
        let log: Self =
            serde_yaml::from_str(yaml).map_err(|e| ReplayError::Parse(e.to_string()))?;
        if log.frames.is_empty() {
            return Err(ReplayError::Empty);
        }
        Ok(log)
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String, ReplayError> {
        serde_yaml::to_string(self).map_err(|e| ReplayError::Parse(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
