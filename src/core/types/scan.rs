//! Laser scan type.

use serde::{Deserialize, Serialize};

/// Raw LiDAR scan in polar coordinates.
///
/// Ranges are measured from the laser frame; bearings are relative to the
/// laser's forward axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Start angle in radians
    pub angle_min: f64,
    /// End angle in radians
    pub angle_max: f64,
    /// Angular resolution (radians between consecutive readings)
    pub angle_increment: f64,
    /// Minimum valid range in meters
    pub range_min: f64,
    /// Maximum valid range in meters
    pub range_max: f64,
    /// Range measurements in meters (NaN = invalid)
    pub ranges: Vec<f64>,
    /// Optional per-beam bearings for non-uniform scans.
    /// When present, these are used instead of `angle_min + i * angle_increment`.
    #[serde(default)]
    pub angles: Option<Vec<f64>>,
}

impl LaserScan {
    /// Create a new uniformly spaced laser scan.
    pub fn new(
        angle_min: f64,
        angle_max: f64,
        angle_increment: f64,
        range_min: f64,
        range_max: f64,
        ranges: Vec<f64>,
    ) -> Self {
        Self {
            angle_min,
            angle_max,
            angle_increment,
            range_min,
            range_max,
            ranges,
            angles: None,
        }
    }

    /// Number of range measurements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if scan is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Bearing of beam `i` relative to the laser frame.
    #[inline]
    pub fn bearing(&self, i: usize) -> f64 {
        match &self.angles {
            Some(angles) if i < angles.len() => angles[i],
            _ => self.angle_min + i as f64 * self.angle_increment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_bearing() {
        let scan = LaserScan::new(-1.0, 1.0, 0.5, 0.1, 8.0, vec![1.0; 5]);
        assert_relative_eq!(scan.bearing(0), -1.0);
        assert_relative_eq!(scan.bearing(4), 1.0);
    }

    #[test]
    fn test_explicit_bearings() {
        let mut scan = LaserScan::new(0.0, 0.0, 0.0, 0.1, 8.0, vec![1.0, 2.0]);
        scan.angles = Some(vec![0.3, 0.7]);
        assert_relative_eq!(scan.bearing(1), 0.7);
        assert_eq!(scan.len(), 2);
        assert!(!scan.is_empty());
    }
}
