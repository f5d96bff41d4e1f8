//! Core foundation layer.
//!
//! Bottom layer of the localization stack with no internal dependencies.
//!
//! # Contents
//!
//! - [`types`]: Poses, laser scans and pose covariance
//! - [`math`]: Angle normalization and angular arithmetic

pub mod math;
pub mod types;
