//! # DhruvaMarkov
//!
//! Grid-based Markov localization for a robot operating in a known 2D
//! occupancy map.
//!
//! The pose space is discretized into every free map cell crossed with a
//! fixed set of heading bins. Each observation cycle moves probability mass
//! through an odometry transition kernel, reweights it against a range scan
//! with a likelihood field model, and periodically draws a continuous
//! particle cloud from the discrete belief.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      main                           │  ← Replay binary
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                 config/  io/                        │  ← YAML loading
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    markov/                          │  ← Filter
//! │   (kernel, motion/sensor update, resample, cycle)   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     map/                            │  ← Map adapter
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dhruva_markov::{GridMap, MarkovConfig, MarkovLocalizer};
//!
//! let config = MarkovConfig::load_default()?;
//! let map = GridMap::load("demos/room.map", config.map.clone())?;
//! let mut localizer = MarkovLocalizer::new(config, &map)?;
//!
//! for frame in &replay.frames {
//!     localizer.process(&frame.odom, &frame.scan, &map)?;
//! }
//! println!("{:?}", localizer.estimate());
//! ```
//!
//! ## Coordinate System
//!
//! Uses ROS REP-103 convention:
//! - X: Forward (positive ahead of robot)
//! - Y: Left (positive to robot's left)
//! - Theta: Rotation in radians, CCW positive from +X axis

// Layer 1: Core foundation (no internal deps)
pub mod core;

// Layer 2: Map adapter
pub mod map;

// Layer 3: Markov filter
pub mod markov;

// Layer 4: Configuration and file formats
pub mod config;
pub mod io;

pub use crate::config::{ConfigLoadError, MarkovConfig};
pub use crate::core::types::{Covariance2D, LaserScan, Pose2D};
pub use crate::io::{ReplayError, ReplayFrame, ReplayLog};
pub use crate::map::{CellState, GridMap, GridMapConfig, MapLoadError, OccupancyMap};
pub use crate::markov::{
    BeliefSnapshot, CycleReport, LocalizationError, MarkovLocalizer, ParticleCloud,
};
