//! Configuration loading for the localizer.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dhruva_markov::config::MarkovConfig;
//!
//! // Load from default path (configs/markov.yaml)
//! let config = MarkovConfig::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = MarkovConfig::default();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Heading resolution, floor divisor |
//! | `motion` | Odometry noise alphas, window safety factor and limit |
//! | `sensor` | Likelihood field parameters, laser mounting |
//! | [`FilterSection`] | Update gating, resampling, workers, seed |
//! | `map` | Map resolution, origin, distance cap |
//!
//! ## Example YAML
//!
//! ```yaml
//! grid:
//!   angular_resolution_deg: 5.0
//! motion:
//!   alpha1: 0.2
//!   alpha3: 0.1
//! sensor:
//!   sigma_hit: 0.2
//!   max_beams: 30
//! filter:
//!   resample_interval: 2
//!   update_min_d: 0.2
//! ```

mod defaults;
mod error;
mod filter;
mod grid;
mod markov;

pub use error::ConfigLoadError;
pub use filter::FilterSection;
pub use grid::GridSection;
pub use markov::{DEFAULT_CONFIG_PATH, MarkovConfig};
