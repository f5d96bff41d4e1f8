//! Grid-based Markov localization.
//!
//! The belief is a probability mass per discretized pose: every free map
//! cell crossed with a fixed number of heading bins. Each observation cycle
//! convolves the belief with a transition kernel built from the odometry
//! delta, reweights it against a range scan with a likelihood field model,
//! and periodically resamples it into a continuous [`ParticleCloud`].
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`free_space`] | Dense index over free cells |
//! | [`belief`] | Double-buffered weights per discretized pose |
//! | [`motion_model`] | Odometry noise density |
//! | [`kernel`] | Transition probabilities for one odometry step |
//! | [`motion_update`] | Backward-gather convolution |
//! | [`sensor_model`] / [`sensor_update`] | Likelihood field reweighting |
//! | [`normalize`] | Normalization, floor, active set |
//! | [`resample`] | Low-variance resampling |
//! | [`workers`] | Scoped per-phase worker threads |
//! | [`localizer`] | Cycle orchestration |
//!
//! # Example
//!
//! ```rust,ignore
//! use dhruva_markov::config::MarkovConfig;
//! use dhruva_markov::markov::MarkovLocalizer;
//!
//! let mut localizer = MarkovLocalizer::new(MarkovConfig::default(), &map)?;
//! let report = localizer.process(&odom_pose, &scan, &map)?;
//! if let Some(pose) = localizer.estimate() {
//!     println!("{:?}", pose);
//! }
//! ```

pub mod belief;
mod error;
pub mod free_space;
pub mod kernel;
pub mod localizer;
pub mod motion_model;
pub mod motion_update;
pub mod normalize;
pub mod particle_cloud;
pub mod resample;
pub mod sensor_model;
pub mod sensor_update;
pub mod snapshot;
pub mod workers;

pub use belief::{BeliefStore, DiscretizedPose, HeadingBins, WeightedPose, WeightedSample};
pub use error::{LocalizationError, Result};
pub use free_space::FreeSpaceIndex;
pub use kernel::{KernelBuilder, TransitionKernel};
pub use localizer::{CycleReport, MarkovLocalizer};
pub use motion_model::{MotionDecomposition, MotionModel, MotionModelConfig};
pub use motion_update::MotionReport;
pub use particle_cloud::{Particle, ParticleCloud};
pub use sensor_model::{LikelihoodFieldModel, SensorModelConfig};
pub use snapshot::BeliefSnapshot;
pub use workers::WorkerPool;
