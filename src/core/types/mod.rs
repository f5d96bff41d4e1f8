//! Core data types.

mod covariance;
mod pose;
mod scan;

pub use covariance::Covariance2D;
pub use pose::Pose2D;
pub use scan::LaserScan;
