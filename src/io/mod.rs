//! File formats consumed by the replay binary.

mod replay;

pub use replay::{ReplayError, ReplayFrame, ReplayLog};
