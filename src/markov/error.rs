//! Localization error taxonomy.

use thiserror::Error;

/// Errors raised by the belief-update phases.
///
/// Cycle-fatal variants abort the current cycle; the last good belief is
/// kept and the next cycle proceeds from it. Per-cell variants are counted
/// in the phase report instead of aborting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalizationError {
    #[error(
        "transition kernel degenerate for heading pair ({destination_heading}, {source_heading}) \
         ({count} pairs with zero mass)"
    )]
    DegenerateTransitionKernel {
        destination_heading: usize,
        source_heading: usize,
        count: usize,
    },

    #[error("kernel window {window}x{window} exceeds the {max}x{max} limit")]
    KernelWindowTooLarge { window: usize, max: usize },

    #[error("sample {sample} has no free neighbor inside the kernel window")]
    EmptyNeighborhood { sample: usize },

    #[error("sample {sample} gathered zero mass during motion update")]
    DegenerateMass { sample: usize },

    #[error("total weight collapsed to {total}")]
    TotalWeightCollapse { total: f64 },

    #[error("beam probability {probability} outside [0, 1], check sensor model parameters")]
    SensorModelRangeError { probability: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LocalizationError {
    /// Whether this error aborts the whole cycle.
    pub fn is_cycle_fatal(&self) -> bool {
        !matches!(
            self,
            LocalizationError::EmptyNeighborhood { .. } | LocalizationError::DegenerateMass { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
