//! Normalization and active-set maintenance.
//!
//! After each phase the belief is rescaled to unit mass. Samples whose mass
//! drops to the floor `ε` stay in the belief (they remain valid sources for
//! the next motion update) but leave the active set, so the next motion
//! update does not compute them.
//!
//! Boundary convention:
//! - `floor_weights`: weight `< ε` becomes `ε`
//! - `rebuild_active_set`: weight `> ε` is active, weight `<= ε` is pinned
//!   to `ε` and inactive

use super::belief::WeightedPose;
use super::error::{LocalizationError, Result};

/// Totals at or below this are treated as a collapse.
pub const MIN_TOTAL_WEIGHT: f64 = 1e-300;

/// Floor weight for a belief over `total_cells` discretized poses.
#[inline]
pub fn floor_weight(total_cells: usize, floor_divisor: f64) -> f64 {
    1.0 / (total_cells.max(1) as f64 * floor_divisor)
}

/// Sum of all weights, in index order.
pub fn total_weight<S: WeightedPose>(samples: &[S]) -> f64 {
    samples.iter().map(|s| s.weight()).sum()
}

/// Divide every weight by `total`.
///
/// Fails with [`LocalizationError::TotalWeightCollapse`] without touching the
/// samples if `total` is not a usable divisor.
pub fn normalize<S: WeightedPose>(samples: &mut [S], total: f64) -> Result<()> {
    if !total.is_finite() || total <= MIN_TOTAL_WEIGHT {
        return Err(LocalizationError::TotalWeightCollapse { total });
    }
    let scale = 1.0 / total;
    for sample in samples.iter_mut() {
        let weight = sample.weight() * scale;
        sample.set_weight(weight);
    }
    Ok(())
}

/// Raise every weight below `floor` to `floor`.
///
/// Returns the number of samples raised.
pub fn floor_weights<S: WeightedPose>(samples: &mut [S], floor: f64) -> usize {
    let mut raised = 0;
    for sample in samples.iter_mut() {
        if sample.weight() < floor {
            sample.set_weight(floor);
            raised += 1;
        }
    }
    raised
}

/// Rebuild the active set from the current weights.
///
/// `active` is cleared and refilled in ascending index order.
pub fn rebuild_active_set<S: WeightedPose>(
    samples: &mut [S],
    floor: f64,
    active: &mut Vec<usize>,
) {
    active.clear();
    for (index, sample) in samples.iter_mut().enumerate() {
        if sample.weight() > floor {
            active.push(index);
        } else {
            sample.set_weight(floor);
        }
    }
}
