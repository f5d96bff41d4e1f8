//! Serializable export of the discretized belief.

use serde::{Deserialize, Serialize};

use crate::core::types::Pose2D;

use super::belief::{BeliefStore, HeadingBins};
use super::free_space::FreeSpaceIndex;

/// Histogram of the belief over free cells and heading bins.
///
/// `weights[free_index * num_headings + heading_bin]`, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    pub num_headings: usize,
    /// Grid coordinates of each free cell.
    pub cells: Vec<(usize, usize)>,
    /// World position of each free cell center.
    pub positions: Vec<(f64, f64)>,
    pub weights: Vec<f64>,
}

impl BeliefSnapshot {
    /// Capture the latest completed belief.
    pub fn capture(store: &BeliefStore, free_space: &FreeSpaceIndex) -> Self {
        Self {
            num_headings: store.headings().count(),
            cells: free_space.coordinates().to_vec(),
            positions: free_space.positions().to_vec(),
            weights: store.latest().iter().map(|s| s.weight).collect(),
        }
    }

    /// Probability per free cell, summed over headings.
    pub fn cell_marginals(&self) -> Vec<f64> {
        self.weights
            .chunks(self.num_headings.max(1))
            .map(|headings| headings.iter().sum())
            .collect()
    }

    /// Probability per heading bin, summed over cells.
    ///
    /// Empty when the snapshot has no heading bins.
    pub fn heading_marginals(&self) -> Vec<f64> {
        let mut marginals = vec![0.0; self.num_headings];
        if self.num_headings == 0 {
            return marginals;
        }
        for (i, w) in self.weights.iter().enumerate() {
            marginals[i % self.num_headings] += w;
        }
        marginals
    }

    /// Whether `weights` holds one entry per (cell, heading) pair.
    pub fn is_consistent(&self) -> bool {
        self.num_headings > 0
            && self.cells.len() == self.positions.len()
            && self.positions.len().checked_mul(self.num_headings) == Some(self.weights.len())
    }

    /// Pose of the highest-weight sample.
    ///
    /// Ties resolve to the lowest sample index. `None` for an empty or
    /// inconsistent snapshot.
    pub fn most_likely_pose(&self) -> Option<Pose2D> {
        if !self.is_consistent() {
            return None;
        }
        let (best, _) = self
            .weights
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((i, w)),
            })?;
        let headings = HeadingBins::new(self.num_headings);
        let &(x, y) = self.positions.get(best / self.num_headings)?;
        Some(Pose2D::new(x, y, headings.angle(best % self.num_headings)))
    }
}
