//! Sensor update: reweight every sample against a scan.
//!
//! Runs in two parallel passes over the same contiguous partitions. The
//! first scores each sample into a private log-likelihood buffer; the second
//! commits `weight *= exp(log_likelihood)` and returns per-worker weight
//! sums. A sensor model error in the first pass aborts the phase before any
//! weight changes.

use crate::core::types::LaserScan;
use crate::map::OccupancyMap;

use super::belief::WeightedPose;
use super::error::{LocalizationError, Result};
use super::sensor_model::LikelihoodFieldModel;
use super::workers::WorkerPool;

/// Reweight `samples` by the likelihood of `scan` and return the new total
/// weight.
pub fn apply<S, M>(
    samples: &mut [S],
    scan: &LaserScan,
    model: &LikelihoodFieldModel,
    map: &M,
    pool: &WorkerPool,
) -> Result<f64>
where
    S: WeightedPose + Sync,
    M: OccupancyMap + ?Sized,
{
    let mut log_likelihoods = vec![0.0; samples.len()];
    let scored = {
        let samples = &*samples;
        pool.run_chunks(&mut log_likelihoods, |start, chunk| -> Result<()> {
            for (k, slot) in chunk.iter_mut().enumerate() {
                *slot = model.log_likelihood(scan, samples[start + k].pose(), map)?;
            }
            Ok(())
        })
    };

    // Each worker stops at its first error; report the earliest one once
    if let Some(error) = scored.into_iter().find_map(|r| r.err()) {
        if let LocalizationError::SensorModelRangeError { probability } = &error {
            log::error!(
                "Sensor model produced probability {} outside [0, 1], check z_hit/z_rand/max_range",
                probability
            );
        }
        return Err(error);
    }

    let sums = pool.run_chunks(samples, |start, chunk| {
        let mut sum = 0.0;
        for (k, sample) in chunk.iter_mut().enumerate() {
            let log_likelihood = log_likelihoods[start + k];
            let weight = sample.weight() * log_likelihood.exp();
            sample.set_weight(weight);
            sample.set_log_weight(log_likelihood);
            sum += weight;
        }
        sum
    });

    let total: f64 = sums.into_iter().sum();
    log::debug!(
        "Sensor update: {} samples, {} beams, total weight {:.6e}",
        samples.len(),
        scan.len(),
        total
    );
    Ok(total)
}
