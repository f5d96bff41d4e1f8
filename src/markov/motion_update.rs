//! Motion update: backward-gather convolution of the previous belief with the
//! transition kernel.
//!
//! For each active destination sample the engine visits every kernel offset
//! around the destination cell, keeps those landing on a valid free cell, and
//! accumulates `previous(neighbor, source) × kernel(destination, source,
//! offset)` over all source headings.
//!
//! Workers own a contiguous slice of the active list and write the gathered
//! mass into a private output slice; the current generation is written only
//! after every worker has joined.

use crate::map::OccupancyMap;

use super::belief::BeliefStore;
use super::error::LocalizationError;
use super::free_space::FreeSpaceIndex;
use super::kernel::TransitionKernel;
use super::workers::WorkerPool;

/// Outcome of one motion update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionReport {
    /// Sum of every weight in the current generation after the update.
    pub total_weight: f64,
    /// Active samples with no free neighbor inside the window.
    pub empty_neighborhoods: usize,
    /// Active samples that gathered zero mass.
    pub degenerate_mass: usize,
    /// First per-cell anomaly in sample order.
    pub first_anomaly: Option<LocalizationError>,
}

impl MotionReport {
    /// Number of per-cell anomalies.
    pub fn anomalies(&self) -> usize {
        self.empty_neighborhoods + self.degenerate_mass
    }
}

/// Per-worker accumulator, merged after join.
#[derive(Default)]
struct PartialReport {
    sum: f64,
    empty_neighborhoods: usize,
    degenerate_mass: usize,
    first_anomaly: Option<LocalizationError>,
}

impl PartialReport {
    fn record(&mut self, error: LocalizationError) {
        match error {
            LocalizationError::EmptyNeighborhood { .. } => self.empty_neighborhoods += 1,
            _ => self.degenerate_mass += 1,
        }
        if self.first_anomaly.is_none() {
            self.first_anomaly = Some(error);
        }
    }
}

/// Gather the free neighbors of a cell as `(free_index, offset_index)`.
fn collect_neighbors<M: OccupancyMap + ?Sized>(
    cell: usize,
    kernel: &TransitionKernel,
    free_space: &FreeSpaceIndex,
    map: &M,
    neighbors: &mut Vec<(usize, usize)>,
) {
    neighbors.clear();
    let (x, y) = free_space.position(cell);
    for (offset, &(dx, dy)) in kernel.offsets().iter().enumerate() {
        let (cx, cy) = map.world_to_grid(x + dx, y + dy);
        if !map.is_valid_cell(cx, cy) {
            continue;
        }
        if let Some(neighbor) = free_space.to_index(cx, cy) {
            neighbors.push((neighbor, offset));
        }
    }
}

/// Run the motion update.
///
/// Reads the previous generation, writes the current one. Samples listed in
/// `active` receive their gathered mass; every other sample receives `floor`.
/// Per-cell anomalies are counted in the report and never abort the phase.
pub fn apply<M: OccupancyMap + ?Sized>(
    store: &mut BeliefStore,
    kernel: &TransitionKernel,
    free_space: &FreeSpaceIndex,
    map: &M,
    active: &[usize],
    floor: f64,
    pool: &WorkerPool,
) -> MotionReport {
    let headings = store.headings().count();
    let (previous, current) = store.split_mut();

    let mut gathered = vec![0.0; active.len()];
    let partials = pool.run_chunks(&mut gathered, |start, chunk| {
        let mut partial = PartialReport::default();
        let mut neighbors = Vec::with_capacity(kernel.offsets().len());
        let mut neighbors_of = None;

        for (k, slot) in chunk.iter_mut().enumerate() {
            let sample = active[start + k];
            let cell = sample / headings;
            let destination = sample % headings;

            // Active samples are sorted, so headings of one cell are adjacent
            if neighbors_of != Some(cell) {
                collect_neighbors(cell, kernel, free_space, map, &mut neighbors);
                neighbors_of = Some(cell);
            }

            if neighbors.is_empty() {
                *slot = 0.0;
                partial.record(LocalizationError::EmptyNeighborhood { sample });
                continue;
            }

            let mut mass = 0.0;
            for &(neighbor, offset) in &neighbors {
                let sources = &previous[neighbor * headings..(neighbor + 1) * headings];
                for (source, prior) in sources.iter().enumerate() {
                    mass += prior.weight * kernel.probability(destination, source, offset);
                }
            }

            if mass <= 0.0 {
                partial.record(LocalizationError::DegenerateMass { sample });
            }
            *slot = mass;
            partial.sum += mass;
        }
        partial
    });

    for sample in current.iter_mut() {
        sample.weight = floor;
    }
    for (&sample, &mass) in active.iter().zip(&gathered) {
        current[sample].weight = mass;
    }

    let inactive = current.len() - active.len();
    let mut report = MotionReport {
        total_weight: floor * inactive as f64,
        ..Default::default()
    };
    for partial in partials {
        report.total_weight += partial.sum;
        report.empty_neighborhoods += partial.empty_neighborhoods;
        report.degenerate_mass += partial.degenerate_mass;
        if report.first_anomaly.is_none() {
            report.first_anomaly = partial.first_anomaly;
        }
    }

    if let Some(first) = &report.first_anomaly {
        log::warn!(
            "Motion update: {} empty neighborhoods, {} degenerate cells (first: {})",
            report.empty_neighborhoods,
            report.degenerate_mass,
            first
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Pose2D;
    use crate::map::{GridMap, GridMapConfig};
    use crate::markov::belief::HeadingBins;
    use crate::markov::kernel::KernelBuilder;
    use crate::markov::motion_model::{MotionDecomposition, MotionModel, MotionModelConfig};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const RESOLUTION: f64 = 0.1;

    struct Fixture {
        map: GridMap,
        free_space: FreeSpaceIndex,
        store: BeliefStore,
        builder: KernelBuilder,
    }

    fn fixture(map: GridMap, bins: usize) -> Fixture {
        let free_space = FreeSpaceIndex::build(&map);
        let headings = HeadingBins::new(bins);
        let store = BeliefStore::new(&free_space, headings);
        let builder = KernelBuilder::new(
            MotionModel::new(MotionModelConfig::default()),
            headings,
            RESOLUTION,
        );
        Fixture {
            map,
            free_space,
            store,
            builder,
        }
    }

    fn config() -> GridMapConfig {
        GridMapConfig {
            resolution: RESOLUTION,
            ..Default::default()
        }
    }

    fn all(store: &BeliefStore) -> Vec<usize> {
        (0..store.len()).collect()
    }

    #[test]
    fn test_rotation_conserves_mass() {
        let mut f = fixture(GridMap::free(config(), 6, 6).unwrap(), 4);
        let observed = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.0),
            &Pose2D::new(0.0, 0.0, FRAC_PI_2),
        );
        let kernel = f.builder.build(&observed, &WorkerPool::new(2)).unwrap();
        let active = all(&f.store);

        let report = apply(
            &mut f.store,
            &kernel,
            &f.free_space,
            &f.map,
            &active,
            1e-9,
            &WorkerPool::new(3),
        );

        assert_relative_eq!(report.total_weight, 1.0, epsilon = 1e-9);
        assert_eq!(report.anomalies(), 0);
        let sum: f64 = f.store.current().iter().map(|s| s.weight).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inactive_samples_get_floor() {
        let mut f = fixture(GridMap::free(config(), 3, 3).unwrap(), 2);
        let kernel = f
            .builder
            .build(&MotionDecomposition::default(), &WorkerPool::new(1))
            .unwrap();
        let active = vec![0, 1, 7];

        let report = apply(
            &mut f.store,
            &kernel,
            &f.free_space,
            &f.map,
            &active,
            1e-6,
            &WorkerPool::new(2),
        );

        for (i, sample) in f.store.current().iter().enumerate() {
            if active.contains(&i) {
                assert!(sample.weight > 1e-6);
            } else {
                assert_eq!(sample.weight, 1e-6);
            }
        }
        let sum: f64 = f.store.current().iter().map(|s| s.weight).sum();
        assert_relative_eq!(report.total_weight, sum, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_moves_mass() {
        // Corridor along X; all mass at the west end facing east
        let map = GridMap::from_ascii(config(), "..........").unwrap();
        let mut f = fixture(map, 4);
        let east = HeadingBins::new(4).bin(0.0);
        for (i, sample) in f.store.current_mut().iter_mut().enumerate() {
            sample.weight = if i == east { 1.0 } else { 0.0 };
        }
        f.store.swap_generations();

        let observed = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.0),
            &Pose2D::new(0.3, 0.0, 0.0),
        );
        let kernel = f.builder.build(&observed, &WorkerPool::new(1)).unwrap();
        let active = all(&f.store);
        apply(
            &mut f.store,
            &kernel,
            &f.free_space,
            &f.map,
            &active,
            0.0,
            &WorkerPool::new(4),
        );

        let cell_mass = |cell: usize| -> f64 {
            f.store.current()[cell * 4..(cell + 1) * 4]
                .iter()
                .map(|s| s.weight)
                .sum()
        };
        let peak = (0..10)
            .max_by(|&a, &b| cell_mass(a).total_cmp(&cell_mass(b)))
            .unwrap();
        assert!((1..=5).contains(&peak), "peak at cell {}", peak);
        // Cells further than the window radius cannot receive mass
        for cell in 6..10 {
            assert_eq!(cell_mass(cell), 0.0);
        }
    }

    #[test]
    fn test_isolated_cell_keeps_itself_as_neighbor() {
        let map = GridMap::from_ascii(config(), "###\n#.#\n###").unwrap();
        let mut f = fixture(map, 2);
        let observed = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.0),
            &Pose2D::new(0.2, 0.0, 0.0),
        );
        let kernel = f.builder.build(&observed, &WorkerPool::new(1)).unwrap();
        let active = all(&f.store);
        let report = apply(
            &mut f.store,
            &kernel,
            &f.free_space,
            &f.map,
            &active,
            0.0,
            &WorkerPool::new(1),
        );

        assert_eq!(report.empty_neighborhoods, 0);
        assert!(report.total_weight > 0.0);
    }

    #[test]
    fn test_zero_source_mass_reports_degenerate() {
        let mut f = fixture(GridMap::free(config(), 2, 2).unwrap(), 2);
        for sample in f.store.current_mut() {
            sample.weight = 0.0;
        }
        f.store.swap_generations();
        let kernel = f
            .builder
            .build(&MotionDecomposition::default(), &WorkerPool::new(1))
            .unwrap();
        let active = all(&f.store);
        let report = apply(
            &mut f.store,
            &kernel,
            &f.free_space,
            &f.map,
            &active,
            0.0,
            &WorkerPool::new(2),
        );

        assert_eq!(report.degenerate_mass, 8);
        assert_eq!(
            report.first_anomaly,
            Some(LocalizationError::DegenerateMass { sample: 0 })
        );
    }

    #[test]
    fn test_worker_count_does_not_change_weights() {
        let map = GridMap::from_ascii(config(), "#.....\n#..#..\n......\n..#...").unwrap();
        let observed = MotionDecomposition::between(
            &Pose2D::new(0.0, 0.0, 0.3),
            &Pose2D::new(0.15, 0.1, 0.6),
        );

        let run = |workers: usize| -> (Vec<f64>, f64) {
            let mut f = fixture(map.clone(), 8);
            for (i, sample) in f.store.current_mut().iter_mut().enumerate() {
                sample.weight = 1.0 + (i % 7) as f64;
            }
            f.store.swap_generations();
            let kernel = f.builder.build(&observed, &WorkerPool::new(workers)).unwrap();
            let active = all(&f.store);
            let report = apply(
                &mut f.store,
                &kernel,
                &f.free_space,
                &f.map,
                &active,
                0.0,
                &WorkerPool::new(workers),
            );
            let weights = f.store.current().iter().map(|s| s.weight).collect();
            (weights, report.total_weight)
        };

        let (single, single_total) = run(1);
        let (multi, multi_total) = run(5);
        assert_eq!(single, multi);
        assert_relative_eq!(single_total, multi_total, max_relative = 1e-12);
    }
}
