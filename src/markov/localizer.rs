//! Per-cycle orchestration of the Markov localization filter.
//!
//! One observation cycle:
//!
//! ```text
//! odometry delta ─► kernel build ─► motion update (previous → current)
//!                                        │
//!                          normalize ◄───┘
//!                              │
//!                 floor ─► sensor update (current, in place)
//!                              │
//!            normalize + active set ─► resample (every N updates) ─► swap
//! ```
//!
//! Any cycle-fatal error returns before the swap, so the belief seen by the
//! next cycle is the last one that completed.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::MarkovConfig;
use crate::core::math::angle_diff;
use crate::core::types::{LaserScan, Pose2D};
use crate::map::OccupancyMap;

use super::belief::{BeliefStore, WeightedSample};
use super::error::{LocalizationError, Result};
use super::free_space::FreeSpaceIndex;
use super::kernel::KernelBuilder;
use super::motion_model::{MotionDecomposition, MotionModel};
use super::motion_update::{self, MotionReport};
use super::normalize;
use super::particle_cloud::ParticleCloud;
use super::resample;
use super::sensor_model::LikelihoodFieldModel;
use super::sensor_update;
use super::snapshot::BeliefSnapshot;
use super::workers::WorkerPool;

/// Outcome of [`MarkovLocalizer::process`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// False when the odometry change was below the update thresholds.
    pub updated: bool,
    /// Motion phase report, if the motion phase ran.
    pub motion: Option<MotionReport>,
    /// Total weight after the sensor phase, before normalization.
    pub total_weight: f64,
    /// Samples above the floor after this cycle.
    pub active_samples: usize,
    /// Whether a new particle cloud was drawn.
    pub resampled: bool,
}

/// Grid-based Markov localization filter.
#[derive(Debug)]
pub struct MarkovLocalizer {
    config: MarkovConfig,
    free_space: FreeSpaceIndex,
    belief: BeliefStore,
    kernels: KernelBuilder,
    sensor_model: LikelihoodFieldModel,
    pool: WorkerPool,
    rng: StdRng,
    active: Vec<usize>,
    floor: f64,
    /// Odometry pose of the last completed update.
    last_odom: Option<Pose2D>,
    force_update: bool,
    updates: u64,
    cloud: ParticleCloud,
    last_total_weight: f64,
}

impl MarkovLocalizer {
    /// Create a localizer with a uniform belief over the free space of `map`.
    pub fn new<M: OccupancyMap + ?Sized>(config: MarkovConfig, map: &M) -> Result<Self> {
        config
            .validate()
            .map_err(|e| LocalizationError::InvalidConfig(e.to_string()))?;

        let free_space = FreeSpaceIndex::build(map);
        if free_space.is_empty() {
            return Err(LocalizationError::InvalidConfig(
                "map has no free cells".to_string(),
            ));
        }

        let headings = config.heading_bins();
        let belief = BeliefStore::new(&free_space, headings);
        let floor = normalize::floor_weight(belief.len(), config.grid.floor_divisor);
        let kernels = KernelBuilder::new(
            MotionModel::new(config.motion),
            headings,
            map.resolution(),
        );
        let sensor_model = LikelihoodFieldModel::new(config.sensor);
        let pool = WorkerPool::with_workers(config.filter.workers);
        let rng = if config.filter.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.filter.seed)
        };

        log::info!(
            "Markov localizer: {} free cells x {} headings = {} samples, {} workers",
            free_space.len(),
            headings.count(),
            belief.len(),
            pool.workers()
        );

        Ok(Self {
            active: (0..belief.len()).collect(),
            config,
            free_space,
            belief,
            kernels,
            sensor_model,
            pool,
            rng,
            floor,
            last_odom: None,
            force_update: false,
            updates: 0,
            cloud: ParticleCloud::default(),
            last_total_weight: 1.0,
        })
    }

    /// Feed one odometry pose and scan.
    ///
    /// The first call initializes the filter and runs the sensor phase only.
    /// Later calls run a full cycle when the robot moved more than
    /// `update_min_d` along x or y, turned more than `update_min_a`, or an
    /// update was forced; otherwise the call is a no-op.
    pub fn process<M: OccupancyMap + ?Sized>(
        &mut self,
        odom: &Pose2D,
        scan: &LaserScan,
        map: &M,
    ) -> Result<CycleReport> {
        self.check_map(map)?;

        let observed = match self.last_odom {
            None => None,
            Some(last) => {
                if !self.should_update(&last, odom) {
                    return Ok(CycleReport::default());
                }
                Some(MotionDecomposition::between(&last, odom))
            }
        };

        let motion = observed.filter(|_| self.config.filter.motion_update);
        let report = self.run_cycle(motion.as_ref(), scan, map);
        match &report {
            Ok(_) => {
                self.last_odom = Some(*odom);
                self.force_update = false;
            }
            Err(e) => log::warn!("Cycle failed, keeping previous belief: {}", e),
        }
        report
    }

    /// Run the next cycle regardless of the motion thresholds.
    pub fn force_update(&mut self) {
        self.force_update = true;
    }

    fn should_update(&self, last: &Pose2D, odom: &Pose2D) -> bool {
        let filter = &self.config.filter;
        self.force_update
            || (odom.x - last.x).abs() > filter.update_min_d
            || (odom.y - last.y).abs() > filter.update_min_d
            || angle_diff(last.theta, odom.theta).abs() > filter.update_min_a
    }

    fn check_map<M: OccupancyMap + ?Sized>(&self, map: &M) -> Result<()> {
        if map.dimensions() != self.free_space.dimensions() {
            return Err(LocalizationError::InvalidConfig(format!(
                "map is {:?}, localizer was built for {:?}",
                map.dimensions(),
                self.free_space.dimensions()
            )));
        }
        Ok(())
    }

    fn run_cycle<M: OccupancyMap + ?Sized>(
        &mut self,
        observed: Option<&MotionDecomposition>,
        scan: &LaserScan,
        map: &M,
    ) -> Result<CycleReport> {
        let started = Instant::now();

        let motion = match observed {
            Some(observed) => {
                let kernel = self.kernels.build(observed, &self.pool)?;
                let report = motion_update::apply(
                    &mut self.belief,
                    &kernel,
                    &self.free_space,
                    map,
                    &self.active,
                    self.floor,
                    &self.pool,
                );
                let current = self.belief.current_mut();
                // Re-summed serially so the result does not depend on the partition
                let total = normalize::total_weight(current);
                normalize::normalize(current, total)?;
                Some(report)
            }
            None => {
                self.belief.carry_forward();
                None
            }
        };
        let motion_elapsed = started.elapsed();

        let current = self.belief.current_mut();
        normalize::floor_weights(current, self.floor);
        let sensor_total =
            sensor_update::apply(current, scan, &self.sensor_model, map, &self.pool)?;
        let total = normalize::total_weight(current);
        normalize::normalize(current, total)?;

        let mut active = std::mem::take(&mut self.active);
        normalize::rebuild_active_set(current, self.floor, &mut active);
        self.active = active;

        self.updates += 1;
        let resampled = self.updates % self.config.filter.resample_interval as u64 == 0;
        if resampled {
            self.cloud = resample::low_variance(
                self.belief.current(),
                self.config.filter.cloud_size,
                &mut self.rng,
            );
        }

        self.belief.swap_generations();
        self.last_total_weight = total;

        log::debug!(
            "Cycle {}: motion {:.1}ms, total {:.1}ms, sensor total {:.6e}",
            self.updates,
            motion_elapsed.as_secs_f64() * 1000.0,
            started.elapsed().as_secs_f64() * 1000.0,
            sensor_total
        );
        log::info!(
            "Cycle {}: {} active of {} samples{}",
            self.updates,
            self.active.len(),
            self.belief.len(),
            if resampled { ", resampled" } else { "" }
        );

        Ok(CycleReport {
            updated: true,
            motion,
            total_weight: total,
            active_samples: self.active.len(),
            resampled,
        })
    }

    /// Draw `target` particles from the latest belief and keep them as the
    /// current cloud.
    pub fn resample(&mut self, target: usize) -> &ParticleCloud {
        self.cloud = resample::low_variance(self.belief.latest(), target, &mut self.rng);
        &self.cloud
    }

    /// Reweight the particle cloud against `scan` and renormalize it.
    ///
    /// Returns the total weight before normalization. On error the cloud is
    /// left unchanged.
    pub fn reweight_cloud<M: OccupancyMap + ?Sized>(
        &mut self,
        scan: &LaserScan,
        map: &M,
    ) -> Result<f64> {
        let mut cloud = self.cloud.clone();
        let particles = cloud.particles_mut();
        sensor_update::apply(particles, scan, &self.sensor_model, map, &self.pool)?;
        let total = normalize::total_weight(particles);
        normalize::normalize(particles, total)?;
        self.cloud = cloud;
        Ok(total)
    }

    /// Pose estimate: the cloud mean if a cloud was drawn, otherwise the
    /// most likely discretized pose.
    pub fn estimate(&self) -> Option<Pose2D> {
        self.cloud.mean().or_else(|| self.most_likely_pose())
    }

    /// Pose of the highest-weight discretized sample.
    pub fn most_likely_pose(&self) -> Option<Pose2D> {
        self.belief
            .latest()
            .iter()
            .fold(None, |best: Option<&WeightedSample>, s| match best {
                Some(b) if b.weight >= s.weight => best,
                _ => Some(s),
            })
            .map(|s| s.pose)
    }

    /// Export the latest belief.
    pub fn snapshot(&self) -> BeliefSnapshot {
        BeliefSnapshot::capture(&self.belief, &self.free_space)
    }

    /// Restart from a uniform belief.
    pub fn reset(&mut self) {
        self.belief.reset_uniform();
        self.active = (0..self.belief.len()).collect();
        self.last_odom = None;
        self.force_update = false;
        self.updates = 0;
        self.cloud = ParticleCloud::default();
        self.last_total_weight = 1.0;
    }

    pub fn config(&self) -> &MarkovConfig {
        &self.config
    }

    pub fn belief(&self) -> &BeliefStore {
        &self.belief
    }

    pub fn free_space(&self) -> &FreeSpaceIndex {
        &self.free_space
    }

    pub fn cloud(&self) -> &ParticleCloud {
        &self.cloud
    }

    /// Indices of the samples above the floor weight.
    pub fn active_samples(&self) -> &[usize] {
        &self.active
    }

    pub fn floor_weight(&self) -> f64 {
        self.floor
    }

    /// Total weight of the last completed cycle, before normalization.
    pub fn last_total_weight(&self) -> f64 {
        self.last_total_weight
    }

    /// Number of completed filter updates.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }
}
