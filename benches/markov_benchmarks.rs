//! Markov Localization Benchmarks
//!
//! Benchmarks for the CPU-heavy phases of one observation cycle:
//! - Transition kernel build
//! - Motion update (backward gather)
//! - Sensor update (likelihood field)
//! - Full cycle through the localizer
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use std::f64::consts::TAU;
use std::time::Duration;

use dhruva_markov::config::MarkovConfig;
use dhruva_markov::map::{GridMap, GridMapConfig};
use dhruva_markov::markov::{
    BeliefStore, FreeSpaceIndex, HeadingBins, KernelBuilder, LikelihoodFieldModel,
    MarkovLocalizer, MotionDecomposition, MotionModel, MotionModelConfig, SensorModelConfig,
    WorkerPool, motion_update, sensor_update,
};
use dhruva_markov::{LaserScan, Pose2D};

// ============================================================================
// Test Fixtures
// ============================================================================

/// 4m x 3m walled room at 5cm resolution with a pillar.
fn create_benchmark_map() -> GridMap {
    let (width, height) = (80, 60);
    let mut text = String::with_capacity((width + 1) * height);
    for row in 0..height {
        for col in 0..width {
            let wall = row == 0 || row == height - 1 || col == 0 || col == width - 1;
            let pillar = (20..26).contains(&row) && (50..58).contains(&col);
            text.push(if wall || pillar { '#' } else { '.' });
        }
        text.push('\n');
    }
    GridMap::from_ascii(GridMapConfig::default(), &text).unwrap()
}

/// Create a benchmark scan (360 points)
fn create_benchmark_scan(n_points: usize) -> LaserScan {
    let angle_increment = TAU / n_points as f64;
    let ranges: Vec<f64> = (0..n_points)
        .map(|i| {
            let angle = i as f64 * angle_increment;
            1.2 + 0.6 * angle.cos().abs() + 0.02 * (i as f64 * 0.1).sin()
        })
        .collect();

    LaserScan::new(
        0.0,
        TAU - angle_increment,
        angle_increment,
        0.15,
        8.0,
        ranges,
    )
}

fn benchmark_config() -> MarkovConfig {
    let mut config = MarkovConfig::default();
    config.grid.angular_resolution_deg = 10.0;
    config.filter.seed = 1;
    config.filter.cloud_size = 1000;
    config
}

// ============================================================================
// Phase Benchmarks
// ============================================================================

fn bench_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("markov_phases");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(1));

    let map = create_benchmark_map();
    let scan = create_benchmark_scan(360);
    let free_space = FreeSpaceIndex::build(&map);
    let headings = HeadingBins::from_degrees(10.0);
    let pool = WorkerPool::from_hardware();

    let builder = KernelBuilder::new(
        MotionModel::new(MotionModelConfig::default()),
        headings,
        map.config().resolution,
    );
    let observed = MotionDecomposition::between(
        &Pose2D::new(1.0, 1.0, 0.0),
        &Pose2D::new(1.2, 1.05, 0.1),
    );

    group.bench_function("kernel_build/36", |b| {
        b.iter(|| builder.build(black_box(&observed), &pool))
    });

    let kernel = builder.build(&observed, &pool).unwrap();
    let store = BeliefStore::new(&free_space, headings);
    let active: Vec<usize> = (0..store.len()).collect();

    group.bench_function("motion_update/all_active", |b| {
        b.iter_batched(
            || store.clone(),
            |mut store| {
                motion_update::apply(
                    &mut store,
                    black_box(&kernel),
                    &free_space,
                    &map,
                    &active,
                    0.0,
                    &pool,
                )
            },
            BatchSize::LargeInput,
        )
    });

    let model = LikelihoodFieldModel::new(SensorModelConfig::default());
    group.bench_function("sensor_update/30_beams", |b| {
        b.iter_batched(
            || store.clone(),
            |mut store| {
                sensor_update::apply(
                    store.current_mut(),
                    black_box(&scan),
                    &model,
                    &map,
                    &pool,
                )
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

// ============================================================================
// Full Cycle Benchmarks
// ============================================================================

fn bench_full_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("markov_cycle");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let map = create_benchmark_map();
    let scan = create_benchmark_scan(360);
    let start = Pose2D::new(1.0, 1.0, 0.0);
    let moved = Pose2D::new(1.25, 1.0, 0.0);

    group.bench_function("process/move_0.25m", |b| {
        b.iter_batched(
            || {
                let mut localizer = MarkovLocalizer::new(benchmark_config(), &map).unwrap();
                localizer.process(&start, &scan, &map).unwrap();
                localizer
            },
            |mut localizer| localizer.process(black_box(&moved), &scan, &map),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_phases, bench_full_cycle);

criterion_main!(benches);
