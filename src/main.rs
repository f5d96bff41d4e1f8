//! dhruva-markov - replay a recorded odometry/scan log through the Markov
//! localizer.
//!
//! # Usage
//!
//! ```bash
//! # With default config (configs/markov.yaml)
//! cargo run --release -- --map room.map --replay room_replay.yaml
//!
//! # Bundled demo with a belief export
//! cargo run --release -- -c demos/markov.yaml --map demos/room.map \
//!     --replay demos/room_replay.yaml --snapshot /tmp/belief.yaml
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use dhruva_markov::config::{DEFAULT_CONFIG_PATH, MarkovConfig};
use dhruva_markov::io::ReplayLog;
use dhruva_markov::map::GridMap;
use dhruva_markov::markov::MarkovLocalizer;

// ============================================================================
// Arguments
// ============================================================================

/// Replay a recorded odometry/scan log through the Markov localizer.
///
/// Map format: '#' occupied, '.' free, anything else unknown; the first line
/// is the top row. Resolution and origin come from the `map:` section of the
/// config.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to configs/markov.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ASCII occupancy map
    #[arg(short, long)]
    map: PathBuf,

    /// YAML odometry/scan log
    #[arg(short, long)]
    replay: PathBuf,

    /// Write the final belief as YAML
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<MarkovConfig, String> {
    match &args.config {
        Some(path) => {
            let config = MarkovConfig::load(path)
                .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => MarkovConfig::load_default().map_err(|e| {
            format!("Failed to load config {}: {}", DEFAULT_CONFIG_PATH, e)
        }),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let config = load_config(args)?;
    let map_path = args.map.as_path();
    let replay_path = args.replay.as_path();

    let map = GridMap::load(map_path, config.map.clone())
        .map_err(|e| format!("Failed to load map {}: {}", map_path.display(), e))?;
    let replay = ReplayLog::load(replay_path)
        .map_err(|e| format!("Failed to load replay {}: {}", replay_path.display(), e))?;

    let (free, occupied, unknown) = map.count_cells();
    log::info!("dhruva-markov starting");
    log::info!(
        "  Map: {} ({} free, {} occupied, {} unknown)",
        map_path.display(),
        free,
        occupied,
        unknown
    );
    log::info!(
        "  Replay: {} ({} frames)",
        if replay.name.is_empty() {
            replay_path.display().to_string()
        } else {
            replay.name.clone()
        },
        replay.len()
    );

    let mut localizer = MarkovLocalizer::new(config, &map).map_err(|e| e.to_string())?;

    let mut failed = 0usize;
    for (i, frame) in replay.frames.iter().enumerate() {
        match localizer.process(&frame.odom, &frame.scan, &map) {
            Ok(report) if report.updated => {
                if let Some(motion) = report.motion.as_ref().filter(|m| m.anomalies() > 0) {
                    log::warn!("Frame {}: {} motion anomalies", i, motion.anomalies());
                }
            }
            Ok(_) => log::debug!("Frame {}: below update thresholds", i),
            Err(e) => {
                failed += 1;
                log::warn!("Frame {}: {}", i, e);
            }
        }
    }

    log::info!(
        "Processed {} frames: {} updates, {} failed cycles",
        replay.len(),
        localizer.updates(),
        failed
    );
    if let Some(pose) = localizer.most_likely_pose() {
        log::info!(
            "  Most likely pose: ({:.3}, {:.3}, {:.1}°)",
            pose.x,
            pose.y,
            pose.theta.to_degrees()
        );
    }
    if let Some(pose) = localizer.estimate() {
        log::info!(
            "  Estimate: ({:.3}, {:.3}, {:.1}°)",
            pose.x,
            pose.y,
            pose.theta.to_degrees()
        );
    }
    if let Some(cov) = localizer.cloud().covariance() {
        log::info!(
            "  Cloud spread: σx={:.3} σy={:.3} σθ={:.3}",
            cov.var_x().sqrt(),
            cov.var_y().sqrt(),
            cov.var_theta().sqrt()
        );
    }

    if let Some(path) = &args.snapshot {
        write_snapshot(path, &localizer)?;
    }

    Ok(())
}

fn write_snapshot(path: &Path, localizer: &MarkovLocalizer) -> Result<(), String> {
    let yaml = serde_yaml::to_string(&localizer.snapshot())
        .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;
    std::fs::write(path, yaml).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    log::info!("Belief snapshot written to {}", path.display());
    Ok(())
}
