use std::{fs::File, io::Read, path::Path};

use anyhow::{bail, Context};
use boids_lib::{
    birdwatcher::{Birdwatcher, FlockStats, Frame},
    math_helpers::Space,
    options::RunOptions,
    simulation::Simulation,
};
use clap_serde_derive::{clap::Parser, ClapSerde};
use glam::{Vec2, Vec3};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cliargs;
use cliargs::{Args, Config};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Parse whole args with clap
    let mut args = Args::parse();
    let config = load_config(&mut args)?;

    let run_options = config.to_run_options();
    run_options
        .validate()
        .context("invalid simulation options")?;

    match config.dimensions {
        2 => run::<Vec2>(run_options, config.report_every),
        3 => run::<Vec3>(run_options, config.report_every),
        other => bail!("dimensions must be 2 or 3, got {other}"),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Merges the config file, if there is one, under the command line arguments
fn load_config(args: &mut Args) -> anyhow::Result<Config> {
    let path = args.config_path.clone();
    let Ok(mut f) = File::open(&path) else {
        // If there is not config file return only config parsed from clap
        return Ok(Config::from(&mut args.config));
    };

    let mut raw = String::new();
    f.read_to_string(&mut raw)
        .with_context(|| format!("reading {}", path.display()))?;

    let parsed = if is_toml(&path) {
        toml::from_str::<<Config as ClapSerde>::Opt>(&raw)
            .with_context(|| format!("error in configuration file {}", path.display()))?
    } else {
        serde_yaml::from_str::<<Config as ClapSerde>::Opt>(&raw)
            .with_context(|| format!("error in configuration file {}", path.display()))?
    };

    // merge config already parsed from clap
    Ok(Config::from(parsed).merge(&mut args.config))
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

fn run<V: Space>(run_options: RunOptions, report_every: u64) -> anyhow::Result<()> {
    let mut sim = Simulation::<V>::new(run_options)?;
    let mut log_watcher = LogWatcher::new(report_every, sim.run_options().sensory_distance);

    info!(
        boids = sim.run_options().init_boids,
        ticks = sim.run_options().ticks,
        dimensions = V::DIM,
        "starting run"
    );

    let mut watchers: [&mut dyn Birdwatcher<V>; 1] = [&mut log_watcher];
    let summary = sim.run(&mut watchers)?;

    info!(
        ticks = summary.ticks,
        mean_speed = summary.stats.mean_speed,
        max_speed = summary.stats.max_speed,
        mean_neighbours = summary.stats.mean_neighbours,
        centroid = ?summary.stats.centroid,
        "run complete"
    );

    Ok(())
}

/// Stands in for a renderer, logs flock statistics every `report_every` ticks
struct LogWatcher {
    report_every: u64,
    sensory_distance: f32,
    reports: u64,
}

impl LogWatcher {
    fn new(report_every: u64, sensory_distance: f32) -> Self {
        LogWatcher {
            report_every,
            sensory_distance,
            reports: 0,
        }
    }
}

impl<V: Space> Birdwatcher<V> for LogWatcher {
    fn watch(&mut self, frame: &Frame<'_, V>) {
        if self.report_every == 0 || frame.tick % self.report_every != 0 {
            return;
        }

        let stats = FlockStats::from_boids(frame.boids, self.sensory_distance);
        if !stats.mean_speed.is_finite() {
            warn!(tick = frame.tick, "flock speed is no longer finite");
        }

        info!(
            tick = frame.tick,
            mean_speed = stats.mean_speed,
            max_speed = stats.max_speed,
            mean_neighbours = stats.mean_neighbours,
            trail_depth = frame.trail.depth(),
            "flock"
        );
        self.reports += 1;
    }

    fn finish(&mut self) {
        info!(reports = self.reports, "watch over");
    }
}
