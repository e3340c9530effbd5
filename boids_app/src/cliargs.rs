use boids_lib::{
    field::WindField,
    options::{RunOptions, SeparationGuard, SpeedClamp, UpdateMode},
};
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[command(author="PheelaV", version, about, long_about = None)]
/// Headless Boids (Reynolds '86) flocking in two or three dimensions.
pub struct Args {
    /// Config file, YAML unless it ends in .toml
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(100)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(2)]
    #[arg(short = 'd', long)]
    /// 2 for a planar flock, 3 for a volumetric one
    pub dimensions: u8,

    #[default(10_000)]
    #[arg(short = 't', long)]
    pub ticks: u64,

    #[default(0x5EED)]
    #[arg(long)]
    pub seed: u64,

    #[default(false)]
    #[arg(long)]
    /// ignore the seed and draw the initial flock from entropy
    pub entropy: bool,

    #[default(720.)]
    #[arg(short = 'x', long)]
    pub width: f32,

    #[default(480.)]
    #[arg(short = 'y', long)]
    pub height: f32,

    #[default(100.)]
    #[arg(short = 'z', long)]
    pub depth: f32,

    #[default(1.)]
    #[arg(long = "max_speed")]
    pub max_speed: f32,

    #[default(false)]
    #[arg(long = "legacy_clamp")]
    /// divide by speed * max_speed when clamping, like the first prototype did
    pub legacy_clamp: bool,

    #[default(40.)]
    #[arg(long = "sens_dist")]
    /// locality radius
    pub sensory_distance: f32,

    #[default(0.1)]
    #[arg(long = "ali_coef")]
    pub alignment_coefficient: f32,
    #[default(0.01)]
    #[arg(long = "coh_coef")]
    pub cohesion_coefficient: f32,
    #[default(0.025)]
    #[arg(long = "sep_coef")]
    pub separation_coefficient: f32,

    #[default(0.001)]
    #[arg(long = "sep_eps")]
    /// smallest per axis offset separation divides by, 0 turns the guard off
    pub separation_epsilon: f32,

    #[default(0.5)]
    #[arg(long = "turn")]
    pub turn_strength: f32,

    #[default(0.)]
    #[arg(long = "wind")]
    /// wind strength, 0 for no wind
    pub wind_strength: f32,
    #[default(50)]
    #[arg(long = "wind_period")]
    pub wind_period: u64,
    #[default(0.01)]
    #[arg(long = "wind_freq")]
    pub wind_frequency: f32,

    #[default(false)]
    #[arg(long = "in_place")]
    /// update boids one after another instead of from a tick-start snapshot
    pub in_place: bool,

    #[default(10)]
    #[arg(long = "trail")]
    pub trail_len: usize,

    #[default(500)]
    #[arg(short = 'r', long = "report")]
    /// log flock statistics every this many ticks
    pub report_every: u64,
}

impl Config {
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            init_boids: self.no_boids,
            ticks: self.ticks,
            seed: (!self.entropy).then_some(self.seed),
            width: self.width,
            height: self.height,
            depth: self.depth,
            max_speed: self.max_speed,
            speed_clamp: match self.legacy_clamp {
                true => SpeedClamp::Legacy,
                false => SpeedClamp::Scaled,
            },
            sensory_distance: self.sensory_distance,
            alignment_coefficient: self.alignment_coefficient,
            cohesion_coefficient: self.cohesion_coefficient,
            separation_coefficient: self.separation_coefficient,
            separation_guard: if self.separation_epsilon == 0. {
                SeparationGuard::Unguarded
            } else {
                SeparationGuard::Floor {
                    epsilon: self.separation_epsilon,
                }
            },
            turn_strength: self.turn_strength,
            wind: (self.wind_strength != 0.).then(|| {
                WindField::new(self.wind_strength, self.wind_period, self.wind_frequency)
            }),
            update_mode: match self.in_place {
                true => UpdateMode::InPlace,
                false => UpdateMode::Snapshot,
            },
            trail_len: self.trail_len,
            ..Default::default()
        }
    }
}
