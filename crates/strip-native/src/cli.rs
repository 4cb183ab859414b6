//! Command-line options for the native streamer.

use clap::{Parser, ValueEnum};
use rand::prelude::*;
use std::time::Duration;
use strip_core::{
    CompositeMode, EnergyTarget, PhysicsConfig, RenderConfig, StripConfig, DEFAULT_USER_COUNT,
    ENERGY_IN_SYSTEM, FRAME_SLEEP_MS, LED_COUNT, LED_HOST, LED_PORT, MAX_BRIGHTNESS,
    PRESENCE_BIND,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Repelling particles, one per present user
    Kinetic,
    /// Scrolling dim rainbow
    Rainbow,
    /// Random hue per LED every frame
    Sparkle,
    /// Whole strip breathing red
    Pulse,
}

#[derive(Parser, Debug)]
#[command(name = "kinetic-strip")]
#[command(about = "Stream kinetic particle animations to a UDP LED controller", long_about = None)]
#[command(version)]
pub struct Cli {
    /// LED controller host name or address
    #[arg(long, env = "KINETIC_STRIP_HOST", default_value = LED_HOST)]
    pub host: String,

    /// LED controller UDP port
    #[arg(long, env = "KINETIC_STRIP_PORT", default_value_t = LED_PORT)]
    pub port: u16,

    /// Number of LEDs on the strip
    #[arg(long, default_value_t = LED_COUNT)]
    pub leds: usize,

    /// Full-scale channel value for a particle (0-255)
    #[arg(long, default_value_t = MAX_BRIGHTNESS)]
    pub brightness: f32,

    /// Milliseconds between frames
    #[arg(long, default_value_t = FRAME_SLEEP_MS)]
    pub tick_ms: u64,

    /// Seed for reproducible particle placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of random initial hues when no --hue is given
    #[arg(long, default_value_t = DEFAULT_USER_COUNT)]
    pub users: usize,

    /// Initial particle hue in degrees (repeatable)
    #[arg(long = "hue")]
    pub hues: Vec<f32>,

    /// Address the presence listener binds to
    #[arg(long, env = "KINETIC_STRIP_PRESENCE", default_value = PRESENCE_BIND)]
    pub presence_bind: String,

    /// Do not listen for presence updates
    #[arg(long)]
    pub no_presence: bool,

    /// Sum overlapping particles instead of letting the last one win
    #[arg(long)]
    pub additive: bool,

    /// Scale the energy target with the particle count instead of fixing it
    #[arg(long)]
    pub blended_energy: bool,

    /// Decorative color for the reserved header bytes, as r,g,b
    #[arg(long, value_parser = parse_rgb)]
    pub header: Option<[u8; 3]>,

    /// What to draw
    #[arg(long, value_enum, default_value_t = Mode::Kinetic)]
    pub mode: Mode,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn strip_config(&self) -> StripConfig {
        StripConfig {
            render: RenderConfig {
                led_count: self.leds,
                max_brightness: self.brightness,
                composite: if self.additive {
                    CompositeMode::Additive
                } else {
                    CompositeMode::Overwrite
                },
                header: self.header,
                ..RenderConfig::default()
            },
            physics: PhysicsConfig {
                energy_target: if self.blended_energy {
                    EnergyTarget::blended(ENERGY_IN_SYSTEM / DEFAULT_USER_COUNT as f32)
                } else {
                    EnergyTarget::Fixed(ENERGY_IN_SYSTEM)
                },
                ..PhysicsConfig::default()
            },
            tick_period: Duration::from_millis(self.tick_ms),
            ..StripConfig::default()
        }
    }

    /// Explicit `--hue`s, or `--users` random whole-degree hues.
    pub fn initial_hues(&self) -> Vec<f32> {
        if !self.hues.is_empty() {
            return self.hues.clone();
        }
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s.rotate_left(17)),
            None => StdRng::from_entropy(),
        };
        (0..self.users)
            .map(|_| rng.gen_range(0..360u16) as f32)
            .collect()
    }
}

fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected r,g,b but got '{s}'"));
    };
    let channel = |v: &str| v.parse::<u8>().map_err(|e| format!("bad channel '{v}': {e}"));
    Ok([channel(*r)?, channel(*g)?, channel(*b)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cli = Cli::try_parse_from(["kinetic-strip"]).expect("parse");
        assert_eq!(cli.port, LED_PORT);
        assert_eq!(cli.mode, Mode::Kinetic);
        let cfg = cli.strip_config();
        assert_eq!(cfg.render.led_count, LED_COUNT);
        assert_eq!(cfg.tick_period, Duration::from_millis(FRAME_SLEEP_MS));
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = Cli::try_parse_from([
            "kinetic-strip",
            "--leds",
            "60",
            "--additive",
            "--header",
            "1, 2,3",
            "--hue",
            "10",
            "--hue",
            "200",
            "--blended-energy",
            "-vv",
        ])
        .expect("parse");
        let cfg = cli.strip_config();
        assert_eq!(cfg.render.led_count, 60);
        assert_eq!(cfg.render.composite, CompositeMode::Additive);
        assert_eq!(cfg.render.header, Some([1, 2, 3]));
        assert!(matches!(
            cfg.physics.energy_target,
            EnergyTarget::Blended { .. }
        ));
        assert_eq!(cli.initial_hues(), vec![10.0, 200.0]);
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);
    }

    #[test]
    fn seeded_users_are_reproducible() {
        let cli = Cli::try_parse_from(["kinetic-strip", "--users", "4", "--seed", "9"])
            .expect("parse");
        let hues = cli.initial_hues();
        assert_eq!(hues.len(), 4);
        assert_eq!(hues, cli.initial_hues());
        assert!(hues.iter().all(|h| (0.0..360.0).contains(h)));
    }

    #[test]
    fn bad_header_is_rejected() {
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
        assert_eq!(parse_rgb("0,0,255"), Ok([0, 0, 255]));
    }
}
