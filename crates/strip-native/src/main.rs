//! Native entry point: runs the frame loop and streams frames over UDP.

mod cli;
mod presence;
mod transport;

use anyhow::Context;
use clap::Parser;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use strip_core::{
    hue_color, AnimationKind, ParticleSet, PulseParams, RainbowParams, SharedParticles,
    SparkleParams, StripEngine, NEW_PARTICLE_PULSE_MS, RAINBOW_VALUE, SPARKLE_RESEED_MS,
};

use crate::cli::{Cli, Mode};
use crate::transport::UdpTransport;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::builder()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let config = cli.strip_config();
    let mut engine = StripEngine::new(config).context("invalid strip configuration")?;
    let particles = match cli.mode {
        Mode::Kinetic => ParticleSet::from_parts(&cli.initial_hues(), &[], &[], cli.seed)
            .context("invalid initial particles")?,
        _ => ParticleSet::new(cli.seed),
    };
    let shared = SharedParticles::new(particles);
    install_mode_overlay(&mut engine, &cli);

    let (created_tx, created_rx) = mpsc::channel();
    if cli.mode == Mode::Kinetic && !cli.no_presence {
        presence::spawn_listener(&cli.presence_bind, shared.clone(), created_tx)?;
    }

    let mut transport = UdpTransport::new(&cli.host, cli.port)?;
    log::info!(
        "streaming {} LEDs ({:?} mode, {} particles) to {}:{} every {:?}",
        engine.config().render.led_count,
        cli.mode,
        shared.len(),
        cli.host,
        cli.port,
        engine.config().tick_period
    );

    run(&mut engine, &shared, &mut transport, &created_rx, cli.frames);

    log::info!(
        "stopped after {} frames ({} sent, {} dropped)",
        engine.tick_index(),
        transport.sent(),
        transport.dropped()
    );
    Ok(())
}

fn run(
    engine: &mut StripEngine,
    shared: &SharedParticles,
    transport: &mut UdpTransport,
    created: &Receiver<Vec<u16>>,
    max_frames: Option<u64>,
) {
    let period = engine.config().tick_period;
    loop {
        let started = Instant::now();
        while let Ok(hues) = created.try_recv() {
            announce_arrivals(engine, &hues);
        }

        let frame = engine.frame(shared);
        transport.send(frame.as_bytes());

        let frames = engine.tick_index();
        if frames % 1000 == 0 {
            let stats = engine.last_stats();
            log::debug!(
                "frame {frames}: {} particles, energy {:.3}, {} reflections",
                shared.len(),
                stats.measured_energy,
                stats.reflections
            );
        }
        if max_frames.is_some_and(|n| frames >= n) {
            break;
        }

        // Overruns just run late; there is no catch-up.
        if let Some(rest) = period.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Brief swell in each newcomer's color, on top of the particles.
fn announce_arrivals(engine: &mut StripEngine, hues: &[u16]) {
    let lifetime = Duration::from_millis(NEW_PARTICLE_PULSE_MS);
    let brightness = engine.config().render.max_brightness * 0.2;
    for &hue in hues {
        engine.animations_mut().push(
            AnimationKind::Pulse(PulseParams {
                color: hue_color(hue as f32),
                period: lifetime,
                brightness,
            }),
            Some(lifetime),
        );
    }
}

fn install_mode_overlay(engine: &mut StripEngine, cli: &Cli) {
    let brightness = engine.config().render.max_brightness;
    let tick_period = engine.config().tick_period;
    let kind = match cli.mode {
        Mode::Kinetic => return,
        Mode::Rainbow => AnimationKind::Rainbow(RainbowParams {
            brightness,
            ..RainbowParams::default()
        }),
        Mode::Sparkle => AnimationKind::Sparkle(SparkleParams {
            seed: cli.seed.unwrap_or_else(rand::random),
            reseed_period: Duration::from_millis(SPARKLE_RESEED_MS),
            value: RAINBOW_VALUE,
            brightness,
        }),
        // One radian of phase per tick.
        Mode::Pulse => AnimationKind::Pulse(PulseParams {
            color: glam::Vec3::X,
            period: tick_period.mul_f32(std::f32::consts::TAU),
            brightness: brightness * 0.8,
        }),
    };
    engine.animations_mut().push(kind, None);
}
