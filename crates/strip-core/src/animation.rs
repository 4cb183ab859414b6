//! Time-based overlays drawn on top of (or instead of) the particle frame.
//!
//! Each kind is a plain parameter struct with a pure `apply`. The render stage
//! owns an [`AnimationStack`], advances it by the frame time and drops
//! overlays whose lifetime has run out.

use crate::color::{hsv_to_rgb, to_rgb8};
use crate::constants::MAX_BRIGHTNESS;
use crate::frame::FrameBuffer;
use glam::Vec3;
use rand::prelude::*;
use std::time::Duration;

/// Hue gradient along the strip, scrolling over time. Replaces the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RainbowParams {
    pub speed_deg_per_sec: f32,
    /// Hue step between neighbouring LEDs.
    pub spacing_deg: f32,
    pub value: f32,
    pub brightness: f32,
}

/// Whole-strip sinusoidal swell of one color, added onto the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PulseParams {
    pub color: Vec3,
    pub period: Duration,
    pub brightness: f32,
}

/// Solid color. Replaces the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FillParams {
    pub color: [u8; 3],
}

/// Random hue per LED, redrawn every `reseed_period`. Replaces the frame.
/// The pattern is a pure function of `seed` and the elapsed time.
#[derive(Clone, Debug, PartialEq)]
pub struct SparkleParams {
    pub seed: u64,
    pub reseed_period: Duration,
    pub value: f32,
    pub brightness: f32,
}

impl Default for RainbowParams {
    fn default() -> Self {
        Self {
            speed_deg_per_sec: crate::constants::RAINBOW_SPEED_DEG_PER_SEC,
            spacing_deg: 1.0,
            value: crate::constants::RAINBOW_VALUE,
            brightness: MAX_BRIGHTNESS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnimationKind {
    Rainbow(RainbowParams),
    Pulse(PulseParams),
    Fill(FillParams),
    Sparkle(SparkleParams),
}

impl AnimationKind {
    pub fn apply(&self, buffer: &FrameBuffer, elapsed: Duration) -> FrameBuffer {
        let mut out = buffer.clone();
        let t = elapsed.as_secs_f32();
        match self {
            AnimationKind::Rainbow(p) => {
                let offset = t * p.speed_deg_per_sec;
                for (i, px) in out.pixels_mut().iter_mut().enumerate() {
                    let hue = offset + i as f32 * p.spacing_deg;
                    *px = to_rgb8(hsv_to_rgb(hue, 1.0, p.value), p.brightness);
                }
            }
            AnimationKind::Pulse(p) => {
                let period = p.period.as_secs_f32().max(f32::EPSILON);
                let phase = std::f32::consts::TAU * t / period;
                // Starts dark, peaks half a period in.
                let level = (1.0 - phase.cos()) / 2.0;
                let add = to_rgb8(p.color, p.brightness * level);
                for i in 0..out.led_count() {
                    out.add_pixel(i, add);
                }
            }
            AnimationKind::Fill(p) => out.fill(p.color),
            AnimationKind::Sparkle(p) => {
                let period = p.reseed_period.as_nanos().max(1);
                let epoch = (elapsed.as_nanos() / period) as u64;
                let mix = p.seed ^ epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let mut rng = StdRng::seed_from_u64(mix);
                for px in out.pixels_mut() {
                    let hue = rng.gen_range(0.0..360.0);
                    *px = to_rgb8(hsv_to_rgb(hue, 1.0, p.value), p.brightness);
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    /// `None` runs forever.
    pub lifetime: Option<Duration>,
    pub elapsed: Duration,
}

impl Animation {
    pub fn is_finished(&self) -> bool {
        self.lifetime.is_some_and(|l| self.elapsed >= l)
    }
}

#[derive(Default)]
pub struct AnimationStack {
    animations: Vec<Animation>,
}

impl AnimationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: AnimationKind, lifetime: Option<Duration>) {
        self.animations.push(Animation {
            kind,
            lifetime,
            elapsed: Duration::ZERO,
        });
    }

    /// Move every overlay forward and retire the ones that have expired.
    pub fn advance(&mut self, dt: Duration) {
        for a in &mut self.animations {
            a.elapsed += dt;
        }
        let before = self.animations.len();
        self.animations.retain(|a| !a.is_finished());
        let retired = before - self.animations.len();
        if retired > 0 {
            log::trace!("retired {retired} animation(s)");
        }
    }

    /// Apply all overlays in insertion order.
    pub fn apply(&self, buffer: &FrameBuffer) -> FrameBuffer {
        self.animations
            .iter()
            .fold(buffer.clone(), |frame, a| a.kind.apply(&frame, a.elapsed))
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
