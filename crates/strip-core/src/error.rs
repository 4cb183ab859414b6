//! Construction-time errors.

use thiserror::Error;

/// Invalid startup configuration. Always fatal: callers check it before the
/// frame loop starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Parallel initialization inputs disagree in length
    #[error(
        "length mismatch of hues ({hues}), positions ({positions}) or velocities ({velocities})"
    )]
    LengthMismatch {
        hues: usize,
        positions: usize,
        velocities: usize,
    },

    #[error("LED count must be at least 1, got {0}")]
    InvalidLedCount(usize),

    #[error("max brightness must be within 0..=255, got {0}")]
    InvalidBrightness(f32),

    #[error("frame blend factor must be within (0, 1], got {0}")]
    InvalidBlendFactor(f32),

    #[error("simulation timestep must be finite and positive, got {0}")]
    InvalidTimestep(f32),

    #[error("particle mass must be finite and positive, got {0}")]
    InvalidMass(f32),

    #[error("tick period must be non-zero")]
    InvalidTickPeriod,

    #[error("hue must be finite, got {0}")]
    InvalidHue(f32),
}
