//! Immutable startup configuration.
//!
//! Every struct defaults to the values in [`crate::constants`]. A config is
//! validated once before the frame loop starts and never mutated afterwards.

use crate::constants::*;
use crate::error::ConfigError;
use glam::Vec3;
use std::time::Duration;

/// How overlapping particles combine on the same LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Later particles overwrite earlier ones per channel.
    #[default]
    Overwrite,
    /// Channels add up, saturating at 255.
    Additive,
}

/// Target the renormalization step scales kinetic energy towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnergyTarget {
    Fixed(f32),
    /// `w * per_particle * n + (1 - w) * measured`, damping overshoot when the
    /// population changes size.
    Blended { per_particle: f32, weight: f32 },
}

impl EnergyTarget {
    /// Blended target with the default nominal weight.
    pub fn blended(per_particle: f32) -> Self {
        EnergyTarget::Blended {
            per_particle,
            weight: ENERGY_BLEND_WEIGHT,
        }
    }

    pub fn resolve(&self, particle_count: usize, measured: f32) -> f32 {
        match *self {
            EnergyTarget::Fixed(e) => e,
            EnergyTarget::Blended {
                per_particle,
                weight,
            } => weight * per_particle * particle_count as f32 + (1.0 - weight) * measured,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub force_factor: f32,
    pub epsilon: f32,
    pub mass: f32,
    pub timestep: f32,
    pub energy_target: EnergyTarget,
    /// Pairwise potential constant `P`; `None` disables the potential term.
    pub potential: Option<f32>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            force_factor: FORCE_FACTOR,
            epsilon: FORCE_EPSILON,
            mass: PARTICLE_MASS,
            timestep: TIMESTEP_LEN,
            energy_target: EnergyTarget::Fixed(ENERGY_IN_SYSTEM),
            potential: None,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.timestep));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.mass));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub led_count: usize,
    pub max_brightness: f32,
    pub channel_gain: Vec3,
    pub flicker_speed: f32,
    pub composite: CompositeMode,
    /// Decorative color written into the reserved header bytes.
    pub header: Option<[u8; 3]>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            led_count: LED_COUNT,
            max_brightness: MAX_BRIGHTNESS,
            channel_gain: Vec3::from(CHANNEL_GAIN),
            flicker_speed: FLICKER_SPEED,
            composite: CompositeMode::Overwrite,
            header: None,
        }
    }
}

impl RenderConfig {
    pub fn frame_len(&self) -> usize {
        frame_len(self.led_count)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.led_count == 0 {
            return Err(ConfigError::InvalidLedCount(self.led_count));
        }
        if !(0.0..=255.0).contains(&self.max_brightness) {
            return Err(ConfigError::InvalidBrightness(self.max_brightness));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripConfig {
    pub render: RenderConfig,
    pub physics: PhysicsConfig,
    pub tick_period: Duration,
    pub blend_factor: f32,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            physics: PhysicsConfig::default(),
            tick_period: Duration::from_millis(FRAME_SLEEP_MS),
            blend_factor: FRAME_BLEND_FACTOR,
        }
    }
}

impl StripConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()?;
        self.physics.validate()?;
        if self.tick_period.is_zero() {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if !(self.blend_factor > 0.0 && self.blend_factor <= 1.0) {
            return Err(ConfigError::InvalidBlendFactor(self.blend_factor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(StripConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = StripConfig::default();
        cfg.render.led_count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidLedCount(0)));

        let mut cfg = StripConfig::default();
        cfg.render.max_brightness = 300.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidBrightness(300.0)));

        let mut cfg = StripConfig::default();
        cfg.blend_factor = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidBlendFactor(0.0)));

        let mut cfg = StripConfig::default();
        cfg.tick_period = Duration::ZERO;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTickPeriod));

        let mut cfg = StripConfig::default();
        cfg.physics.mass = -1.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidMass(-1.0)));
    }

    #[test]
    fn blended_target_mixes_nominal_and_measured() {
        let target = EnergyTarget::blended(1.0);
        assert!((target.resolve(5, 10.0) - 6.0).abs() < 1e-6);
        assert_eq!(EnergyTarget::Fixed(4.2).resolve(9, 1.0), 4.2);
    }
}
