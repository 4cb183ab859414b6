//! One simulation tick on the unit track.
//!
//! The phases run in a fixed order: pairwise forces update velocities, the new
//! velocities move positions, energy is renormalized, then positions are
//! reflected back into \[0, 1\].

use crate::config::PhysicsConfig;
use crate::particles::ParticleSet;
use smallvec::SmallVec;

/// Pairwise radial force as a function of signed separation `r = p_i - p_j`.
pub trait ForceLaw: Send + Sync {
    fn force(&self, separation: f32) -> f32;
}

/// Electrostatic-style repulsion, `k / r^2` pointing away from the neighbour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InverseSquare {
    pub k: f32,
}

impl ForceLaw for InverseSquare {
    #[inline]
    fn force(&self, r: f32) -> f32 {
        let sign = if r < 0.0 { -1.0 } else { 1.0 };
        self.k / (r * r) * sign
    }
}

/// Per-tick diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickStats {
    pub measured_energy: f32,
    /// Velocity scale applied, `None` when renormalization was skipped.
    pub normalization: Option<f32>,
    pub reflections: u32,
}

pub struct Integrator<L: ForceLaw = InverseSquare> {
    config: PhysicsConfig,
    law: L,
}

impl Integrator<InverseSquare> {
    pub fn new(config: PhysicsConfig) -> Self {
        let law = InverseSquare {
            k: config.force_factor,
        };
        Self { config, law }
    }
}

impl<L: ForceLaw> Integrator<L> {
    pub fn with_law(config: PhysicsConfig, law: L) -> Self {
        Self { config, law }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance by the configured timestep.
    pub fn step(&self, set: &mut ParticleSet) -> TickStats {
        self.tick(set, self.config.timestep)
    }

    pub fn tick(&self, set: &mut ParticleSet, dt: f32) -> TickStats {
        if set.is_empty() {
            return TickStats::default();
        }
        let eps = self.config.epsilon;
        let mass = self.config.mass;

        // Forces read the pre-tick positions only.
        let positions: SmallVec<[f32; 16]> = set.iter().map(|p| p.position).collect();
        for (i, p) in set.iter_mut().enumerate() {
            let force: f32 = positions
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &other)| positions[i] - other)
                .filter(|r| r.abs() > eps)
                .map(|r| self.law.force(r))
                .sum();
            p.velocity += force / mass * dt;
        }

        for p in set.iter_mut() {
            p.position += p.velocity * dt;
        }

        let measured = self.measured_energy(set);
        let normalization = self.renormalize(set, measured);

        let mut reflections = 0;
        for p in set.iter_mut() {
            let (position, velocity, bounces) = reflect(p.position, p.velocity);
            p.position = position;
            p.velocity = velocity;
            reflections += bounces;
        }

        TickStats {
            measured_energy: measured,
            normalization,
            reflections,
        }
    }

    /// Kinetic energy plus the optional pairwise potential term.
    pub fn measured_energy(&self, set: &ParticleSet) -> f32 {
        set.kinetic_energy(self.config.mass) + self.potential_energy(set)
    }

    /// `sum over i != j of |P / r_ij|`, zero when no coupling is configured.
    pub fn potential_energy(&self, set: &ParticleSet) -> f32 {
        let Some(potential) = self.config.potential else {
            return 0.0;
        };
        let eps = self.config.epsilon;
        let mut coupling = 0.0;
        for (i, a) in set.iter().enumerate() {
            for (j, b) in set.iter().enumerate() {
                let r = a.position - b.position;
                if i != j && r.abs() > eps {
                    coupling += (potential / r).abs();
                }
            }
        }
        coupling
    }

    /// Scale velocities so kinetic plus potential energy equals the target.
    /// Positions are fixed at this point, so only the kinetic share moves.
    fn renormalize(&self, set: &mut ParticleSet, measured: f32) -> Option<f32> {
        if !(measured.is_finite() && measured > 0.0) {
            log::trace!("skipping renormalization, measured energy {measured}");
            return None;
        }
        let kinetic = set.kinetic_energy(self.config.mass);
        let target = self.config.energy_target.resolve(set.len(), measured);
        let kinetic_target = target - (measured - kinetic);
        if !(kinetic > 0.0 && kinetic_target > 0.0) {
            log::trace!("skipping renormalization, kinetic {kinetic} target {kinetic_target}");
            return None;
        }
        // Energy is quadratic in velocity.
        let scale = (kinetic_target / kinetic).sqrt();
        if !scale.is_finite() {
            return None;
        }
        for p in set.iter_mut() {
            p.velocity *= scale;
        }
        Some(scale)
    }
}

/// Fold a position back into \[0, 1\] by elastic reflection, flipping the
/// velocity once per wall hit. Returns the new state and the number of hits.
pub fn reflect(position: f32, velocity: f32) -> (f32, f32, u32) {
    if !position.is_finite() {
        log::warn!("non-finite particle position {position}, recentring");
        return (0.5, 0.0, 0);
    }
    // The track unfolds into a sawtooth of period 2.
    let hits = if position < 0.0 {
        (-position).ceil()
    } else if position > 1.0 {
        position.ceil() - 1.0
    } else {
        return (position, velocity, 0);
    };
    let m = position.rem_euclid(2.0);
    let folded = if m > 1.0 { 2.0 - m } else { m };
    let velocity = if hits % 2.0 == 1.0 { -velocity } else { velocity };
    (folded.clamp(0.0, 1.0), velocity, hits as u32)
}
