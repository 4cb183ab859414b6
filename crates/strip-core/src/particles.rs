use crate::color::{hue_color, hue_key};
use crate::error::ConfigError;
use fnv::FnvHashMap;
use glam::Vec3;
use rand::prelude::*;

/// Stable identity assigned at creation, never reused within a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub hue: f32,
    pub color: Vec3,
    pub position: f32,
    pub velocity: f32,
    pub flicker: bool,
}

impl Particle {
    /// Integer-degree key used to match this particle against the presence feed.
    #[inline]
    pub fn hue_key(&self) -> u16 {
        hue_key(self.hue)
    }
}

pub struct ParticleSet {
    particles: Vec<Particle>,
    rng: StdRng,
    next_id: u64,
}

impl ParticleSet {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            particles: Vec::new(),
            rng,
            next_id: 0,
        }
    }

    /// Initial population: one randomly placed particle per hue, not flickering.
    pub fn with_hues(hues: &[f32], seed: Option<u64>) -> Self {
        let mut set = Self::new(seed);
        for &hue in hues {
            let mut p = set.create(hue);
            p.flicker = false;
            set.particles.push(p);
        }
        set
    }

    /// Build a set from parallel inputs. Empty `positions` or `velocities` are
    /// filled randomly; any other length disagreement is rejected.
    pub fn from_parts(
        hues: &[f32],
        positions: &[f32],
        velocities: &[f32],
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let mismatched = |len: usize| len != 0 && len != hues.len();
        if mismatched(positions.len()) || mismatched(velocities.len()) {
            return Err(ConfigError::LengthMismatch {
                hues: hues.len(),
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }
        if let Some(&bad) = hues.iter().find(|h| !h.is_finite()) {
            return Err(ConfigError::InvalidHue(bad));
        }
        let mut set = Self::new(seed);
        for (i, &hue) in hues.iter().enumerate() {
            let mut p = set.create(hue);
            p.flicker = false;
            if let Some(&pos) = positions.get(i) {
                p.position = pos.clamp(0.0, 1.0);
            }
            if let Some(&vel) = velocities.get(i) {
                p.velocity = vel;
            }
            set.particles.push(p);
        }
        Ok(set)
    }

    /// Mint a new flickering particle with a random position in \[0, 1) and a
    /// random velocity in \[-1, 1). The particle is not inserted.
    pub fn create(&mut self, hue: f32) -> Particle {
        let hue = hue.rem_euclid(360.0);
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        Particle {
            id,
            hue,
            color: hue_color(hue),
            position: self.rng.gen::<f32>(),
            velocity: self.rng.gen_range(-1.0..1.0),
            flicker: true,
        }
    }

    pub fn insert(&mut self, particle: Particle) {
        self.next_id = self.next_id.max(particle.id.0 + 1);
        self.particles.push(particle);
    }

    /// Install a whole new population in one assignment.
    pub fn replace(&mut self, particles: Vec<Particle>) {
        if let Some(max) = particles.iter().map(|p| p.id.0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.particles = particles;
    }

    pub fn take(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.particles)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn positions(&self) -> Vec<f32> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Sum of `v^2 * mass` over all particles (no one-half factor).
    pub fn kinetic_energy(&self, mass: f32) -> f32 {
        self.particles
            .iter()
            .map(|p| p.velocity * p.velocity * mass)
            .sum()
    }

    /// Multiset of hue keys currently present.
    pub fn hue_counts(&self) -> FnvHashMap<u16, usize> {
        let mut counts = FnvHashMap::default();
        for p in &self.particles {
            *counts.entry(p.hue_key()).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_draws_within_ranges_and_flickers() {
        let mut set = ParticleSet::new(Some(7));
        for _ in 0..500 {
            let p = set.create(42.0);
            assert!((0.0..1.0).contains(&p.position));
            assert!((-1.0..1.0).contains(&p.velocity));
            assert!(p.flicker);
            assert_eq!(p.hue_key(), 42);
        }
        assert!(set.is_empty(), "create must not insert");
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut set = ParticleSet::with_hues(&[0.0, 120.0, 240.0], Some(1));
        let p = set.create(60.0);
        assert_eq!(p.id, ParticleId(3));
        set.insert(p);
        let ids: Vec<_> = set.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let err = ParticleSet::from_parts(&[1.0, 2.0], &[0.5], &[], None)
            .err()
            .expect("mismatch must fail");
        assert_eq!(
            err,
            ConfigError::LengthMismatch {
                hues: 2,
                positions: 1,
                velocities: 0
            }
        );
    }

    #[test]
    fn from_parts_uses_given_values() {
        let set = ParticleSet::from_parts(&[10.0, 20.0], &[0.25, 0.75], &[0.5, -0.5], Some(3))
            .expect("valid parts");
        assert_eq!(set.positions(), vec![0.25, 0.75]);
        assert!((set.kinetic_energy(1.0) - 0.5).abs() < 1e-6);
        assert!(set.iter().all(|p| !p.flicker));
    }

    #[test]
    fn same_seed_same_population() {
        let a = ParticleSet::with_hues(&[5.0, 6.0], Some(99));
        let b = ParticleSet::with_hues(&[5.0, 6.0], Some(99));
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
