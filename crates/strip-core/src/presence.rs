//! Reconcile the particle population against the presence feed.
//!
//! The feed reports which hues are currently "present" as an unordered
//! multiset. Particles whose hue is still wanted keep their identity, position
//! and velocity. Surplus particles are dropped, and missing hues get fresh
//! particles.

use crate::particles::{Particle, ParticleSet};
use fnv::FnvHashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub retained: usize,
    /// Hue keys of newly created particles, ascending.
    pub created: Vec<u16>,
    pub dropped: usize,
}

impl ReconcileReport {
    /// True when nothing was created or dropped.
    pub fn is_steady(&self) -> bool {
        self.created.is_empty() && self.dropped == 0
    }
}

/// Multiset of hue keys, each reduced into \[0, 360).
pub fn hue_multiset(hues: &[u16]) -> FnvHashMap<u16, usize> {
    let mut counts = FnvHashMap::default();
    for &hue in hues {
        *counts.entry(hue % 360).or_insert(0) += 1;
    }
    counts
}

pub fn reconcile(set: &mut ParticleSet, present_hues: &[u16]) -> ReconcileReport {
    let mut budget = hue_multiset(present_hues);
    let before = set.hue_counts();
    for key in before.keys() {
        budget.entry(*key).or_insert(0);
    }

    let mut kept: Vec<Particle> = Vec::with_capacity(present_hues.len());
    let mut dropped = 0;
    for mut particle in set.take() {
        match budget.get_mut(&particle.hue_key()) {
            Some(left) if *left > 0 => {
                *left -= 1;
                particle.flicker = false;
                kept.push(particle);
            }
            _ => dropped += 1,
        }
    }
    let retained = kept.len();

    let mut missing: Vec<(u16, usize)> = budget.into_iter().filter(|&(_, n)| n > 0).collect();
    missing.sort_unstable();
    let mut created = Vec::new();
    for (key, count) in missing {
        for _ in 0..count {
            kept.push(set.create(key as f32));
            created.push(key);
        }
    }

    set.replace(kept);
    if !created.is_empty() || dropped > 0 {
        log::debug!(
            "reconciled presence: retained {retained}, created {created:?}, dropped {dropped}"
        );
    }
    ReconcileReport {
        retained,
        created,
        dropped,
    }
}
