//! Per-frame pipeline and the shared particle handle.

use crate::animation::AnimationStack;
use crate::blend::FrameBlender;
use crate::config::StripConfig;
use crate::error::ConfigError;
use crate::frame::FrameBuffer;
use crate::integrator::{Integrator, TickStats};
use crate::particles::ParticleSet;
use crate::presence::{self, ReconcileReport};
use crate::render::Renderer;
use std::sync::{Arc, Mutex, PoisonError};

/// Owned, mutex-guarded particle collection shared between the frame loop and
/// the presence handler. Every access holds the lock for its whole duration,
/// so a tick never observes a half-reconciled population.
#[derive(Clone)]
pub struct SharedParticles {
    inner: Arc<Mutex<ParticleSet>>,
}

impl SharedParticles {
    pub fn new(set: ParticleSet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(set)),
        }
    }

    /// Run `f` with exclusive access. A panic on another thread does not
    /// leave the set unusable.
    pub fn with<R>(&self, f: impl FnOnce(&mut ParticleSet) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn reconcile(&self, present_hues: &[u16]) -> ReconcileReport {
        self.with(|set| presence::reconcile(set, present_hues))
    }

    pub fn len(&self) -> usize {
        self.with(|set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Simulation tick, render, overlays and temporal blend for one frame.
pub struct StripEngine {
    config: StripConfig,
    integrator: Integrator,
    renderer: Renderer,
    blender: FrameBlender,
    animations: AnimationStack,
    scratch: FrameBuffer,
    tick_index: u64,
    last_stats: TickStats,
}

impl StripEngine {
    pub fn new(config: StripConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let led_count = config.render.led_count;
        Ok(Self {
            integrator: Integrator::new(config.physics.clone()),
            renderer: Renderer::new(config.render.clone()),
            blender: FrameBlender::new(led_count, config.blend_factor),
            animations: AnimationStack::new(),
            scratch: FrameBuffer::new(led_count),
            tick_index: 0,
            last_stats: TickStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    pub fn last_stats(&self) -> &TickStats {
        &self.last_stats
    }

    pub fn animations_mut(&mut self) -> &mut AnimationStack {
        &mut self.animations
    }

    /// Produce the next outbound frame. The particle lock is held only while
    /// ticking and rasterizing.
    pub fn frame(&mut self, particles: &SharedParticles) -> &FrameBuffer {
        let tick_index = self.tick_index;
        let (integrator, renderer, scratch) =
            (&self.integrator, &self.renderer, &mut self.scratch);
        self.last_stats = particles.with(|set| {
            let stats = integrator.step(set);
            renderer.render_into(set, tick_index, scratch);
            stats
        });
        self.finish_frame()
    }

    /// Same as [`StripEngine::frame`] for a set the caller already owns.
    pub fn frame_owned(&mut self, set: &mut ParticleSet) -> &FrameBuffer {
        self.last_stats = self.integrator.step(set);
        self.renderer
            .render_into(set, self.tick_index, &mut self.scratch);
        self.finish_frame()
    }

    fn finish_frame(&mut self) -> &FrameBuffer {
        let composed = self.animations.apply(&self.scratch);
        self.animations.advance(self.config.tick_period);
        self.tick_index += 1;
        self.blender.blend(&composed)
    }
}
