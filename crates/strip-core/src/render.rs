use crate::color::channel_u8;
use crate::config::{CompositeMode, RenderConfig};
use crate::frame::FrameBuffer;
use crate::particles::{Particle, ParticleSet};

/// Rasterizes particle positions onto the strip with linear sub-pixel
/// interpolation between the two nearest LEDs.
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Breathing envelope in \[0, 1\] applied to flickering particles.
    #[inline]
    pub fn flicker_envelope(&self, tick_index: u64) -> f32 {
        ((tick_index as f32 * self.config.flicker_speed).sin() + 1.0) / 2.0
    }

    pub fn render(&self, set: &ParticleSet, tick_index: u64) -> FrameBuffer {
        let mut frame = FrameBuffer::new(self.config.led_count);
        self.render_into(set, tick_index, &mut frame);
        frame
    }

    /// Render over an existing buffer, clearing it first.
    pub fn render_into(&self, set: &ParticleSet, tick_index: u64, frame: &mut FrameBuffer) {
        frame.as_bytes_mut().fill(0);
        if let Some(header) = self.config.header {
            frame.set_header(header);
        }
        let envelope = self.flicker_envelope(tick_index);
        for particle in set {
            self.splat(particle, envelope, frame);
        }
    }

    fn splat(&self, particle: &Particle, envelope: f32, frame: &mut FrameBuffer) {
        let led_count = self.config.led_count;
        let p = particle.position * led_count as f32;
        if !(p.is_finite() && p >= 0.0) {
            return;
        }
        let x1 = p.floor() as usize;
        let x2 = x1 + 1;
        let w2 = p.fract();
        let w1 = 1.0 - w2;

        let mut rgb = particle.color * self.config.channel_gain * self.config.max_brightness;
        if particle.flicker {
            rgb *= envelope;
        }

        let near = [
            channel_u8(rgb.x * w1),
            channel_u8(rgb.y * w1),
            channel_u8(rgb.z * w1),
        ];
        let far = [
            channel_u8(rgb.x * w2),
            channel_u8(rgb.y * w2),
            channel_u8(rgb.z * w2),
        ];
        // Beyond the last LED the write is dropped, never wrapped.
        for (index, value) in [(x1, near), (x2, far)] {
            if index >= led_count {
                continue;
            }
            match self.config.composite {
                CompositeMode::Overwrite => frame.set_pixel(index, value),
                CompositeMode::Additive => frame.add_pixel(index, value),
            }
        }
    }
}
