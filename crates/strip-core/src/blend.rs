use crate::frame::FrameBuffer;

/// First-order exponential moving average over successive frames.
///
/// The blended frame is kept as state for the lifetime of the process. It is
/// not reset when particles appear or disappear, which is what smooths those
/// transitions out.
pub struct FrameBlender {
    factor: f32,
    state: FrameBuffer,
}

impl FrameBlender {
    /// Start from a black frame. `factor` is the weight of each new frame.
    pub fn new(led_count: usize, factor: f32) -> Self {
        Self {
            factor,
            state: FrameBuffer::new(led_count),
        }
    }

    pub fn blend(&mut self, current: &FrameBuffer) -> &FrameBuffer {
        if current.led_count() != self.state.led_count() {
            log::warn!(
                "frame size changed from {} to {} LEDs, restarting blend",
                self.state.led_count(),
                current.led_count()
            );
            self.state = FrameBuffer::new(current.led_count());
        }
        blend_into(&mut self.state, current, self.factor);
        &self.state
    }

    pub fn current(&self) -> &FrameBuffer {
        &self.state
    }
}

/// `round((1 - factor) * previous + factor * current)` per byte.
pub fn blend_frames(previous: &FrameBuffer, current: &FrameBuffer, factor: f32) -> FrameBuffer {
    let mut next = previous.clone();
    blend_into(&mut next, current, factor);
    next
}

fn blend_into(state: &mut FrameBuffer, current: &FrameBuffer, factor: f32) {
    for (prev, &cur) in state.as_bytes_mut().iter_mut().zip(current.as_bytes()) {
        *prev = blend_channel(*prev, cur, factor);
    }
}

/// Rounds to the nearest value but always moves at least one step towards a
/// differing target, so a constant input is reached exactly.
#[inline]
pub fn blend_channel(previous: u8, current: u8, factor: f32) -> u8 {
    let mixed = (1.0 - factor) * previous as f32 + factor * current as f32;
    let next = mixed.round().clamp(0.0, 255.0) as u8;
    if next == previous && previous != current {
        if current > previous {
            previous + 1
        } else {
            previous - 1
        }
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FRAME_BLEND_FACTOR;

    #[test]
    fn channel_moves_ten_percent() {
        assert_eq!(blend_channel(0, 250, 0.1), 25);
        assert_eq!(blend_channel(100, 0, 0.1), 90);
        assert_eq!(blend_channel(7, 7, 0.1), 7);
    }

    #[test]
    fn small_gaps_still_close() {
        assert_eq!(blend_channel(251, 255, 0.1), 252);
        assert_eq!(blend_channel(3, 0, 0.1), 2);
    }

    #[test]
    fn blender_keeps_state_between_frames() {
        let mut blender = FrameBlender::new(1, FRAME_BLEND_FACTOR);
        let mut target = FrameBuffer::new(1);
        target.set_pixel(0, [200, 0, 100]);
        assert_eq!(blender.blend(&target).pixel(0), Some([20, 0, 10]));
        assert_eq!(blender.blend(&target).pixel(0), Some([38, 0, 19]));
    }

    #[test]
    fn free_function_matches_blender() {
        let previous = FrameBuffer::new(2);
        let mut current = FrameBuffer::new(2);
        current.fill([50, 60, 70]);
        let next = blend_frames(&previous, &current, 0.1);
        assert_eq!(next.pixel(1), Some([5, 6, 7]));
    }
}
