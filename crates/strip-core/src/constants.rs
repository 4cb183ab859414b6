// Shared tuning constants for the simulation, renderer and native front-end.

// Strip layout
pub const LED_COUNT: usize = 300; // pixels on the strip
pub const COLOR_CHANNELS: usize = 3; // R, G, B per pixel
pub const HEADER_LEN: usize = 3; // reserved leading bytes of every datagram

// Brightness
pub const MAX_BRIGHTNESS: f32 = 250.0; // full-scale channel value for a particle
pub const CHANNEL_GAIN: [f32; 3] = [1.0, 1.0, 1.0]; // per-channel color correction
pub const FLICKER_SPEED: f32 = 0.18; // radians per tick of the breathing envelope

// Physics
pub const FORCE_FACTOR: f32 = 0.05; // inverse-square repulsion constant
pub const FORCE_EPSILON: f32 = 0.001; // pairs closer than this exert no force
pub const PARTICLE_MASS: f32 = 1.0;
pub const TIMESTEP_LEN: f32 = 0.001; // simulation time advanced per tick
pub const ENERGY_IN_SYSTEM: f32 = 4.2; // kinetic energy target, sum of v^2 * m
pub const ENERGY_BLEND_WEIGHT: f32 = 0.8; // weight of the nominal target in blended mode

// Frame timing and smoothing
pub const FRAME_SLEEP_MS: u64 = 10; // tick period
pub const FRAME_BLEND_FACTOR: f32 = 0.1; // weight of the newest frame in the moving average

// Overlays
pub const NEW_PARTICLE_PULSE_MS: u64 = 600; // pulse shown when a presence arrives
pub const RAINBOW_SPEED_DEG_PER_SEC: f32 = 100.0; // one degree per 10 ms tick
pub const RAINBOW_VALUE: f32 = 0.1; // dim background rainbow
pub const SPARKLE_RESEED_MS: u64 = 10;

// Network defaults
pub const LED_HOST: &str = "esp-sofas.fd";
pub const LED_PORT: u16 = 7777;
pub const PRESENCE_BIND: &str = "0.0.0.0:7778";
pub const DEFAULT_USER_COUNT: usize = 5; // random hues seeded at startup

/// Length in bytes of one outbound frame for `led_count` pixels.
#[inline]
pub const fn frame_len(led_count: usize) -> usize {
    HEADER_LEN + led_count * COLOR_CHANNELS
}
