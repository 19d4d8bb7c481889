//! Secondary motion layered on top of the blended pose.
//!
//! All overlays are pure functions of elapsed time and a per-instance phase.
//! Settled instances (factor near 1) move much less than scattered ones.

use cgmath::{Vector3, vec3};

/// Brightness above which the bloom pass picks up a pixel.
pub const BLOOM_THRESHOLD: f32 = 1.0;

const SWAY_X: f32 = 0.35;
const SWAY_Z: f32 = 0.25;
const BOB_Y: f32 = 0.3;
const SETTLED_MOTION: f32 = 0.08;

/// How much of the overlay survives at blend `factor`.
pub fn settle_scale(factor: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    1.0 + (SETTLED_MOTION - 1.0) * factor
}

/// Air-current sway on x/z plus a vertical bob.
pub fn float_offset(t: f32, phase: f32, factor: f32) -> Vector3<f32> {
    let amount = settle_scale(factor);
    vec3(
        (0.5 * t + phase).sin() * SWAY_X,
        (0.9 * t + phase).sin() * BOB_Y,
        (0.4 * t + 1.3 * phase).cos() * SWAY_Z,
    ) * amount
}

/// Largest displacement `float_offset` can produce at `factor`.
pub fn float_bound(factor: f32) -> f32 {
    (SWAY_X * SWAY_X + BOB_Y * BOB_Y + SWAY_Z * SWAY_Z).sqrt() * settle_scale(factor)
}

/// Intensities driven by the star pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarGlow {
    pub light_intensity: f32,
    pub emissive_intensity: f32,
}

/// Heartbeat of the star. The emissive part never drops below the bloom
/// threshold so the star always glows.
pub fn star_pulse(t: f32) -> StarGlow {
    let wave = (2.0 * t).sin();
    StarGlow {
        light_intensity: 2.5 + wave,
        emissive_intensity: 2.5 + 0.9 * wave,
    }
}

/// Uniform scale factor the star breathes with.
pub fn star_breath(t: f32) -> f32 {
    1.0 + 0.12 * (3.0 * t).sin()
}
