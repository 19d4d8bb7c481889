//! Looping ambient snow.
//!
//! A fixed pool of flakes drifts down forever. The vertical position is
//! wrapped into a band so flakes leaving the bottom reappear at the top;
//! nothing here depends on the tree arrangement.

use std::f32::consts::TAU;

use cgmath::{Vector3, vec3};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnowParams {
    pub half_extent: f32,
    pub band_min: f32,
    pub band_height: f32,
    pub speed: (f32, f32),
    pub wobble: (f32, f32),
    pub scale: (f32, f32),
}

impl SnowParams {
    pub fn band_max(&self) -> f32 {
        self.band_min + self.band_height
    }
}

impl Default for SnowParams {
    fn default() -> Self {
        Self {
            half_extent: 16.0,
            band_min: -10.0,
            band_height: 24.0,
            speed: (0.4, 1.2),
            wobble: (0.1, 0.5),
            scale: (0.08, 0.22),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flake {
    pub origin: Vector3<f32>,
    pub speed: f32,
    pub wobble: f32,
    pub phase: f32,
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct SnowField {
    flakes: Vec<Flake>,
    params: SnowParams,
}

fn range<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

impl SnowField {
    pub fn new<R: Rng + ?Sized>(count: usize, params: SnowParams, rng: &mut R) -> Self {
        let e = params.half_extent.max(0.0);
        let flakes = (0..count)
            .map(|_| Flake {
                origin: vec3(
                    range(rng, (-e, e)),
                    range(rng, (params.band_min, params.band_max())),
                    range(rng, (-e, e)),
                ),
                speed: range(rng, params.speed),
                wobble: range(rng, params.wobble),
                phase: rng.random_range(0.0..TAU),
                scale: range(rng, params.scale),
            })
            .collect();
        Self { flakes, params }
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    pub fn params(&self) -> &SnowParams {
        &self.params
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    /// Position of `flake` at elapsed time `t`.
    pub fn position(&self, flake: &Flake, t: f32) -> Vector3<f32> {
        let p = &self.params;
        let y = if p.band_height > 0.0 {
            let fallen = flake.origin.y - p.band_min - t * flake.speed;
            let y = p.band_min + fallen.rem_euclid(p.band_height);
            // rem_euclid may round up to exactly the band height for tiny negatives
            if y >= p.band_max() { p.band_min } else { y }
        } else {
            // an empty band pins every flake to its floor
            p.band_min
        };
        let x = flake.origin.x
            + (0.7 * t + flake.phase).sin() * flake.wobble
            + (0.31 * t + 2.0 * flake.phase).sin() * flake.wobble * 0.5;
        let z = flake.origin.z + (0.5 * t + flake.phase).cos() * flake.wobble;
        vec3(x, y, z)
    }

    pub fn positions(&self, t: f32) -> impl Iterator<Item = (Vector3<f32>, f32)> + '_ {
        self.flakes
            .iter()
            .map(move |flake| (self.position(flake, t), flake.scale))
    }
}
