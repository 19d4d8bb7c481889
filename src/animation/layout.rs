//! Instance layout generation.
//!
//! Every decoration gets two precomputed targets: a point inside the
//! scattered sphere and a point on the conical spiral of the tree. Both are
//! sampled once when the group is created and never regenerated.

use std::f32::consts::TAU;

use cgmath::{Vector3, vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Static per-instance data for one decoration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceLayout {
    pub scattered: Vector3<f32>,
    pub tree: Vector3<f32>,
    /// Euler angles (radians) of the settled orientation.
    pub rotation: Vector3<f32>,
    pub scale: f32,
    /// Random phase so overlays of neighbouring instances don't move in lockstep.
    pub phase: f32,
}

/// Shape of the tree formation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeProfile {
    pub base_y: f32,
    pub height: f32,
    pub max_radius: f32,
    pub min_radius: f32,
    /// Radians of spiral winding per unit of normalised height.
    pub spiral_pitch: f32,
}

impl ConeProfile {
    pub fn apex(&self) -> Vector3<f32> {
        vec3(0.0, self.base_y + self.height, 0.0)
    }

    /// Largest radius a decoration may use at normalised height `h`.
    pub fn radius_bound(&self, h: f32) -> f32 {
        let h = h.clamp(0.0, 1.0);
        self.max_radius + (self.min_radius - self.max_radius) * h
    }
}

impl Default for ConeProfile {
    fn default() -> Self {
        Self {
            base_y: -6.0,
            height: 12.0,
            max_radius: 5.0,
            min_radius: 0.3,
            spiral_pitch: 25.0,
        }
    }
}

/// Where the tree target of a group comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Spread along the conical spiral.
    Cone,
    /// Fixed at the cone tip, lifted by the offset.
    Apex { lift: f32 },
    /// Fixed in front of the tree, hovering above the apex.
    Logo { lift: f32, forward: f32 },
}

/// The layout-relevant subset of a group description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutSpec {
    pub count: usize,
    pub scale_range: (f32, f32),
    pub scale_multiplier: f32,
    /// `0.0` fills the cone volume, values near `1.0` hug its surface.
    pub surface_bias: f32,
    pub placement: Placement,
}

/// Scene-wide sampling parameters shared by every group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub scatter_radius: f32,
    pub cone: ConeProfile,
    pub seed: Option<u64>,
}

impl LayoutParams {
    /// Rng for one group. Seeded runs derive a distinct stream per group salt.
    pub fn rng(&self, salt: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            scatter_radius: 15.0,
            cone: ConeProfile::default(),
            seed: None,
        }
    }
}

/// Uniform sample inside a sphere of `radius` around the origin.
///
/// The cube root on the radius keeps the density uniform per volume instead
/// of clustering samples around the centre.
pub fn sample_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vector3<f32> {
    let r = radius * rng.random::<f32>().cbrt();
    let theta = rng.random_range(0.0..TAU);
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    vec3(
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}

/// Sample on the conical spiral of the tree.
pub fn sample_on_cone<R: Rng + ?Sized>(
    rng: &mut R,
    cone: &ConeProfile,
    surface_bias: f32,
) -> Vector3<f32> {
    let h: f32 = rng.random();
    let y = cone.base_y + h * cone.height;
    let bias = surface_bias.clamp(0.0, 1.0);
    let r = cone.radius_bound(h) * (bias + (1.0 - bias) * rng.random::<f32>());
    let angle = h * cone.spiral_pitch + rng.random_range(0.0..TAU);
    vec3(r * angle.cos(), y, r * angle.sin())
}

fn tree_target<R: Rng + ?Sized>(
    rng: &mut R,
    spec: &LayoutSpec,
    params: &LayoutParams,
) -> Vector3<f32> {
    match spec.placement {
        Placement::Cone => sample_on_cone(rng, &params.cone, spec.surface_bias),
        Placement::Apex { lift } => params.cone.apex() + vec3(0.0, lift, 0.0),
        Placement::Logo { lift, forward } => params.cone.apex() + vec3(0.0, lift, forward),
    }
}

/// Precompute `spec.count` instances. Call once per group.
pub fn generate_layout<R: Rng + ?Sized>(
    spec: &LayoutSpec,
    params: &LayoutParams,
    rng: &mut R,
) -> Vec<InstanceLayout> {
    let (min_scale, max_scale) = spec.scale_range;
    (0..spec.count)
        .map(|_| {
            let scattered = sample_in_sphere(rng, params.scatter_radius);
            let tree = tree_target(rng, spec, params);
            let rotation = vec3(
                rng.random_range(0.0..TAU),
                rng.random_range(0.0..TAU),
                rng.random_range(0.0..TAU),
            );
            let scale = if max_scale > min_scale {
                rng.random_range(min_scale..max_scale)
            } else {
                min_scale
            };
            InstanceLayout {
                scattered,
                tree,
                rotation,
                scale: scale * spec.scale_multiplier,
                phase: rng.random_range(0.0..TAU),
            }
        })
        .collect()
}
