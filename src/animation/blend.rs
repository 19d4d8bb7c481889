//! Per-frame blending between the scattered and the tree arrangement.
//!
//! Each group owns its static layouts and, indexed in parallel, the runtime
//! blend factor of every instance. Once per frame every factor takes one step
//! of a one-pole low-pass filter toward the target of the current arrangement
//! and a final pose is derived from it.

use cgmath::{Euler, One, Quaternion, Rad, Rotation3, Vector3};

use crate::animation::{
    arrangement::Arrangement,
    layout::InstanceLayout,
    overlay::{float_offset, star_breath},
};
use crate::data_structures::instance::Instance;

/// Above this factor an instance counts as settled on the tree.
pub const SETTLE_THRESHOLD: f32 = 0.95;
/// Radians per second of free tumbling, per euler axis.
pub const TUMBLE_RATE: [f32; 3] = [0.9, 0.6, 0.4];

pub const STAR_SCATTERED_SIZE: f32 = 0.6;
pub const STAR_TREE_SIZE: f32 = 1.0;

/// Runtime morph state of one instance, `0.0` scattered, `1.0` tree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendState {
    pub factor: f32,
}

impl BlendState {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Exponential approach toward `target` with rate `speed` (per second).
    pub fn step(&mut self, target: f32, dt: f32, speed: f32) -> f32 {
        let alpha = (dt * speed).clamp(0.0, 1.0);
        self.factor += (target - self.factor) * alpha;
        self.factor
    }

    pub fn is_settled(&self) -> bool {
        self.factor > SETTLE_THRESHOLD
    }
}

/// How the pose of a group reacts on top of the positional blend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Tumbles while scattered, floats, snaps upright when settled.
    Tumble,
    /// Slow spin around the vertical axis, breathing scale.
    Star,
    /// Keeps facing forward, only floats.
    Billboard,
}

/// The blended transform of one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: f32,
}

fn euler_quat(angles: Vector3<f32>) -> Quaternion<f32> {
    Quaternion::from(Euler {
        x: Rad(angles.x),
        y: Rad(angles.y),
        z: Rad(angles.z),
    })
}

/// Pose of `layout` at blend `factor` and elapsed time `t`.
pub fn pose(layout: &InstanceLayout, factor: f32, t: f32, motion: Motion) -> Pose {
    let factor = factor.clamp(0.0, 1.0);
    let base = layout.scattered + (layout.tree - layout.scattered) * factor;
    let position = base + float_offset(t, layout.phase, factor);

    let (rotation, scale) = match motion {
        Motion::Tumble => {
            let rotation = if factor > SETTLE_THRESHOLD {
                euler_quat(layout.rotation)
            } else {
                let spin = (Vector3::from(TUMBLE_RATE) * t).map(|a| a + layout.phase) * (1.0 - factor);
                euler_quat(layout.rotation + spin)
            };
            (rotation, layout.scale)
        }
        Motion::Star => {
            let size = STAR_SCATTERED_SIZE + (STAR_TREE_SIZE - STAR_SCATTERED_SIZE) * factor;
            (
                Quaternion::from_angle_y(Rad(0.6 * t)),
                layout.scale * size * star_breath(t),
            )
        }
        Motion::Billboard => (Quaternion::one(), layout.scale),
    };

    Pose {
        position,
        rotation,
        scale,
    }
}

/// Animation state of one homogeneous decoration group.
#[derive(Clone, Debug)]
pub struct GroupAnimator {
    layouts: Vec<InstanceLayout>,
    blends: Vec<BlendState>,
    speed: f32,
    motion: Motion,
}

impl GroupAnimator {
    pub fn new(layouts: Vec<InstanceLayout>, speed: f32, motion: Motion, start: Arrangement) -> Self {
        let blends = vec![BlendState::new(start.target_factor()); layouts.len()];
        Self {
            layouts,
            blends,
            speed,
            motion,
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn layouts(&self) -> &[InstanceLayout] {
        &self.layouts
    }

    pub fn blends(&self) -> &[BlendState] {
        &self.blends
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Mean blend factor of the group, `0.0` for an empty group.
    pub fn mean_factor(&self) -> f32 {
        if self.blends.is_empty() {
            return 0.0;
        }
        self.blends.iter().map(|b| b.factor).sum::<f32>() / self.blends.len() as f32
    }

    /// Advance every blend factor one frame toward `arrangement`.
    pub fn step(&mut self, arrangement: Arrangement, dt: f32) {
        let target = arrangement.target_factor();
        let speed = self.speed;
        self.blends
            .iter_mut()
            .for_each(|blend| _ = blend.step(target, dt, speed));
    }

    pub fn poses(&self, t: f32) -> impl Iterator<Item = Pose> + '_ {
        self.layouts
            .iter()
            .zip(self.blends.iter())
            .map(move |(layout, blend)| pose(layout, blend.factor, t, self.motion))
    }

    /// One frame: step the factors and write the poses into `target`.
    ///
    /// A missing render target means the surface isn't ready yet and the frame
    /// is skipped entirely.
    pub fn update(
        &mut self,
        target: Option<&mut [Instance]>,
        arrangement: Arrangement,
        t: f32,
        dt: f32,
    ) {
        let Some(instances) = target else {
            return;
        };
        self.step(arrangement, dt);
        instances
            .iter_mut()
            .zip(self.poses(t))
            .for_each(|(instance, pose)| {
                instance.position = pose.position;
                instance.rotation = pose.rotation;
                instance.scale = Vector3::new(pose.scale, pose.scale, pose.scale);
            });
    }
}
