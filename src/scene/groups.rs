//! Catalogue of the decoration groups making up the holiday scene.
//!
//! A [`GroupConfig`] is the immutable description of one homogeneous batch of
//! instances. Everything else (layouts, GPU models, instance buffers) is
//! derived from it once when the scene is built.

use crate::{
    animation::{LayoutSpec, Placement, blend::Motion},
    data_structures::{geometry::GeometryKind, instance::Shading},
    resources::pattern::PatternKey,
};

/// Text rendered onto the floating logo.
pub const LOGO_TEXT: &str = "Happy Holidays";

#[derive(Clone, Debug, PartialEq)]
pub struct GroupConfig {
    pub name: &'static str,
    pub count: usize,
    pub kind: GeometryKind,
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub emissive_intensity: f32,
    pub env_intensity: f32,
    pub scale_range: (f32, f32),
    pub scale_multiplier: f32,
    /// Blend speed in 1/s.
    pub speed: f32,
    pub surface_bias: f32,
    pub pattern: Option<PatternKey>,
    pub placement: Placement,
    pub transparent: bool,
    pub motion: Motion,
}

impl GroupConfig {
    pub fn layout_spec(&self) -> LayoutSpec {
        LayoutSpec {
            count: self.count,
            scale_range: self.scale_range,
            scale_multiplier: self.scale_multiplier,
            surface_bias: self.surface_bias,
            placement: self.placement,
        }
    }

    pub fn shading(&self) -> Shading {
        Shading {
            color: self.color,
            opacity: 1.0,
            metalness: self.metalness,
            roughness: self.roughness,
            emissive: self.emissive_intensity,
            env_intensity: self.env_intensity,
        }
    }
}

/// A plain cone ornament; the other entries override what differs.
fn ornament(name: &'static str, count: usize, kind: GeometryKind, color: [f32; 3]) -> GroupConfig {
    GroupConfig {
        name,
        count,
        kind,
        color,
        metalness: 0.8,
        roughness: 0.25,
        emissive_intensity: 0.0,
        env_intensity: 1.2,
        scale_range: (0.25, 0.45),
        scale_multiplier: 1.0,
        speed: 2.2,
        surface_bias: 0.9,
        pattern: None,
        placement: Placement::Cone,
        transparent: false,
        motion: Motion::Tumble,
    }
}

/// Every decoration group of the scene, without the snow.
pub fn decoration_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig {
            count: 420,
            metalness: 0.0,
            roughness: 0.85,
            env_intensity: 0.3,
            scale_range: (0.35, 0.7),
            speed: 2.0,
            surface_bias: 0.0,
            ..ornament("foliage", 0, GeometryKind::Dodecahedron, [0.05, 0.32, 0.12])
        },
        GroupConfig {
            metalness: 1.0,
            roughness: 0.15,
            env_intensity: 1.5,
            ..ornament("gold ornaments", 90, GeometryKind::Sphere, [1.0, 0.76, 0.3])
        },
        GroupConfig {
            metalness: 0.6,
            roughness: 0.3,
            speed: 2.4,
            ..ornament("red ornaments", 80, GeometryKind::Sphere, [0.75, 0.04, 0.06])
        },
        GroupConfig {
            metalness: 1.0,
            roughness: 0.2,
            env_intensity: 1.4,
            scale_range: (0.2, 0.35),
            speed: 2.3,
            ..ornament("silver barrels", 50, GeometryKind::Cylinder, [0.85, 0.87, 0.9])
        },
        GroupConfig {
            metalness: 0.1,
            roughness: 0.6,
            env_intensity: 0.6,
            scale_range: (0.4, 0.65),
            speed: 2.0,
            surface_bias: 0.7,
            ..ornament("gift boxes", 36, GeometryKind::GiftBox, [1.0, 1.0, 1.0])
        },
        GroupConfig {
            metalness: 0.1,
            roughness: 0.4,
            env_intensity: 0.8,
            scale_range: (0.35, 0.5),
            speed: 2.5,
            pattern: Some(PatternKey::CandyStripes {
                size: 128,
                stripes: 6,
            }),
            ..ornament("candy canes", 40, GeometryKind::CandyCane, [1.0, 1.0, 1.0])
        },
        GroupConfig {
            metalness: 0.3,
            roughness: 0.3,
            emissive_intensity: 2.5,
            env_intensity: 1.0,
            scale_range: (1.0, 1.0),
            scale_multiplier: 1.2,
            speed: 2.0,
            placement: Placement::Apex { lift: 0.8 },
            motion: Motion::Star,
            ..ornament("star", 1, GeometryKind::Dodecahedron, [1.0, 0.85, 0.4])
        },
        GroupConfig {
            metalness: 0.0,
            roughness: 1.0,
            emissive_intensity: 0.6,
            env_intensity: 0.0,
            scale_range: (1.0, 1.0),
            scale_multiplier: 3.0,
            speed: 2.0,
            pattern: Some(PatternKey::Text {
                text: LOGO_TEXT.to_owned(),
                px: 64,
            }),
            placement: Placement::Logo {
                lift: 2.5,
                forward: 2.0,
            },
            transparent: true,
            motion: Motion::Billboard,
            ..ornament("logo", 1, GeometryKind::Quad, [1.0, 0.95, 0.85])
        },
    ]
}

/// Shared model and material of the snow flakes. Positions come from the snow field.
pub fn snow_group(count: usize) -> GroupConfig {
    GroupConfig {
        metalness: 0.0,
        roughness: 1.0,
        emissive_intensity: 0.4,
        env_intensity: 0.0,
        scale_range: (1.0, 1.0),
        speed: 0.0,
        surface_bias: 0.0,
        pattern: Some(PatternKey::Snowflake { size: 64 }),
        transparent: true,
        motion: Motion::Billboard,
        ..ornament("snow", count, GeometryKind::Quad, [1.0, 1.0, 1.0])
    }
}
