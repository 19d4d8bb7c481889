//! Procedural meshes for every decoration kind.
//!
//! Meshes are built on the CPU as plain vertex/index lists and uploaded once
//! per group. Every builder is centred on the origin with a size of roughly
//! one unit so the per-instance scale controls the final size.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Vector3, vec3};

use crate::data_structures::model::ModelVertex;

/// Golden ribbon colour of the gift boxes.
pub const RIBBON_TINT: [f32; 4] = [1.0, 0.78, 0.25, 1.0];
const NO_TINT: [f32; 4] = [1.0, 1.0, 1.0, 0.0];

/// Which mesh a decoration group draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Sphere,
    Box,
    Cylinder,
    Dodecahedron,
    GiftBox,
    CandyCane,
    /// Unit quad facing +z, used for textured sprites like snow and the logo.
    Quad,
}

impl GeometryKind {
    pub fn build(self) -> MeshData {
        match self {
            GeometryKind::Sphere => uv_sphere(0.5, 24, 16),
            GeometryKind::Box => cuboid(vec3(0.5, 0.5, 0.5), NO_TINT),
            GeometryKind::Cylinder => cylinder(0.35, 1.0, 20),
            GeometryKind::Dodecahedron => dodecahedron(0.5),
            GeometryKind::GiftBox => gift_box(),
            GeometryKind::CandyCane => candy_cane(),
            GeometryKind::Quad => quad(),
        }
    }
}

/// CPU-side triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vector3<f32>, normal: Vector3<f32>, uv: [f32; 2], tint: [f32; 4]) -> u32 {
        self.vertices.push(ModelVertex {
            position: position.into(),
            tex_coords: uv,
            normal: normal.normalize().into(),
            tint,
        });
        (self.vertices.len() - 1) as u32
    }

    /// Append another mesh, re-basing its indices.
    pub fn merge(&mut self, other: MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let theta = u * TAU;
            let normal = vec3(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.push(normal * radius, normal, [u, v], NO_TINT);
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

pub fn cuboid(half: Vector3<f32>, tint: [f32; 4]) -> MeshData {
    let mut mesh = MeshData::default();
    let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
        (Vector3::unit_x(), Vector3::unit_y(), -Vector3::unit_z()),
        (-Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()),
        (Vector3::unit_y(), -Vector3::unit_z(), Vector3::unit_x()),
        (-Vector3::unit_y(), Vector3::unit_z(), Vector3::unit_x()),
        (Vector3::unit_z(), Vector3::unit_y(), Vector3::unit_x()),
        (-Vector3::unit_z(), Vector3::unit_y(), -Vector3::unit_x()),
    ];
    for (normal, up, right) in faces {
        let scale = |v: Vector3<f32>| vec3(v.x * half.x, v.y * half.y, v.z * half.z);
        let corners = [
            (normal - right - up, [0.0, 1.0]),
            (normal + right - up, [1.0, 1.0]),
            (normal + right + up, [1.0, 0.0]),
            (normal - right + up, [0.0, 0.0]),
        ];
        let first = mesh.vertices.len() as u32;
        for (corner, uv) in corners {
            mesh.push(scale(corner), normal, uv, tint);
        }
        mesh.indices
            .extend_from_slice(&[first, first + 1, first + 2, first, first + 2, first + 3]);
    }
    mesh
}

pub fn cylinder(radius: f32, height: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half = height * 0.5;
    for segment in 0..=segments {
        let u = segment as f32 / segments as f32;
        let theta = u * TAU;
        let normal = vec3(theta.cos(), 0.0, -theta.sin());
        mesh.push(normal * radius + vec3(0.0, -half, 0.0), normal, [u, 1.0], NO_TINT);
        mesh.push(normal * radius + vec3(0.0, half, 0.0), normal, [u, 0.0], NO_TINT);
    }
    for segment in 0..segments {
        let a = segment * 2;
        mesh.indices
            .extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
    }
    for (y, normal) in [(half, Vector3::unit_y()), (-half, -Vector3::unit_y())] {
        let centre = mesh.push(vec3(0.0, y, 0.0), normal, [0.5, 0.5], NO_TINT);
        let rim_start = mesh.vertices.len() as u32;
        for segment in 0..segments {
            let theta = segment as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            mesh.push(vec3(c * radius, y, -s * radius), normal, [0.5 + 0.5 * c, 0.5 + 0.5 * s], NO_TINT);
        }
        for segment in 0..segments {
            let a = rim_start + segment;
            let b = rim_start + (segment + 1) % segments;
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[centre, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[centre, b, a]);
            }
        }
    }
    mesh
}

/// Flat-shaded regular dodecahedron.
///
/// Each face normal picks the five corners closest to it, which are then
/// ordered counter-clockwise around the normal.
pub fn dodecahedron(radius: f32) -> MeshData {
    let phi = (1.0 + 5.0f32.sqrt()) / 2.0;
    let inv = 1.0 / phi;
    let mut corners: Vec<Vector3<f32>> = Vec::with_capacity(20);
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [-1.0, 1.0] {
                corners.push(vec3(x, y, z));
            }
        }
    }
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            corners.push(vec3(0.0, a * inv, b * phi));
            corners.push(vec3(a * inv, b * phi, 0.0));
            corners.push(vec3(a * phi, 0.0, b * inv));
        }
    }
    let corners: Vec<Vector3<f32>> = corners.into_iter().map(|c| c.normalize() * radius).collect();

    let mut face_normals = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            face_normals.push(vec3(0.0, a * phi, b).normalize());
            face_normals.push(vec3(a * phi, b, 0.0).normalize());
            face_normals.push(vec3(a, 0.0, b * phi).normalize());
        }
    }

    let mut mesh = MeshData::default();
    for normal in face_normals {
        let mut ranked: Vec<Vector3<f32>> = corners.clone();
        ranked.sort_by(|p, q| q.dot(normal).total_cmp(&p.dot(normal)));
        let mut face: Vec<Vector3<f32>> = ranked.into_iter().take(5).collect();

        let helper = if normal.x.abs() < 0.9 { Vector3::unit_x() } else { Vector3::unit_y() };
        let tangent = normal.cross(helper).normalize();
        let bitangent = normal.cross(tangent);
        face.sort_by(|p, q| {
            let angle = |v: &Vector3<f32>| v.dot(bitangent).atan2(v.dot(tangent));
            angle(p).total_cmp(&angle(q))
        });

        let first = mesh.vertices.len() as u32;
        for corner in &face {
            let uv = [0.5 + corner.dot(tangent) / radius, 0.5 + corner.dot(bitangent) / radius];
            mesh.push(*corner, normal, uv, NO_TINT);
        }
        for i in 1..4 {
            let (a, b, c) = (face[0], face[i], face[i + 1]);
            let ccw = (b - a).cross(c - a).dot(normal) > 0.0;
            let (j, k) = if ccw { (i, i + 1) } else { (i + 1, i) };
            mesh.indices
                .extend_from_slice(&[first, first + j as u32, first + k as u32]);
        }
    }
    mesh
}

/// Box wrapped by two crossing ribbons with a small bow on top.
pub fn gift_box() -> MeshData {
    let mut mesh = cuboid(vec3(0.5, 0.5, 0.5), NO_TINT);
    mesh.merge(cuboid(vec3(0.515, 0.515, 0.08), RIBBON_TINT));
    mesh.merge(cuboid(vec3(0.08, 0.515, 0.515), RIBBON_TINT));
    let mut bow = uv_sphere(0.12, 10, 6);
    for vertex in bow.vertices.iter_mut() {
        vertex.position[1] += 0.55;
        vertex.tint = RIBBON_TINT;
    }
    mesh.merge(bow);
    mesh
}

/// Centre line of the candy cane: a straight shaft ending in a half-circle hook.
pub fn candy_cane_path(samples: u32) -> Vec<Vector3<f32>> {
    let shaft_bottom = -0.9;
    let shaft_top = 0.45;
    let hook_radius = 0.3;
    let shaft_len = shaft_top - shaft_bottom;
    let hook_len = PI * hook_radius;
    let total = shaft_len + hook_len;

    (0..=samples)
        .map(|i| {
            let d = i as f32 / samples as f32 * total;
            if d <= shaft_len {
                vec3(0.0, shaft_bottom + d, 0.0)
            } else {
                let angle = (d - shaft_len) / hook_radius;
                vec3(
                    hook_radius - hook_radius * angle.cos(),
                    shaft_top + hook_radius * angle.sin(),
                    0.0,
                )
            }
        })
        .collect()
}

/// Tube swept along [`candy_cane_path`]. `u` runs along the cane so a
/// diagonal stripe texture wraps as a spiral.
pub fn candy_cane() -> MeshData {
    let path = candy_cane_path(48);
    let radius = 0.09;
    let sides = 14u32;
    let mut mesh = MeshData::default();

    let mut length = 0.0;
    for (i, point) in path.iter().enumerate() {
        if i > 0 {
            length += (*point - path[i - 1]).magnitude();
        }
        let next = path.get(i + 1).copied().unwrap_or(*point);
        let prev = if i > 0 { path[i - 1] } else { *point };
        let tangent = (next - prev).normalize();
        // the path lies in the xy plane, so z is a stable binormal
        let binormal = Vector3::unit_z();
        let normal = tangent.cross(binormal).normalize();
        for side in 0..=sides {
            let v = side as f32 / sides as f32;
            let theta = v * TAU;
            let dir = normal * theta.cos() + binormal * theta.sin();
            mesh.push(*point + dir * radius, dir, [length * 2.0, v], NO_TINT);
        }
    }
    let ring = sides + 1;
    for i in 0..(path.len() as u32 - 1) {
        for side in 0..sides {
            let a = i * ring + side;
            let b = a + ring;
            mesh.indices
                .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

pub fn quad() -> MeshData {
    let mut mesh = MeshData::default();
    let normal = Vector3::unit_z();
    mesh.push(vec3(-0.5, -0.5, 0.0), normal, [0.0, 1.0], NO_TINT);
    mesh.push(vec3(0.5, -0.5, 0.0), normal, [1.0, 1.0], NO_TINT);
    mesh.push(vec3(0.5, 0.5, 0.0), normal, [1.0, 0.0], NO_TINT);
    mesh.push(vec3(-0.5, 0.5, 0.0), normal, [0.0, 0.0], NO_TINT);
    mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    mesh
}
