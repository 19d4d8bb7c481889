use crate::{
    data_structures::{
        geometry::GeometryKind,
        model::{Material, Mesh, Model},
    },
    resources::texture::{diffuse_layout, load_texture},
};

// Meshes and textures are produced here. Nothing is loaded
// from disk: geometry is built from primitives and surface detail is procedural.
pub mod pattern;
pub mod text;
pub mod texture;

/// Builds the GPU model of one decoration group from its primitive and optional pattern.
pub fn load_model(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    name: &str,
    geometry: GeometryKind,
    pattern: Option<&image::RgbaImage>,
) -> anyhow::Result<Model> {
    let data = geometry.build();
    log::debug!(
        "built {name} from {geometry:?}: {} vertices, {} triangles",
        data.vertices.len(),
        data.triangle_count()
    );
    let mesh = Mesh::from_data(device, name, &data);
    let diffuse_texture = load_texture(device, queue, pattern, name)?;
    let layout = diffuse_layout(device);
    let material = Material::new(device, name, diffuse_texture, &layout);
    Ok(Model { mesh, material })
}
