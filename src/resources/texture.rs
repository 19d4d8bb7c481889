use crate::data_structures::texture;

/// Layout of bind group 0 for every decoration pipeline: one colour texture and its sampler.
pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("diffuse_bind_group_layout"),
    })
}

/// Uploads `image` or, when there is none, the shared white fallback.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: Option<&image::RgbaImage>,
    label: &str,
) -> anyhow::Result<texture::Texture> {
    match image {
        Some(image) => texture::Texture::from_image(device, queue, image, Some(label)),
        None => texture::Texture::create_white(device, queue),
    }
}
