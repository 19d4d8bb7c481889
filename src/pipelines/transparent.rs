use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{HDR_FORMAT, basic::mk_render_pipeline},
    resources::texture::diffuse_layout,
};

/// Alpha blended sprites such as snow flakes and the logo.
///
/// Depth is tested against the opaque decorations but never written, and both
/// faces are drawn so a quad stays visible from behind.
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Transparent Pipeline Layout"),
        bind_group_layouts: &[
            &diffuse_layout(device),
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Instanced Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("instanced.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        HDR_FORMAT,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        false,
        None,
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
