//! Render pipelines.
//!
//! - `basic` draws opaque instanced decorations
//! - `transparent` draws alpha blended sprites (snow, logo)
//! - `light` holds the light uniform shared by both
//! - `bloom` post-processes the HDR target into the final image

pub mod basic;
pub mod bloom;
pub mod light;
pub mod transparent;

/// Format of the offscreen target every scene pipeline renders into.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(device, light_bind_group_layout, camera_bind_group_layout),
            transparent: transparent::mk_transparent_pipeline(
                device,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
        }
    }
}
