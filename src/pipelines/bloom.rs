//! Bloom post-processing.
//!
//! The scene is drawn into an HDR target. Pixels brighter than the threshold
//! are extracted at half resolution, blurred horizontally then vertically, and
//! added back on top of the scene while tone mapping into the output format.

use wgpu::util::DeviceExt;

use crate::{
    animation::overlay::BLOOM_THRESHOLD,
    data_structures::texture::Texture,
    pipelines::HDR_FORMAT,
    resources::texture::diffuse_layout,
};

/// Must match `BloomParams` in `bloom.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomParams {
    pub direction: [f32; 2],
    pub texel: [f32; 2],
    pub threshold: f32,
    pub strength: f32,
    pub exposure: f32,
    _pad: f32,
}

impl BloomParams {
    pub fn new(direction: [f32; 2], size: [u32; 2]) -> Self {
        let [width, height] = bloom_size(size);
        Self {
            direction,
            texel: [1.0 / width as f32, 1.0 / height as f32],
            threshold: BLOOM_THRESHOLD,
            strength: 0.9,
            exposure: 1.0,
            _pad: 0.0,
        }
    }
}

/// The blur runs at half the output resolution.
pub fn bloom_size(size: [u32; 2]) -> [u32; 2] {
    [(size[0] / 2).max(1), (size[1] / 2).max(1)]
}

/// Size dependent textures and the bind groups sampling them.
#[derive(Debug)]
struct BloomTargets {
    hdr: Texture,
    bright: Texture,
    blurred: Texture,
    hdr_group: wgpu::BindGroup,
    bright_group: wgpu::BindGroup,
    blurred_group: wgpu::BindGroup,
}

impl BloomTargets {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: [u32; 2]) -> Self {
        let half = bloom_size(size);
        let hdr = Texture::create_render_target(device, size, HDR_FORMAT, "hdr_target");
        let bright = Texture::create_render_target(device, half, HDR_FORMAT, "bloom_bright");
        let blurred = Texture::create_render_target(device, half, HDR_FORMAT, "bloom_blurred");
        Self {
            hdr_group: texture_bind_group(device, layout, &hdr, "hdr_bind_group"),
            bright_group: texture_bind_group(device, layout, &bright, "bloom_bright_bind_group"),
            blurred_group: texture_bind_group(device, layout, &blurred, "bloom_blurred_bind_group"),
            hdr,
            bright,
            blurred,
        }
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    let sampler = texture
        .sampler
        .clone()
        .unwrap_or_else(|| crate::data_structures::texture::create_clamped_sampler(device));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
        label: Some(label),
    })
}

#[derive(Debug)]
pub struct Bloom {
    bright: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    horizontal: wgpu::Buffer,
    vertical: wgpu::Buffer,
    horizontal_group: wgpu::BindGroup,
    vertical_group: wgpu::BindGroup,
    targets: BloomTargets,
    pub params: BloomParams,
}

impl Bloom {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, size: [u32; 2]) -> Self {
        let texture_layout = diffuse_layout(device);
        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("bloom_params_layout"),
        });

        let params = BloomParams::new([1.0, 0.0], size);
        let horizontal = mk_params_buffer(device, params, "Bloom Horizontal Params");
        let vertical = mk_params_buffer(
            device,
            BloomParams {
                direction: [0.0, 1.0],
                ..params
            },
            "Bloom Vertical Params",
        );
        let horizontal_group = params_bind_group(device, &params_layout, &horizontal);
        let vertical_group = params_bind_group(device, &params_layout, &vertical);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("bloom.wgsl").into()),
        });
        let pass_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pass Layout"),
            bind_group_layouts: &[&texture_layout, &params_layout],
            push_constant_ranges: &[],
        });
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Composite Layout"),
            bind_group_layouts: &[&texture_layout, &params_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let bright = mk_fullscreen_pipeline(device, &pass_layout, &shader, "fs_bright", HDR_FORMAT);
        let blur = mk_fullscreen_pipeline(device, &pass_layout, &shader, "fs_blur", HDR_FORMAT);
        let composite =
            mk_fullscreen_pipeline(device, &composite_layout, &shader, "fs_composite", output_format);

        let targets = BloomTargets::new(device, &texture_layout, size);

        Self {
            bright,
            blur,
            composite,
            texture_layout,
            horizontal,
            vertical,
            horizontal_group,
            vertical_group,
            targets,
            params,
        }
    }

    /// The view every scene pipeline draws into.
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.targets.hdr.view
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, size: [u32; 2]) {
        self.targets = BloomTargets::new(device, &self.texture_layout, size);
        self.params.texel = BloomParams::new(self.params.direction, size).texel;
        self.write_params(queue);
    }

    pub fn write_params(&self, queue: &wgpu::Queue) {
        let vertical = BloomParams {
            direction: [0.0, 1.0],
            ..self.params
        };
        let horizontal = BloomParams {
            direction: [1.0, 0.0],
            ..self.params
        };
        queue.write_buffer(&self.horizontal, 0, bytemuck::cast_slice(&[horizontal]));
        queue.write_buffer(&self.vertical, 0, bytemuck::cast_slice(&[vertical]));
    }

    /// Bright pass and blur, leaving the glow in the blurred target.
    pub fn blur(&self, encoder: &mut wgpu::CommandEncoder) {
        let passes = [
            ("Bloom Bright Pass", &self.bright, &self.targets.hdr_group, &self.horizontal_group, &self.targets.bright.view),
            ("Bloom Horizontal Pass", &self.blur, &self.targets.bright_group, &self.horizontal_group, &self.targets.blurred.view),
            ("Bloom Vertical Pass", &self.blur, &self.targets.blurred_group, &self.vertical_group, &self.targets.bright.view),
        ];
        for (label, pipeline, source, params, target) in passes {
            let mut render_pass = begin_fullscreen_pass(encoder, label, target);
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, source, &[]);
            render_pass.set_bind_group(1, params, &[]);
            render_pass.draw(0..3, 0..1);
        }
    }

    /// Tone maps scene plus glow into `output`. Can be called for several outputs per frame.
    pub fn composite(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let mut render_pass = begin_fullscreen_pass(encoder, "Bloom Composite Pass", output);
        render_pass.set_pipeline(&self.composite);
        render_pass.set_bind_group(0, &self.targets.hdr_group, &[]);
        render_pass.set_bind_group(1, &self.horizontal_group, &[]);
        // the vertical pass writes its result back into the bright target
        render_pass.set_bind_group(2, &self.targets.bright_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

fn begin_fullscreen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}

fn mk_params_buffer(device: &wgpu::Device, params: BloomParams, label: &str) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[params]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn params_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("bloom_params_bind_group"),
    })
}

fn mk_fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
