use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::Model,
    },
    render::Instanced,
};

/// An `InstanceGroup` is one homogeneous batch of decorations: one mesh, one
/// material and many instances drawn in a single call.
///
/// The CPU-side `instances` are rewritten every frame by the animation code and
/// then flushed with [`InstanceGroup::write_to_buffer`].
pub struct InstanceGroup {
    pub id: u32,
    pub name: String,
    pub model: Model,
    pub instances: Vec<Instance>,
    pub instance_buffer: wgpu::Buffer,
    pub transparent: bool,
    capacity: usize,
}

impl InstanceGroup {
    pub fn new(
        device: &wgpu::Device,
        id: u32,
        name: &str,
        model: Model,
        instances: Vec<Instance>,
        transparent: bool,
    ) -> Self {
        let instance_buffer = create_instance_buffer(device, name, &instances);
        Self {
            id,
            name: name.to_string(),
            model,
            capacity: instances.len(),
            instances,
            instance_buffer,
            transparent,
        }
    }

    /// Uploads the current instances, growing the buffer if the group got bigger.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        if self.instances.len() > self.capacity {
            log::debug!(
                "growing instance buffer of {} from {} to {}",
                self.name,
                self.capacity,
                self.instances.len()
            );
            self.instance_buffer = create_instance_buffer(device, &self.name, &self.instances);
            self.capacity = self.instances.len();
            return;
        }
        let data = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&data));
    }

    pub fn as_instanced(&self) -> Instanced<'_> {
        Instanced {
            instance: &self.instance_buffer,
            model: &self.model,
            amount: self.instances.len(),
            id: self.id,
        }
    }
}

fn create_instance_buffer(device: &wgpu::Device, name: &str, instances: &[Instance]) -> wgpu::Buffer {
    let instance_data = instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
    // zero-sized vertex buffers are invalid, keep one slot around for empty groups
    let contents: Vec<u8> = if instance_data.is_empty() {
        vec![0; std::mem::size_of::<InstanceRaw>()]
    } else {
        bytemuck::cast_slice(&instance_data).to_vec()
    };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Instance Buffer")),
        contents: &contents,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}
