use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, Queue};

/// Create a vertex buffer from data.
pub fn create_vertex_buffer<T: bytemuck::Pod>(device: &Device, data: &[T], label: &str) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: BufferUsages::VERTEX,
    })
}

/// Create a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(device: &Device, data: &T, label: &str) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(data),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

/// A vertex buffer of per-instance records that is rewritten in place and
/// only reallocated when it has to grow.
pub struct InstanceBuffer {
    buffer: Option<Buffer>,
    capacity: usize,
    len: usize,
    label: String,
}

impl InstanceBuffer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            buffer: None,
            capacity: 0,
            len: 0,
            label: label.into(),
        }
    }

    pub fn write<T: bytemuck::Pod>(&mut self, device: &Device, queue: &Queue, data: &[T]) {
        self.len = data.len();
        if data.is_empty() {
            return;
        }
        match &self.buffer {
            Some(buffer) if self.capacity >= data.len() => {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
            }
            _ => {
                self.buffer = Some(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&self.label),
                        contents: bytemuck::cast_slice(data),
                        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
                    },
                ));
                self.capacity = data.len();
            }
        }
    }

    /// The buffer and instance count, if anything is stored.
    pub fn get(&self) -> Option<(&Buffer, u32)> {
        match &self.buffer {
            Some(buffer) if self.len > 0 => Some((buffer, self.len as u32)),
            _ => None,
        }
    }
}
