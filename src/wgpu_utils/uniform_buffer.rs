use std::marker::PhantomData;

/// Remembers the last bytes written to a buffer so identical frames skip the upload.
///
/// Most objects in the editor sit still between frames, so their uniforms
/// repeat byte for byte.
#[derive(Debug, Default)]
pub struct WriteTracker {
    last: Vec<u8>,
}

impl WriteTracker {
    /// Records `bytes` as the pending content.
    ///
    /// # Returns
    ///
    /// `true` when the bytes differ from the previous write and must be uploaded.
    pub fn stage(&mut self, bytes: &[u8]) -> bool {
        if self.last == bytes {
            return false;
        }
        self.last.clear();
        self.last.extend_from_slice(bytes);
        true
    }
}

/// Typed uniform buffer that skips writes when the content is unchanged
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    tracker: WriteTracker,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Allocates a buffer sized for one `Content`.
    ///
    /// # Arguments
    ///
    /// * `device` - Device that owns the buffer
    /// * `label` - Debug label, usually the owning object's name
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} UBO")),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            tracker: WriteTracker::default(),
        }
    }

    /// Queues a write of `content` unless it matches the last one.
    ///
    /// # Returns
    ///
    /// Whether a write was queued.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) -> bool {
        let bytes = bytemuck::bytes_of(&content);
        if !self.tracker.stage(bytes) {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        true
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_is_skipped() {
        let mut tracker = WriteTracker::default();
        assert!(tracker.stage(&[1, 2, 3, 4]));
        assert!(!tracker.stage(&[1, 2, 3, 4]));
        assert!(!tracker.stage(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_changed_content_is_written() {
        let mut tracker = WriteTracker::default();
        assert!(tracker.stage(&[0; 8]));
        assert!(tracker.stage(&[0, 0, 0, 0, 1, 0, 0, 0]));
        assert!(tracker.stage(&[0; 8]));
    }
}
