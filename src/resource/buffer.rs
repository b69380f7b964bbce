//! Exposes [`Buffer`], a reference to a `VkBuffer` that can be written into uniform buffer descriptors.
//!
//! Buffer memory is owned by whoever allocated the buffer. Descriptor sets only need to keep the buffer object alive
//! while they reference it, so they hold an `Arc<Buffer>`.
//!
//! # Example
//! ```
//! # use deimos::*;
//! # use std::sync::Arc;
//! use deimos::vk::Handle;
//! let buffer = Arc::new(Buffer::from_raw(vk::Buffer::from_raw(1), 256));
//! assert_eq!(buffer.size(), 256);
//! ```

use ash::vk;

/// A buffer allocated elsewhere that can be referenced by descriptors.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Buffer {
    handle: vk::Buffer,
    size: vk::DeviceSize,
}

impl Buffer {
    /// Wrap an existing `VkBuffer` of `size` bytes. The caller stays responsible for destroying it once this object
    /// and every descriptor set referencing it are gone.
    pub fn from_raw(handle: vk::Buffer, size: vk::DeviceSize) -> Self {
        Self {
            handle,
            size,
        }
    }

    /// Get the raw Vulkan handle of this buffer.
    pub fn handle(&self) -> vk::Buffer {
        self.handle
    }

    /// Size of the buffer in bytes.
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Descriptor info that covers `size` bytes starting at `offset`.
    pub(crate) fn descriptor_info(&self, offset: vk::DeviceSize, size: vk::DeviceSize) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo {
            buffer: self.handle,
            offset,
            range: size,
        }
    }
}
