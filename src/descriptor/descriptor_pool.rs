//! A descriptor pool for one exact descriptor shape. Pools are created and grown by the
//! [`DescriptorPoolSet`](crate::DescriptorPoolSet), so you never need to create one manually.

use anyhow::Result;
use ash::vk;
use multimap::MultiMap;

use crate::{DescriptorCount, DescriptorSetLayout, Device, Error, LayoutBitmask};

/// Memory pool for descriptor sets of a single shape.
///
/// The pool hands out at most `capacity` native sets. Sets that are no longer used are never freed natively, they are
/// kept in a free list keyed by the exact layout bitmask they were allocated with and handed out again to layouts
/// with the same bitmask.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorPool {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::DescriptorPool,
    shape: DescriptorCount,
    capacity: u16,
    size: u16,
    #[derivative(Debug = "ignore")]
    free_lists: MultiMap<LayoutBitmask, vk::DescriptorSet>,
}

impl DescriptorPool {
    /// Create a new descriptor pool that can hold `capacity` sets of the given shape.
    /// # Errors
    /// - Fails with [`Error::DescriptorPoolCreation`] if the driver cannot create the pool.
    pub fn new(device: Device, shape: DescriptorCount, capacity: u16) -> Result<Self> {
        let pool_sizes = (shape * capacity as u32).pool_sizes();
        let info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(capacity as u32)
            .pool_sizes(pool_sizes.as_slice())
            .build();

        let handle = unsafe { device.create_descriptor_pool(&info) }.map_err(|result| Error::DescriptorPoolCreation {
            shape,
            capacity,
            result,
        })?;
        #[cfg(feature = "log-objects")]
        trace!("Created new VkDescriptorPool {handle:p} with capacity {capacity} for shape {shape}");

        Ok(Self {
            device,
            handle,
            shape,
            capacity,
            size: 0,
            free_lists: MultiMap::new(),
        })
    }

    /// Whether sets with the requested shape can be allocated from this pool. Only an exact match qualifies.
    pub fn can_allocate(&self, shape: &DescriptorCount) -> bool {
        self.shape == *shape
    }

    /// Obtain a set for `layout`. Recycled sets with the same layout bitmask are handed out first, most recently
    /// recycled first. Returns `None` if the free list is empty and the pool is full.
    /// # Errors
    /// - Fails with [`Error::DescriptorSetAllocation`] if the driver cannot allocate a set even though the pool has room.
    pub fn obtain_set(&mut self, layout: &DescriptorSetLayout) -> Result<Option<vk::DescriptorSet>> {
        if let Some(set) = self.free_lists.get_vec_mut(layout.bitmask()).and_then(|free| free.pop()) {
            return Ok(Some(set));
        }
        if self.size >= self.capacity {
            return Ok(None);
        }

        let set_layout = layout.handle();
        let info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.handle)
            .set_layouts(std::slice::from_ref(&set_layout))
            .build();
        let sets = unsafe { self.device.allocate_descriptor_sets(&info) }.map_err(|result| self.allocation_error(result))?;
        let set = sets
            .first()
            .copied()
            .ok_or_else(|| self.allocation_error(vk::Result::ERROR_UNKNOWN))?;
        self.size += 1;
        Ok(Some(set))
    }

    /// Return `set`, allocated with a layout matching `bitmask`, to this pool. The set stays allocated natively.
    pub fn recycle(&mut self, bitmask: LayoutBitmask, set: vk::DescriptorSet) {
        self.free_lists.insert(bitmask, set);
    }

    fn allocation_error(&self, result: vk::Result) -> Error {
        Error::DescriptorSetAllocation {
            pool: self.handle,
            size: self.size,
            capacity: self.capacity,
            shape: self.shape,
            result,
        }
    }

    /// Get the raw Vulkan handle of this descriptor pool.
    pub fn handle(&self) -> vk::DescriptorPool {
        self.handle
    }

    pub fn shape(&self) -> DescriptorCount {
        self.shape
    }

    /// Maximum number of sets this pool can hold.
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Number of sets allocated natively so far, including recycled ones.
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Number of recycled sets waiting for a layout with `bitmask`.
    pub fn free_count(&self, bitmask: &LayoutBitmask) -> usize {
        self.free_lists.get_vec(bitmask).map_or(0, |free| free.len())
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkDescriptorPool {:p}", self.handle);
        unsafe {
            self.device.destroy_descriptor_pool(self.handle);
        }
    }
}
