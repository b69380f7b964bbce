use anyhow::Result;
use ash::vk;

use crate::{DescriptorCount, DescriptorPool, DescriptorSetLayout, DescriptorSettings, Device, LayoutBitmask};

/// An unbounded descriptor set allocator built from fixed-shape [`DescriptorPool`]s.
///
/// Pools are only ever appended, so their indices stay stable. When no pool of the requested shape has room, a new
/// one is created that is larger than the largest existing pool of that shape.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorPoolSet {
    #[derivative(Debug = "ignore")]
    device: Device,
    settings: DescriptorSettings,
    pools: Vec<DescriptorPool>,
}

impl DescriptorPoolSet {
    pub fn new(device: Device, settings: DescriptorSettings) -> Self {
        Self {
            device,
            settings,
            pools: Vec::new(),
        }
    }

    /// Obtain a set for `layout`, trying existing pools of the right shape in creation order before growing.
    /// # Errors
    /// - Fails if creating a new pool or allocating from a pool fails on the driver side.
    pub fn obtain_set(&mut self, layout: &DescriptorSetLayout) -> Result<vk::DescriptorSet> {
        let shape = layout.count();
        let mut largest_capacity = None;
        for pool in self.pools.iter_mut().filter(|pool| pool.can_allocate(&shape)) {
            if let Some(set) = pool.obtain_set(layout)? {
                return Ok(set);
            }
            largest_capacity = largest_capacity.max(Some(pool.capacity()));
        }

        let capacity = match largest_capacity {
            Some(capacity) => self.settings.grow(capacity),
            None => self.settings.initial_pool_capacity,
        };
        debug!("Creating descriptor pool with capacity {capacity} for shape {shape} (previous largest: {largest_capacity:?})");
        let mut pool = DescriptorPool::new(self.device.clone(), shape, capacity)?;
        let set = pool.obtain_set(layout)?;
        self.pools.push(pool);
        match set {
            Some(set) => Ok(set),
            None => panic!("Freshly created descriptor pool with capacity {capacity} for shape {shape} returned no descriptor set"),
        }
    }

    /// Return a set to the first pool with a matching shape.
    pub fn recycle(&mut self, shape: &DescriptorCount, bitmask: LayoutBitmask, set: vk::DescriptorSet) {
        if let Some(pool) = self.pools.iter_mut().find(|pool| pool.can_allocate(shape)) {
            pool.recycle(bitmask, set);
        }
    }

    /// All pools, in creation order.
    pub fn pools(&self) -> &[DescriptorPool] {
        &self.pools
    }

    /// Pools with the given shape, in creation order.
    pub fn pools_with_shape<'a>(&'a self, shape: &'a DescriptorCount) -> impl Iterator<Item = &'a DescriptorPool> + 'a {
        self.pools.iter().filter(move |pool| pool.can_allocate(shape))
    }
}
