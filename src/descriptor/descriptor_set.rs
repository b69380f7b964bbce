use std::collections::HashMap;

use ash::vk;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{DescriptorCount, LayoutBitmask, TrackedResource};

type DropCallback = Box<dyn FnOnce(vk::DescriptorSet) + Send + Sync>;

/// A descriptor set allocated from a pool managed by a [`DescriptorSetManager`](crate::DescriptorSetManager).
///
/// The set keeps every resource written into it alive. When the last reference to the set is dropped, the callback
/// given at construction runs with the raw handle, which the manager uses to return the handle to its pool.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorSet {
    handle: vk::DescriptorSet,
    layout: vk::DescriptorSetLayout,
    shape: DescriptorCount,
    bitmask: LayoutBitmask,
    resources: Mutex<HashMap<u32, SmallVec<[TrackedResource; 2]>>>,
    #[derivative(Debug = "ignore")]
    on_drop: Option<DropCallback>,
}

static_assertions::assert_impl_all!(DescriptorSet: Send, Sync);

impl DescriptorSet {
    /// Wrap a freshly allocated (or recycled) set. `shape` and `bitmask` are copied out of the layout, so they stay
    /// valid even if the layout is destroyed before the set.
    pub fn new(
        handle: vk::DescriptorSet,
        layout: vk::DescriptorSetLayout,
        shape: DescriptorCount,
        bitmask: LayoutBitmask,
        on_drop: impl FnOnce(vk::DescriptorSet) + Send + Sync + 'static,
    ) -> Self {
        Self {
            handle,
            layout,
            shape,
            bitmask,
            resources: Mutex::new(HashMap::new()),
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Get the raw Vulkan handle of this descriptor set.
    pub fn handle(&self) -> vk::DescriptorSet {
        self.handle
    }

    /// The layout this set was allocated with.
    pub fn layout(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    pub fn shape(&self) -> DescriptorCount {
        self.shape
    }

    pub fn bitmask(&self) -> &LayoutBitmask {
        &self.bitmask
    }

    /// Replace the resources referenced by `binding`.
    pub fn acquire(&self, binding: u32, resources: impl IntoIterator<Item = TrackedResource>) {
        self.resources.lock().insert(binding, resources.into_iter().collect());
    }

    /// Number of resource references held for `binding`.
    pub fn resource_count(&self, binding: u32) -> usize {
        self.resources.lock().get(&binding).map_or(0, |resources| resources.len())
    }

    /// Whether any binding of this set references `resource`.
    pub fn references(&self, resource: &TrackedResource) -> bool {
        self.resources
            .lock()
            .values()
            .flatten()
            .any(|held| held.same_object(resource))
    }
}

impl Drop for DescriptorSet {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop(self.handle);
        }
    }
}
