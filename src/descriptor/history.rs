//! Per-set binding state.
//!
//! A [`DescriptorSetHistory`] is either unbound (dirty) or bound. While unbound, its holder keeps the descriptor set
//! (and through it, every resource written into the set) alive. Binding the set moves that reference into the command
//! context, which keeps it alive until the submission completes.
//!
//! ```text
//!            write / set_offsets / unbind
//!     +--------------------------------------+
//!     v                                      |
//! [ Unbound ] ------------ bind ---------> [ Bound ]
//!     ^  |
//!     +--+ write / set_offsets
//! ```

use std::sync::Arc;

use ash::vk;
use smallvec::SmallVec;

use crate::{CommandContext, DescriptorSet, ResourceHolder};

/// Dynamic offsets for one descriptor set, in binding order.
pub type DynamicOffsets = SmallVec<[u32; 4]>;

/// Tracks the dynamic offsets, dirtiness and resource ownership of one descriptor set.
#[derive(Debug)]
pub struct DescriptorSetHistory {
    set: Arc<DescriptorSet>,
    dynamic_uniform_buffers: u32,
    offsets: DynamicOffsets,
    bound: bool,
    holder: ResourceHolder,
}

impl DescriptorSetHistory {
    /// Start tracking `set`. A new history is unbound, since the set has never been bound.
    pub fn new(set: Arc<DescriptorSet>) -> Self {
        let dynamic_uniform_buffers = set.bitmask().dynamic_uniform_buffers;
        let mut history = Self {
            set,
            dynamic_uniform_buffers,
            offsets: DynamicOffsets::new(),
            bound: true,
            holder: ResourceHolder::new(),
        };
        history.unbind();
        history
    }

    /// Replace the dynamic offsets. Offsets are consumed at bind time, so the set has to be bound again.
    pub fn set_offsets(&mut self, offsets: &[u32]) {
        self.offsets = DynamicOffsets::from_slice(offsets);
        self.unbind();
    }

    /// Record that `binding` was written to.
    pub fn write(&mut self, _binding: u32) {
        self.unbind();
    }

    /// Bind the set at `slot` and hand the set's references over to `ctx`.
    pub fn bind(&mut self, ctx: &mut CommandContext, layout: vk::PipelineLayout, slot: u32) {
        let dynamic_count = self.dynamic_uniform_buffers.count_ones() as usize;
        let mut offsets = self.offsets.clone();
        offsets.resize(dynamic_count, 0);
        ctx.bind_descriptor_set(layout, slot, self.set.handle(), offsets.as_slice());
        ctx.acquire(self.set.clone());
        ctx.acquire_all(&mut self.holder);
        self.bound = true;
    }

    /// Mark the set unbound. The holder protects the set again until it is next bound.
    pub fn unbind(&mut self) {
        if self.holder.is_empty() {
            self.holder.acquire(self.set.clone());
        }
        self.bound = false;
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Bitmask of bindings that are dynamic uniform buffers.
    pub fn dynamic_uniform_buffers(&self) -> u32 {
        self.dynamic_uniform_buffers
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn set(&self) -> &Arc<DescriptorSet> {
        &self.set
    }

    /// References kept alive by this history while the set is unbound.
    pub fn holder(&self) -> &ResourceHolder {
        &self.holder
    }
}
