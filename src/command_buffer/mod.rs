//! The command context is the destination of descriptor bind commands.
//!
//! Besides the raw `VkCommandBuffer`, a [`CommandContext`] owns a [`ResourceHolder`] that keeps every resource used by
//! the recorded commands alive until the submission has finished executing. The owner of the context reports this
//! by calling [`CommandContext::release_resources`], usually after waiting on the submission's fence.
//!
//! # Example
//! ```
//! # use deimos::*;
//! fn record(device: Device, cmd: vk::CommandBuffer, manager: &mut DescriptorSetManager, layout: vk::PipelineLayout) {
//!     let mut ctx = CommandContext::new(device, cmd, vk::PipelineBindPoint::GRAPHICS);
//!     manager.commit(&mut ctx, layout, SlotMask::from_slots(&[0]));
//!     // ... submit, wait ...
//!     ctx.release_resources();
//! }
//! ```

use ash::vk;

use crate::{Device, ResourceHolder, TrackedResource};

/// A command buffer that is being recorded, together with the resources it uses.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CommandContext {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::CommandBuffer,
    bind_point: vk::PipelineBindPoint,
    tracker: ResourceHolder,
}

impl CommandContext {
    /// Wrap a command buffer in the recording state. Descriptor sets are bound at `bind_point`.
    pub fn new(device: Device, handle: vk::CommandBuffer, bind_point: vk::PipelineBindPoint) -> Self {
        Self {
            device,
            handle,
            bind_point,
            tracker: ResourceHolder::new(),
        }
    }

    /// Get the raw Vulkan handle of the command buffer.
    pub fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }

    pub fn bind_point(&self) -> vk::PipelineBindPoint {
        self.bind_point
    }

    /// Keep `resource` alive for at least the lifetime of this submission.
    pub fn acquire(&mut self, resource: impl Into<TrackedResource>) {
        self.tracker.acquire(resource);
    }

    /// Take over every reference held by `holder`.
    pub fn acquire_all(&mut self, holder: &mut ResourceHolder) {
        holder.transfer_into(&mut self.tracker);
    }

    /// Record `vkCmdBindDescriptorSets` for a single set.
    pub fn bind_descriptor_set(&mut self, layout: vk::PipelineLayout, slot: u32, set: vk::DescriptorSet, dynamic_offsets: &[u32]) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.handle,
                self.bind_point,
                layout,
                slot,
                std::slice::from_ref(&set),
                dynamic_offsets,
            );
        }
    }

    /// Number of references currently kept alive by this context.
    pub fn tracked_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_tracking(&self, resource: &TrackedResource) -> bool {
        self.tracker.contains(resource)
    }

    /// Drop every reference once the GPU is done with this submission.
    pub fn release_resources(&mut self) {
        self.tracker.clear();
    }
}
