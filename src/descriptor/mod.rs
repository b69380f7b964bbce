//! This module handles everything related to descriptor sets.
//!
//! The main type is the [`DescriptorSetManager`]. It allocates descriptor sets from pools that grow automatically,
//! writes resources into them, and binds them to command buffers while skipping binds that would not change anything.
//!
//! # Pools
//!
//! Descriptor pools are created per descriptor *shape*: the number of descriptors of each [`DescriptorKind`] a layout
//! needs. Layouts with the same shape share pools, but a recycled set is only handed out again to a layout with the
//! exact same [`LayoutBitmask`], since Vulkan interprets a set according to the layout it was allocated with.
//!
//! # Example
//!
//! ```
//! # use deimos::*;
//! # use std::sync::Arc;
//! # use anyhow::Result;
//! fn draw(
//!     manager: &mut DescriptorSetManager,
//!     ctx: &mut CommandContext,
//!     layout: &DescriptorSetLayout,
//!     pipeline_layout: vk::PipelineLayout,
//!     ubo: &Arc<Buffer>,
//! ) -> Result<DescriptorSetHandle> {
//!     let set = manager.create_set(layout)?;
//!     // In GLSL: layout(set = 0, binding = 0) uniform Camera { ... };
//!     manager.update_buffer(set, 0, ubo, 0, ubo.size());
//!     manager.bind(0, set, &[]);
//!     manager.commit(ctx, pipeline_layout, SlotMask::from_slots(&[0]));
//!     Ok(set)
//! }
//! ```

pub mod count;
pub mod descriptor_pool;
pub mod descriptor_set;
pub mod history;
pub mod manager;
pub mod pool_set;
pub mod set_layout;
pub mod write;
