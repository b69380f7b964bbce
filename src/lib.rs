//! Pooled Vulkan descriptor set allocation, caching and binding.
//!
//! Deimos takes care of the descriptor set side of a renderer: it allocates descriptor sets from pools that grow on
//! demand, recycles them when they are destroyed, keeps written resources alive for as long as the GPU may read them,
//! and records only the `vkCmdBindDescriptorSets` calls that actually change something.
//!
//! To get started, import everything through the prelude
//! ```
//! use deimos::prelude::*;
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use deimos::prelude::*;
//!
//! # fn example(ash_device: ash::Device, cmd: vk::CommandBuffer, pipeline_layout: vk::PipelineLayout, ubo: vk::Buffer) -> anyhow::Result<()> {
//! let device = Device::new(ash_device);
//! let mut manager = DescriptorSetManager::new(device.clone(), DescriptorSettings::default());
//! let layout = DescriptorSetLayout::new(
//!     device.clone(),
//!     &[LayoutBinding::new(0, DescriptorKind::UniformBuffer, vk::ShaderStageFlags::VERTEX)],
//! )?;
//! let ubo = Arc::new(Buffer::from_raw(ubo, 256));
//!
//! let set = manager.create_set(&layout)?;
//! manager.update_buffer(set, 0, &ubo, 0, 256);
//!
//! let mut ctx = CommandContext::new(device, cmd, vk::PipelineBindPoint::GRAPHICS);
//! manager.bind(0, set, &[]);
//! manager.commit(&mut ctx, pipeline_layout, SlotMask::from_slots(&[0]));
//! # Ok(())
//! # }
//! ```
//! For further details, check out the following modules
//! - [`descriptor`] for pools, layouts and the descriptor set manager.
//! - [`resource`] for buffers, textures, samplers and resource lifetime tracking.
//! - [`command_buffer`] for the command context descriptor sets are bound to.
//! - [`core`] for the device wrapper, errors and settings.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod command_buffer;
pub mod core;
pub mod descriptor;
pub mod resource;
