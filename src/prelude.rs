pub use ash::vk;

pub use crate::core::device::{Device, DeviceFunctions};
pub use crate::core::error::Error;
pub use crate::core::settings::*;

pub use crate::resource::buffer::Buffer;
pub use crate::resource::handle::{Handle, HandleTable};
pub use crate::resource::holder::{ResourceHolder, TrackedResource};
pub use crate::resource::image::{SubresourceRange, Texture, TextureInfo};
pub use crate::resource::sampler::Sampler;

pub use crate::command_buffer::CommandContext;

pub use crate::descriptor::count::DescriptorCount;
pub use crate::descriptor::descriptor_pool::DescriptorPool;
pub use crate::descriptor::descriptor_set::DescriptorSet;
pub use crate::descriptor::history::{DescriptorSetHistory, DynamicOffsets};
pub use crate::descriptor::manager::{DescriptorSetHandle, DescriptorSetManager, SlotMask};
pub use crate::descriptor::pool_set::DescriptorPoolSet;
pub use crate::descriptor::set_layout::{DescriptorKind, DescriptorSetLayout, LayoutBinding, LayoutBitmask};
pub use crate::descriptor::write::{DescriptorWrite, WriteContents};
