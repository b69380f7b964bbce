//! Exposes the error type returned by fallible operations.

use ash::vk;
use thiserror::Error;

use crate::descriptor::count::DescriptorCount;

/// Error type that deimos can return.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic Vulkan error type.
    #[error("Vulkan error: `{0}`")]
    VkError(vk::Result),
    /// The driver refused to create a descriptor pool.
    #[error("Failed to create descriptor pool with capacity {capacity} for shape {shape}: `{result}`")]
    DescriptorPoolCreation {
        shape: DescriptorCount,
        capacity: u16,
        result: vk::Result,
    },
    /// A descriptor set could not be allocated even though the pool reported free capacity.
    #[error("Failed to allocate descriptor set from pool {pool:?} (size {size}, capacity {capacity}, shape {shape}): `{result}`")]
    DescriptorSetAllocation {
        pool: vk::DescriptorPool,
        size: u16,
        capacity: u16,
        shape: DescriptorCount,
        result: vk::Result,
    },
    /// The descriptor type cannot be classified into one of the supported descriptor kinds.
    #[error("Descriptor type `{0:?}` is not supported.")]
    UnsupportedDescriptorType(vk::DescriptorType),
    /// A binding is visible to a shader stage that the layout bitmask cannot encode.
    #[error("Shader stage `{0:?}` is not supported in descriptor set layouts.")]
    UnsupportedShaderStage(vk::ShaderStageFlags),
    /// Binding index does not fit in the layout bitmask.
    #[error("Binding {0} is out of range.")]
    BindingOutOfRange(u32),
    /// The same binding index was declared twice.
    #[error("Binding {0} was declared more than once.")]
    DuplicateBinding(u32),
    /// Tried to create a layout without bindings.
    #[error("Empty descriptor set layout.")]
    EmptyDescriptorSetLayout,
}

impl From<vk::Result> for Error {
    fn from(value: vk::Result) -> Self {
        Error::VkError(value)
    }
}
