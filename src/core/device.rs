//! Wrapper around the native device function table.
//!
//! Every object in this crate that owns a Vulkan handle stores a [`Device`] and releases the handle in its `Drop`
//! implementation. The device itself only forwards calls to a [`DeviceFunctions`] implementation, which is
//! [`ash::Device`] for regular use.

use std::ops::Deref;
use std::sync::Arc;

use ash::prelude::VkResult;
use ash::vk;

/// The subset of the Vulkan device API used for descriptor management.
///
/// # Safety
/// All functions are thin wrappers over Vulkan commands and inherit their valid usage rules. Implementations that
/// do not talk to a real driver (for example to record calls) must still hand out unique non-null handles.
pub trait DeviceFunctions: Send + Sync {
    /// `vkCreateDescriptorPool`
    unsafe fn create_descriptor_pool(&self, info: &vk::DescriptorPoolCreateInfo) -> VkResult<vk::DescriptorPool>;
    /// `vkDestroyDescriptorPool`
    unsafe fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool);
    /// `vkAllocateDescriptorSets`
    unsafe fn allocate_descriptor_sets(&self, info: &vk::DescriptorSetAllocateInfo) -> VkResult<Vec<vk::DescriptorSet>>;
    /// `vkUpdateDescriptorSets`, without copies.
    unsafe fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]);
    /// `vkCreateDescriptorSetLayout`
    unsafe fn create_descriptor_set_layout(&self, info: &vk::DescriptorSetLayoutCreateInfo) -> VkResult<vk::DescriptorSetLayout>;
    /// `vkDestroyDescriptorSetLayout`
    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout);
    /// `vkCreateImageView`
    unsafe fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;
    /// `vkDestroyImageView`
    unsafe fn destroy_image_view(&self, view: vk::ImageView);
    /// `vkCreateSampler`
    unsafe fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler>;
    /// `vkDestroySampler`
    unsafe fn destroy_sampler(&self, sampler: vk::Sampler);
    /// `vkCmdBindDescriptorSets`
    unsafe fn cmd_bind_descriptor_sets(
        &self,
        cmd: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
        dynamic_offsets: &[u32],
    );
}

impl DeviceFunctions for ash::Device {
    unsafe fn create_descriptor_pool(&self, info: &vk::DescriptorPoolCreateInfo) -> VkResult<vk::DescriptorPool> {
        ash::Device::create_descriptor_pool(self, info, None)
    }

    unsafe fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        ash::Device::destroy_descriptor_pool(self, pool, None)
    }

    unsafe fn allocate_descriptor_sets(&self, info: &vk::DescriptorSetAllocateInfo) -> VkResult<Vec<vk::DescriptorSet>> {
        ash::Device::allocate_descriptor_sets(self, info)
    }

    unsafe fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]) {
        ash::Device::update_descriptor_sets(self, writes, &[])
    }

    unsafe fn create_descriptor_set_layout(&self, info: &vk::DescriptorSetLayoutCreateInfo) -> VkResult<vk::DescriptorSetLayout> {
        ash::Device::create_descriptor_set_layout(self, info, None)
    }

    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        ash::Device::destroy_descriptor_set_layout(self, layout, None)
    }

    unsafe fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        ash::Device::create_image_view(self, info, None)
    }

    unsafe fn destroy_image_view(&self, view: vk::ImageView) {
        ash::Device::destroy_image_view(self, view, None)
    }

    unsafe fn create_sampler(&self, info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        ash::Device::create_sampler(self, info, None)
    }

    unsafe fn destroy_sampler(&self, sampler: vk::Sampler) {
        ash::Device::destroy_sampler(self, sampler, None)
    }

    unsafe fn cmd_bind_descriptor_sets(
        &self,
        cmd: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
        dynamic_offsets: &[u32],
    ) {
        ash::Device::cmd_bind_descriptor_sets(self, cmd, bind_point, layout, first_set, sets, dynamic_offsets)
    }
}

/// Wrapper around a `VkDevice`. Internal state is wrapped in an `Arc`, so this is cheap and safe to clone.
#[derive(Clone)]
pub struct Device {
    inner: Arc<dyn DeviceFunctions>,
}

impl Device {
    /// Wrap a device function table. Pass an [`ash::Device`] to talk to the driver.
    pub fn new(functions: impl DeviceFunctions + 'static) -> Self {
        Self {
            inner: Arc::new(functions),
        }
    }
}

impl Deref for Device {
    type Target = dyn DeviceFunctions;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish_non_exhaustive()
    }
}
