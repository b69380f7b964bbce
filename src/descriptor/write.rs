//! Descriptor write requests.
//!
//! Every write is described by a [`DescriptorWrite`]: a binding index plus the kind-specific payload. Turning it into a
//! `vkUpdateDescriptorSets` call is a pure function of the request, which lets several writes be batched into one call.

use ash::vk;

/// Payload of a single descriptor write.
#[derive(Debug, Copy, Clone)]
pub enum WriteContents {
    UniformBuffer(vk::DescriptorBufferInfo),
    DynamicUniformBuffer(vk::DescriptorBufferInfo),
    CombinedImageSampler(vk::DescriptorImageInfo),
    InputAttachment(vk::DescriptorImageInfo),
}

/// A write of one descriptor into one binding.
#[derive(Debug, Copy, Clone)]
pub struct DescriptorWrite {
    pub binding: u32,
    pub contents: WriteContents,
}

impl DescriptorWrite {
    pub fn descriptor_type(&self) -> vk::DescriptorType {
        match self.contents {
            WriteContents::UniformBuffer(_) => vk::DescriptorType::UNIFORM_BUFFER,
            WriteContents::DynamicUniformBuffer(_) => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
            WriteContents::CombinedImageSampler(_) => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            WriteContents::InputAttachment(_) => vk::DescriptorType::INPUT_ATTACHMENT,
        }
    }

    /// Build the raw write. The returned struct points into `self`, so `self` must outlive its use.
    pub(crate) fn to_vk(&self, set: vk::DescriptorSet) -> vk::WriteDescriptorSet {
        let builder = vk::WriteDescriptorSet::builder()
            .dst_set(set)
            .dst_binding(self.binding)
            .dst_array_element(0)
            .descriptor_type(self.descriptor_type());
        match &self.contents {
            WriteContents::UniformBuffer(info) | WriteContents::DynamicUniformBuffer(info) => {
                builder.buffer_info(std::slice::from_ref(info)).build()
            }
            WriteContents::CombinedImageSampler(info) | WriteContents::InputAttachment(info) => {
                builder.image_info(std::slice::from_ref(info)).build()
            }
        }
    }
}

/// Apply a batch of writes to `set` in one `vkUpdateDescriptorSets` call.
pub(crate) fn apply_writes(device: &crate::Device, set: vk::DescriptorSet, writes: &[DescriptorWrite]) {
    if writes.is_empty() {
        return;
    }
    let vk_writes = writes.iter().map(|write| write.to_vk(set)).collect::<Vec<_>>();
    unsafe {
        device.update_descriptor_sets(vk_writes.as_slice());
    }
}
