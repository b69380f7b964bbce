use std::fmt::{Display, Formatter};
use std::ops::Mul;

use ash::vk;

use crate::descriptor::set_layout::DescriptorKind;

/// Number of descriptors of each kind a descriptor set layout needs. Two layouts with the same count have the same
/// shape and can be allocated from the same pool.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorCount {
    pub uniform_buffers: u32,
    pub dynamic_uniform_buffers: u32,
    pub samplers: u32,
    pub input_attachments: u32,
}

impl DescriptorCount {
    /// Number of descriptors of one kind.
    pub fn get(&self, kind: DescriptorKind) -> u32 {
        match kind {
            DescriptorKind::UniformBuffer => self.uniform_buffers,
            DescriptorKind::DynamicUniformBuffer => self.dynamic_uniform_buffers,
            DescriptorKind::Sampler => self.samplers,
            DescriptorKind::InputAttachment => self.input_attachments,
        }
    }

    pub fn total(&self) -> u32 {
        DescriptorKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }

    /// Pool sizes for every kind with a non-zero count.
    pub(crate) fn pool_sizes(&self) -> Vec<vk::DescriptorPoolSize> {
        DescriptorKind::ALL
            .iter()
            .filter(|kind| self.get(**kind) != 0)
            .map(|kind| vk::DescriptorPoolSize {
                ty: kind.to_vk(),
                descriptor_count: self.get(*kind),
            })
            .collect()
    }
}

impl Mul<u32> for DescriptorCount {
    type Output = DescriptorCount;

    fn mul(self, rhs: u32) -> Self::Output {
        DescriptorCount {
            uniform_buffers: self.uniform_buffers * rhs,
            dynamic_uniform_buffers: self.dynamic_uniform_buffers * rhs,
            samplers: self.samplers * rhs,
            input_attachments: self.input_attachments * rhs,
        }
    }
}

impl Display for DescriptorCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(ubo: {}, dynamic ubo: {}, sampler: {}, input attachment: {})",
            self.uniform_buffers, self.dynamic_uniform_buffers, self.samplers, self.input_attachments
        )
    }
}
