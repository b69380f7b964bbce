//! Descriptor set layouts and their compact bitmask encoding.
//!
//! Every layout is summarized by a [`LayoutBitmask`]: one bit per binding index for each descriptor kind, plus one bit
//! per binding index for each shader stage that can see the binding. The bitmask decides which recycled descriptor
//! sets a layout may reuse. The [`DescriptorCount`] derived from it decides which pool a layout allocates from.

use anyhow::Result;
use ash::vk;

use crate::{DescriptorCount, Device, Error, MAX_BINDINGS};

/// The descriptor kinds supported in descriptor set layouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// A uniform buffer with its offset fixed at write time.
    UniformBuffer,
    /// A uniform buffer whose offset is supplied when the set is bound.
    DynamicUniformBuffer,
    /// A combined image sampler.
    Sampler,
    /// A subpass input attachment.
    InputAttachment,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 4] = [
        DescriptorKind::UniformBuffer,
        DescriptorKind::DynamicUniformBuffer,
        DescriptorKind::Sampler,
        DescriptorKind::InputAttachment,
    ];

    pub fn to_vk(&self) -> vk::DescriptorType {
        match self {
            DescriptorKind::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
            DescriptorKind::DynamicUniformBuffer => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
            DescriptorKind::Sampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            DescriptorKind::InputAttachment => vk::DescriptorType::INPUT_ATTACHMENT,
        }
    }
}

impl TryFrom<vk::DescriptorType> for DescriptorKind {
    type Error = Error;

    fn try_from(value: vk::DescriptorType) -> std::result::Result<Self, Self::Error> {
        match value {
            vk::DescriptorType::UNIFORM_BUFFER => Ok(DescriptorKind::UniformBuffer),
            vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC => Ok(DescriptorKind::DynamicUniformBuffer),
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER => Ok(DescriptorKind::Sampler),
            vk::DescriptorType::INPUT_ATTACHMENT => Ok(DescriptorKind::InputAttachment),
            other => Err(Error::UnsupportedDescriptorType(other)),
        }
    }
}

/// One binding in a descriptor set layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayoutBinding {
    /// Binding index, must be below [`MAX_BINDINGS`].
    pub binding: u32,
    pub kind: DescriptorKind,
    /// Shader stages that access this binding. Only vertex, fragment and compute stages are supported.
    pub stages: vk::ShaderStageFlags,
}

impl LayoutBinding {
    pub fn new(binding: u32, kind: DescriptorKind, stages: vk::ShaderStageFlags) -> Self {
        Self {
            binding,
            kind,
            stages,
        }
    }
}

/// Compact description of a layout's bindings. Two layouts with equal bitmasks are interchangeable for allocation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayoutBitmask {
    pub uniform_buffers: u32,
    pub dynamic_uniform_buffers: u32,
    pub samplers: u32,
    pub input_attachments: u32,
    pub vertex: u32,
    pub fragment: u32,
    pub compute: u32,
}

const SUPPORTED_STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
    vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw() | vk::ShaderStageFlags::COMPUTE.as_raw(),
);

impl LayoutBitmask {
    pub fn from_bindings(bindings: &[LayoutBinding]) -> Result<Self> {
        let mut mask = LayoutBitmask::default();
        for binding in bindings {
            if binding.binding >= MAX_BINDINGS {
                return Err(Error::BindingOutOfRange(binding.binding).into());
            }
            if !SUPPORTED_STAGES.contains(binding.stages) {
                return Err(Error::UnsupportedShaderStage(binding.stages).into());
            }
            let bit = 1u32 << binding.binding;
            if mask.kind_of(binding.binding).is_some() {
                return Err(Error::DuplicateBinding(binding.binding).into());
            }
            *mask.kind_mask_mut(binding.kind) |= bit;
            if binding.stages.contains(vk::ShaderStageFlags::VERTEX) {
                mask.vertex |= bit;
            }
            if binding.stages.contains(vk::ShaderStageFlags::FRAGMENT) {
                mask.fragment |= bit;
            }
            if binding.stages.contains(vk::ShaderStageFlags::COMPUTE) {
                mask.compute |= bit;
            }
        }
        Ok(mask)
    }

    /// Bindings of one descriptor kind, one bit per binding index.
    pub fn kind_mask(&self, kind: DescriptorKind) -> u32 {
        match kind {
            DescriptorKind::UniformBuffer => self.uniform_buffers,
            DescriptorKind::DynamicUniformBuffer => self.dynamic_uniform_buffers,
            DescriptorKind::Sampler => self.samplers,
            DescriptorKind::InputAttachment => self.input_attachments,
        }
    }

    fn kind_mask_mut(&mut self, kind: DescriptorKind) -> &mut u32 {
        match kind {
            DescriptorKind::UniformBuffer => &mut self.uniform_buffers,
            DescriptorKind::DynamicUniformBuffer => &mut self.dynamic_uniform_buffers,
            DescriptorKind::Sampler => &mut self.samplers,
            DescriptorKind::InputAttachment => &mut self.input_attachments,
        }
    }

    /// The kind of descriptor declared at `binding`, if any.
    pub fn kind_of(&self, binding: u32) -> Option<DescriptorKind> {
        if binding >= MAX_BINDINGS {
            return None;
        }
        DescriptorKind::ALL
            .into_iter()
            .find(|kind| self.kind_mask(*kind) & (1 << binding) != 0)
    }

    /// Shader stages that can see `binding`.
    pub fn stages_of(&self, binding: u32) -> vk::ShaderStageFlags {
        let mut stages = vk::ShaderStageFlags::empty();
        if binding >= MAX_BINDINGS {
            return stages;
        }
        let bit = 1 << binding;
        if self.vertex & bit != 0 {
            stages |= vk::ShaderStageFlags::VERTEX;
        }
        if self.fragment & bit != 0 {
            stages |= vk::ShaderStageFlags::FRAGMENT;
        }
        if self.compute & bit != 0 {
            stages |= vk::ShaderStageFlags::COMPUTE;
        }
        stages
    }

    /// Binding indices of one kind in ascending order.
    pub fn bindings(&self, kind: DescriptorKind) -> impl Iterator<Item = u32> {
        let mask = self.kind_mask(kind);
        (0..MAX_BINDINGS).filter(move |binding| mask & (1 << binding) != 0)
    }

    /// Number of descriptors of every kind.
    pub fn count(&self) -> DescriptorCount {
        DescriptorCount {
            uniform_buffers: self.uniform_buffers.count_ones(),
            dynamic_uniform_buffers: self.dynamic_uniform_buffers.count_ones(),
            samplers: self.samplers.count_ones(),
            input_attachments: self.input_attachments.count_ones(),
        }
    }
}

/// A Vulkan descriptor set layout together with its bitmask and descriptor count.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorSetLayout {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::DescriptorSetLayout,
    bitmask: LayoutBitmask,
    count: DescriptorCount,
}

impl DescriptorSetLayout {
    /// Create a new descriptor set layout.
    /// # Errors
    /// - Fails if `bindings` is empty, contains a binding index twice, an index that is out of range, or an unsupported stage.
    /// - Fails if the driver cannot create the layout.
    pub fn new(device: Device, bindings: &[LayoutBinding]) -> Result<Self> {
        if bindings.is_empty() {
            return Err(Error::EmptyDescriptorSetLayout.into());
        }
        let bitmask = LayoutBitmask::from_bindings(bindings)?;
        let vk_bindings = bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::builder()
                    .binding(binding.binding)
                    .descriptor_type(binding.kind.to_vk())
                    .descriptor_count(1)
                    .stage_flags(binding.stages)
                    .build()
            })
            .collect::<Vec<_>>();
        let info = vk::DescriptorSetLayoutCreateInfo::builder()
            .bindings(vk_bindings.as_slice())
            .build();
        let handle = unsafe { device.create_descriptor_set_layout(&info)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkDescriptorSetLayout {handle:p}");
        Ok(Self {
            device,
            handle,
            bitmask,
            count: bitmask.count(),
        })
    }

    /// Get the raw Vulkan handle of this layout.
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.handle
    }

    pub fn bitmask(&self) -> &LayoutBitmask {
        &self.bitmask
    }

    /// Number of descriptors of each kind in this layout.
    pub fn count(&self) -> DescriptorCount {
        self.count
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkDescriptorSetLayout {:p}", self.handle);
        unsafe {
            self.device.destroy_descriptor_set_layout(self.handle);
        }
    }
}
