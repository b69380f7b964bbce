#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once};

use anyhow::Result;
use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;

use deimos::{
    Buffer, CommandContext, DescriptorKind, DescriptorSetLayout, DescriptorSetManager, DescriptorSettings, Device,
    DeviceFunctions, LayoutBinding, Sampler, Texture, TextureInfo,
};

#[derive(Debug, Clone)]
pub struct PoolCreation {
    pub handle: vk::DescriptorPool,
    pub max_sets: u32,
    pub sizes: Vec<(vk::DescriptorType, u32)>,
}

#[derive(Debug, Clone)]
pub struct SetAllocation {
    pub pool: vk::DescriptorPool,
    pub layout: vk::DescriptorSetLayout,
    pub set: vk::DescriptorSet,
}

#[derive(Debug, Clone)]
pub struct Write {
    pub set: vk::DescriptorSet,
    pub binding: u32,
    pub ty: vk::DescriptorType,
    pub buffer: Option<vk::DescriptorBufferInfo>,
    pub image: Option<vk::DescriptorImageInfo>,
}

#[derive(Debug, Clone)]
pub struct Bind {
    pub cmd: vk::CommandBuffer,
    pub bind_point: vk::PipelineBindPoint,
    pub layout: vk::PipelineLayout,
    pub first_set: u32,
    pub sets: Vec<vk::DescriptorSet>,
    pub dynamic_offsets: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct ViewCreation {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub view_type: vk::ImageViewType,
    pub range: vk::ImageSubresourceRange,
}

#[derive(Debug, Default)]
pub struct Recording {
    pub pools: Vec<PoolCreation>,
    pub destroyed_pools: Vec<vk::DescriptorPool>,
    pub allocations: Vec<SetAllocation>,
    pub writes: Vec<Write>,
    pub binds: Vec<Bind>,
    pub views: Vec<ViewCreation>,
    pub destroyed_views: Vec<vk::ImageView>,
    pub layouts: Vec<vk::DescriptorSetLayout>,
    pub destroyed_layouts: Vec<vk::DescriptorSetLayout>,
    pub samplers: Vec<vk::Sampler>,
    pub destroyed_samplers: Vec<vk::Sampler>,
}

/// Device that hands out fake handles and records every call made through it.
#[derive(Clone, Default)]
pub struct RecordingDevice {
    recording: Arc<Mutex<Recording>>,
    next_handle: Arc<AtomicU64>,
    fail_allocations: Arc<AtomicBool>,
    fail_pool_creation: Arc<AtomicBool>,
}

impl RecordingDevice {
    pub fn recording(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap()
    }

    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pool_creation(&self, fail: bool) {
        self.fail_pool_creation.store(fail, Ordering::SeqCst);
    }

    fn next<H: Handle>(&self) -> H {
        H::from_raw(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl DeviceFunctions for RecordingDevice {
    unsafe fn create_descriptor_pool(&self, info: &vk::DescriptorPoolCreateInfo) -> VkResult<vk::DescriptorPool> {
        if self.fail_pool_creation.load(Ordering::SeqCst) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        let handle = self.next();
        let sizes = std::slice::from_raw_parts(info.p_pool_sizes, info.pool_size_count as usize)
            .iter()
            .map(|size| (size.ty, size.descriptor_count))
            .collect();
        self.recording().pools.push(PoolCreation {
            handle,
            max_sets: info.max_sets,
            sizes,
        });
        Ok(handle)
    }

    unsafe fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        self.recording().destroyed_pools.push(pool);
    }

    unsafe fn allocate_descriptor_sets(&self, info: &vk::DescriptorSetAllocateInfo) -> VkResult<Vec<vk::DescriptorSet>> {
        if self.fail_allocations.load(Ordering::SeqCst) {
            return Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY);
        }
        let layouts = std::slice::from_raw_parts(info.p_set_layouts, info.descriptor_set_count as usize);
        let mut sets = Vec::new();
        for layout in layouts {
            let set = self.next();
            self.recording().allocations.push(SetAllocation {
                pool: info.descriptor_pool,
                layout: *layout,
                set,
            });
            sets.push(set);
        }
        Ok(sets)
    }

    unsafe fn update_descriptor_sets(&self, writes: &[vk::WriteDescriptorSet]) {
        let mut recording = self.recording();
        for write in writes {
            let buffer = if write.p_buffer_info.is_null() {
                None
            } else {
                Some(*write.p_buffer_info)
            };
            let image = if write.p_image_info.is_null() {
                None
            } else {
                Some(*write.p_image_info)
            };
            recording.writes.push(Write {
                set: write.dst_set,
                binding: write.dst_binding,
                ty: write.descriptor_type,
                buffer,
                image,
            });
        }
    }

    unsafe fn create_descriptor_set_layout(&self, _info: &vk::DescriptorSetLayoutCreateInfo) -> VkResult<vk::DescriptorSetLayout> {
        let handle = self.next();
        self.recording().layouts.push(handle);
        Ok(handle)
    }

    unsafe fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        self.recording().destroyed_layouts.push(layout);
    }

    unsafe fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        let view = self.next();
        self.recording().views.push(ViewCreation {
            image: info.image,
            view,
            view_type: info.view_type,
            range: info.subresource_range,
        });
        Ok(view)
    }

    unsafe fn destroy_image_view(&self, view: vk::ImageView) {
        self.recording().destroyed_views.push(view);
    }

    unsafe fn create_sampler(&self, _info: &vk::SamplerCreateInfo) -> VkResult<vk::Sampler> {
        let handle = self.next();
        self.recording().samplers.push(handle);
        Ok(handle)
    }

    unsafe fn destroy_sampler(&self, sampler: vk::Sampler) {
        self.recording().destroyed_samplers.push(sampler);
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
        self.recording().binds.push(Bind {
            cmd,
            bind_point,
            layout,
            first_set,
            sets: sets.to_vec(),
            dynamic_offsets: dynamic_offsets.to_vec(),
        });
    }
}

/// A recording device plus the [`Device`] wrapping it.
pub struct Context {
    pub recorder: RecordingDevice,
    pub device: Device,
}

static LOGGER: Once = Once::new();

/// Creates a device that records all calls, ready for automated tests
pub fn make_context() -> Context {
    LOGGER.call_once(|| {
        let _ = pretty_env_logger::try_init();
    });
    let recorder = RecordingDevice::default();
    Context {
        device: Device::new(recorder.clone()),
        recorder,
    }
}

impl Context {
    pub fn manager(&self) -> DescriptorSetManager {
        DescriptorSetManager::new(self.device.clone(), DescriptorSettings::default())
    }

    pub fn manager_with(&self, settings: DescriptorSettings) -> DescriptorSetManager {
        DescriptorSetManager::new(self.device.clone(), settings)
    }

    pub fn layout(&self, bindings: &[(u32, DescriptorKind)]) -> Result<DescriptorSetLayout> {
        let bindings = bindings
            .iter()
            .map(|(binding, kind)| LayoutBinding::new(*binding, *kind, vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT))
            .collect::<Vec<_>>();
        DescriptorSetLayout::new(self.device.clone(), &bindings)
    }

    /// Layout with a uniform buffer at binding 0 and a sampler at binding 1.
    pub fn ubo_sampler_layout(&self) -> Result<DescriptorSetLayout> {
        self.layout(&[(0, DescriptorKind::UniformBuffer), (1, DescriptorKind::Sampler)])
    }

    pub fn command_context(&self) -> CommandContext {
        CommandContext::new(self.device.clone(), vk::CommandBuffer::from_raw(0xC0FFEE), vk::PipelineBindPoint::GRAPHICS)
    }

    pub fn buffer(&self, size: vk::DeviceSize) -> Arc<Buffer> {
        Arc::new(Buffer::from_raw(self.recorder.next(), size))
    }

    pub fn texture(&self, info: TextureInfo) -> Arc<Texture> {
        Arc::new(Texture::from_raw(self.device.clone(), self.recorder.next(), info))
    }

    pub fn sampler(&self) -> Result<Arc<Sampler>> {
        Ok(Arc::new(Sampler::default(self.device.clone())?))
    }

    pub fn bind_count(&self) -> usize {
        self.recorder.recording().binds.len()
    }

    pub fn pool_count(&self) -> usize {
        self.recorder.recording().pools.len()
    }
}

pub fn pipeline_layout(raw: u64) -> vk::PipelineLayout {
    vk::PipelineLayout::from_raw(raw)
}
