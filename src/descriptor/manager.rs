//! The [`DescriptorSetManager`] is the single entry point for descriptor set management.
//!
//! # Lifecycle of a descriptor set
//!
//! 1. [`create_set`](DescriptorSetManager::create_set) allocates a native set from the pool set and starts a history
//!    for it.
//! 2. `update_*` calls write resources into the set and mark it dirty.
//! 3. [`bind`](DescriptorSetManager::bind) stashes the set in a slot. Nothing is recorded yet.
//! 4. [`commit`](DescriptorSetManager::commit) records `vkCmdBindDescriptorSets` for every stashed slot whose set is
//!    dirty, and skips the work entirely if nothing changed since the previous commit.
//! 5. [`destroy_set`](DescriptorSetManager::destroy_set) forgets the set. Its native handle returns to the pool once
//!    the last command context using it releases its resources.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use ash::vk;
use crossbeam_channel::{Receiver, Sender};

use crate::descriptor::write::{apply_writes, DescriptorWrite, WriteContents};
use crate::resource::handle::{Handle, HandleTable};
use crate::{
    Buffer, CommandContext, DescriptorCount, DescriptorKind, DescriptorPoolSet, DescriptorSet, DescriptorSetHistory,
    DescriptorSetLayout, DescriptorSettings, Device, LayoutBitmask, Sampler, Texture, TrackedResource,
    MAX_DESCRIPTOR_SET_SLOTS,
};

/// Handle the renderer uses to refer to a descriptor set.
pub type DescriptorSetHandle = Handle<DescriptorSet>;

/// Set of descriptor set slots, one bit per slot.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SlotMask(u8);

impl SlotMask {
    pub const fn empty() -> Self {
        SlotMask(0)
    }

    /// Mask with every slot set.
    pub const fn all() -> Self {
        SlotMask(((1u16 << MAX_DESCRIPTOR_SET_SLOTS) - 1) as u8)
    }

    pub fn from_slots(slots: &[usize]) -> Self {
        slots.iter().fold(SlotMask::empty(), |mask, slot| mask.with(*slot))
    }

    /// This mask with `slot` added.
    pub fn with(self, slot: usize) -> Self {
        assert!(slot < MAX_DESCRIPTOR_SET_SLOTS, "Descriptor set slot {slot} out of range");
        SlotMask(self.0 | (1 << slot))
    }

    /// This mask with `slot` removed.
    pub fn without(self, slot: usize) -> Self {
        SlotMask(self.0 & !(1 << slot))
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot < MAX_DESCRIPTOR_SET_SLOTS && self.0 & (1 << slot) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Slots in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = usize> {
        let mask = *self;
        (0..MAX_DESCRIPTOR_SET_SLOTS).filter(move |slot| mask.contains(*slot))
    }
}

type StashedSets = [Option<vk::DescriptorSet>; MAX_DESCRIPTOR_SET_SLOTS];

/// What was bound by the last commit. A commit that would produce the same state is skipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct BoundInfo {
    pipeline_layout: vk::PipelineLayout,
    slots: SlotMask,
    sets: StashedSets,
}

/// Sent by a dropped [`DescriptorSet`] so its native handle can be reused.
#[derive(Debug)]
struct RecycledSet {
    shape: DescriptorCount,
    bitmask: LayoutBitmask,
    handle: vk::DescriptorSet,
}

/// Resources written into bindings that are not explicitly populated.
#[derive(Debug, Clone)]
struct Placeholders {
    sampler: Arc<Sampler>,
    texture: Arc<Texture>,
    buffer: Arc<Buffer>,
}

/// Allocates, writes, stashes and binds descriptor sets while avoiding redundant work.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorSetManager {
    #[derivative(Debug = "ignore")]
    device: Device,
    pool_set: DescriptorPoolSet,
    sets: HandleTable<DescriptorSet>,
    history: HashMap<vk::DescriptorSet, DescriptorSetHistory>,
    stashed: StashedSets,
    last_bound: Option<BoundInfo>,
    placeholders: Option<Placeholders>,
    #[derivative(Debug = "ignore")]
    recycle_tx: Sender<RecycledSet>,
    #[derivative(Debug = "ignore")]
    recycle_rx: Receiver<RecycledSet>,
}

impl DescriptorSetManager {
    pub fn new(device: Device, settings: DescriptorSettings) -> Self {
        let (recycle_tx, recycle_rx) = crossbeam_channel::unbounded();
        Self {
            pool_set: DescriptorPoolSet::new(device.clone(), settings),
            device,
            sets: HandleTable::new(),
            history: HashMap::new(),
            stashed: [None; MAX_DESCRIPTOR_SET_SLOTS],
            last_bound: None,
            placeholders: None,
            recycle_tx,
            recycle_rx,
        }
    }

    /// Allocate a descriptor set for `layout`. If placeholders were set, every binding of the layout is pre-written
    /// with them.
    /// # Errors
    /// - Fails if a descriptor pool cannot be created or a set cannot be allocated.
    /// - Fails if the placeholder texture view cannot be created.
    pub fn create_set(&mut self, layout: &DescriptorSetLayout) -> Result<DescriptorSetHandle> {
        self.reclaim_sets();
        let native = self.pool_set.obtain_set(layout)?;

        let shape = layout.count();
        let bitmask = *layout.bitmask();
        let recycle_tx = self.recycle_tx.clone();
        let set = DescriptorSet::new(native, layout.handle(), shape, bitmask, move |handle| {
            if recycle_tx
                .send(RecycledSet {
                    shape,
                    bitmask,
                    handle,
                })
                .is_err()
            {
                trace!("Descriptor set {handle:?} dropped after its manager, not recycling");
            }
        });
        if let Some(placeholders) = &self.placeholders {
            self.write_placeholders(&set, placeholders)?;
        }
        let handle = self.sets.construct(set);
        let set = self.set_object(handle).clone();
        self.history.insert(native, DescriptorSetHistory::new(set));
        Ok(handle)
    }

    /// Forget a descriptor set. Slots the set was stashed in become empty. The native set is recycled once the last
    /// reference to it is gone.
    pub fn destroy_set(&mut self, set: DescriptorSetHandle) {
        let Some(object) = self.sets.destruct(set) else {
            panic!("Tried to destroy descriptor set {set:?}, which does not exist or was already destroyed");
        };
        let native = object.handle();
        self.history.remove(&native);
        for stashed in self.stashed.iter_mut() {
            if *stashed == Some(native) {
                *stashed = None;
            }
        }
    }

    /// Write a uniform buffer into `binding`. Whether the binding is a dynamic uniform buffer follows from the layout.
    pub fn update_buffer(&mut self, set: DescriptorSetHandle, binding: u32, buffer: &Arc<Buffer>, offset: vk::DeviceSize, size: vk::DeviceSize) {
        let object = self.set_object(set).clone();
        let info = buffer.descriptor_info(offset, size);
        let contents = match object.bitmask().kind_of(binding) {
            Some(DescriptorKind::UniformBuffer) => WriteContents::UniformBuffer(info),
            Some(DescriptorKind::DynamicUniformBuffer) => WriteContents::DynamicUniformBuffer(info),
            other => panic!("Binding {binding} of descriptor set {set:?} is {other:?}, not a uniform buffer"),
        };
        apply_writes(&self.device, object.handle(), &[DescriptorWrite { binding, contents }]);
        object.acquire(binding, [TrackedResource::from(buffer.clone())]);
        self.history_mut(object.handle()).write(binding);
    }

    /// Write a combined image sampler into `binding`.
    /// # Errors
    /// - Fails if the required image view cannot be created.
    pub fn update_sampler(&mut self, set: DescriptorSetHandle, binding: u32, texture: &Arc<Texture>, sampler: &Arc<Sampler>) -> Result<()> {
        let object = self.set_object(set).clone();
        Self::expect_kind(&object, set, binding, DescriptorKind::Sampler);
        let info = vk::DescriptorImageInfo {
            sampler: sampler.handle(),
            image_view: Self::sampled_view(texture)?,
            image_layout: texture.layout(),
        };
        let write = DescriptorWrite {
            binding,
            contents: WriteContents::CombinedImageSampler(info),
        };
        apply_writes(&self.device, object.handle(), &[write]);
        object.acquire(binding, [TrackedResource::from(texture.clone()), TrackedResource::from(sampler.clone())]);
        self.history_mut(object.handle()).write(binding);
        Ok(())
    }

    /// Write a subpass input attachment into `binding`, reading mip `level` of array layer `layer`.
    /// # Errors
    /// - Fails if the attachment view cannot be created.
    pub fn update_input_attachment(&mut self, set: DescriptorSetHandle, binding: u32, texture: &Arc<Texture>, level: u32, layer: u32) -> Result<()> {
        let object = self.set_object(set).clone();
        Self::expect_kind(&object, set, binding, DescriptorKind::InputAttachment);
        let info = vk::DescriptorImageInfo {
            sampler: vk::Sampler::null(),
            image_view: texture.attachment_view(level, layer)?,
            image_layout: texture.layout(),
        };
        let write = DescriptorWrite {
            binding,
            contents: WriteContents::InputAttachment(info),
        };
        apply_writes(&self.device, object.handle(), &[write]);
        object.acquire(binding, [TrackedResource::from(texture.clone())]);
        self.history_mut(object.handle()).write(binding);
        Ok(())
    }

    /// Set the resources that newly created sets are pre-written with.
    pub fn set_placeholders(&mut self, sampler: Arc<Sampler>, texture: Arc<Texture>, buffer: Arc<Buffer>) {
        self.placeholders = Some(Placeholders {
            sampler,
            texture,
            buffer,
        });
    }

    /// Stash `set` in `slot` with the given dynamic offsets. The set is bound on the next [`commit`](Self::commit).
    pub fn bind(&mut self, slot: usize, set: DescriptorSetHandle, offsets: &[u32]) {
        assert!(slot < MAX_DESCRIPTOR_SET_SLOTS, "Descriptor set slot {slot} out of range");
        let native = self.set_object(set).handle();
        if let Some(previous) = self.stashed[slot] {
            if previous != native {
                if let Some(history) = self.history.get_mut(&previous) {
                    history.unbind();
                }
            }
        }
        self.history_mut(native).set_offsets(offsets);
        self.stashed[slot] = Some(native);
    }

    /// Empty `slot`. The set that occupied it is marked unbound.
    pub fn unbind(&mut self, slot: usize) {
        assert!(slot < MAX_DESCRIPTOR_SET_SLOTS, "Descriptor set slot {slot} out of range");
        if let Some(previous) = self.stashed[slot].take() {
            if let Some(history) = self.history.get_mut(&previous) {
                history.unbind();
            }
        }
    }

    /// Record binds for every slot in `slots` whose stashed set is not bound yet.
    pub fn commit(&mut self, ctx: &mut CommandContext, pipeline_layout: vk::PipelineLayout, slots: SlotMask) {
        if slots.is_empty() {
            return;
        }
        let mut needs_update = slots;
        for slot in slots.slots() {
            let dirty = self.stashed[slot]
                .and_then(|native| self.history.get(&native))
                .map_or(false, |history| !history.is_bound());
            if !dirty {
                needs_update = needs_update.without(slot);
            }
        }

        let info = BoundInfo {
            pipeline_layout,
            slots,
            sets: self.stashed,
        };
        if needs_update.is_empty() && self.last_bound == Some(info) {
            return;
        }

        for slot in needs_update.slots() {
            if let Some(history) = self.stashed[slot].and_then(|native| self.history.get_mut(&native)) {
                history.bind(ctx, pipeline_layout, slot as u32);
            }
        }
        self.last_bound = Some(info);
    }

    /// Forget what was bound. Call this when starting to record a new command buffer, so the next commit binds every
    /// stashed set again.
    pub fn clear_bound_state(&mut self) {
        for history in self.history.values_mut().filter(|history| history.is_bound()) {
            history.unbind();
        }
        self.last_bound = None;
    }

    /// Return the native handles of every dropped descriptor set to their pools.
    pub fn reclaim_sets(&mut self) {
        while let Ok(recycled) = self.recycle_rx.try_recv() {
            self.pool_set.recycle(&recycled.shape, recycled.bitmask, recycled.handle);
        }
    }

    pub fn pool_set(&self) -> &DescriptorPoolSet {
        &self.pool_set
    }

    /// The descriptor set object behind a handle, if the handle is live.
    pub fn get(&self, set: DescriptorSetHandle) -> Option<&Arc<DescriptorSet>> {
        self.sets.get(set)
    }

    pub fn native_handle(&self, set: DescriptorSetHandle) -> Option<vk::DescriptorSet> {
        self.sets.get(set).map(|set| set.handle())
    }

    /// Whether the set is bound, or `None` if the handle is not live.
    pub fn is_bound(&self, set: DescriptorSetHandle) -> Option<bool> {
        self.history_of(set).map(|history| history.is_bound())
    }

    pub fn dynamic_offsets(&self, set: DescriptorSetHandle) -> Option<&[u32]> {
        self.history_of(set).map(|history| history.offsets())
    }

    pub fn history_of(&self, set: DescriptorSetHandle) -> Option<&DescriptorSetHistory> {
        self.native_handle(set).and_then(|native| self.history.get(&native))
    }

    /// The native set stashed in `slot`.
    pub fn stashed(&self, slot: usize) -> Option<vk::DescriptorSet> {
        self.stashed.get(slot).copied().flatten()
    }

    /// Number of descriptor sets that were created and not destroyed yet.
    pub fn live_set_count(&self) -> usize {
        self.sets.len()
    }

    fn set_object(&self, set: DescriptorSetHandle) -> &Arc<DescriptorSet> {
        match self.sets.get(set) {
            Some(object) => object,
            None => panic!("Descriptor set {set:?} does not exist or was already destroyed"),
        }
    }

    fn history_mut(&mut self, native: vk::DescriptorSet) -> &mut DescriptorSetHistory {
        match self.history.get_mut(&native) {
            Some(history) => history,
            None => panic!("Descriptor set {native:?} has no history"),
        }
    }

    fn expect_kind(set: &DescriptorSet, handle: DescriptorSetHandle, binding: u32, expected: DescriptorKind) {
        let actual = set.bitmask().kind_of(binding);
        assert_eq!(
            actual,
            Some(expected),
            "Binding {binding} of descriptor set {handle:?} is {actual:?}, expected {expected:?}"
        );
    }

    /// Mipmapped depth attachments are sampled through their attachment view, every other texture through its
    /// primary view.
    fn sampled_view(texture: &Texture) -> Result<vk::ImageView> {
        if texture.is_depth_attachment() && texture.mip_levels() > 1 {
            texture.attachment_view(0, 0)
        } else {
            texture.primary_view()
        }
    }

    fn write_placeholders(&self, set: &DescriptorSet, placeholders: &Placeholders) -> Result<()> {
        let bitmask = set.bitmask();
        let buffer_info = placeholders.buffer.descriptor_info(0, placeholders.buffer.size());
        let image_info = if bitmask.samplers != 0 {
            vk::DescriptorImageInfo {
                sampler: placeholders.sampler.handle(),
                image_view: Self::sampled_view(&placeholders.texture)?,
                image_layout: placeholders.texture.layout(),
            }
        } else {
            vk::DescriptorImageInfo::default()
        };
        let attachment_info = if bitmask.input_attachments != 0 {
            vk::DescriptorImageInfo {
                sampler: vk::Sampler::null(),
                image_view: placeholders.texture.attachment_view(0, 0)?,
                image_layout: placeholders.texture.layout(),
            }
        } else {
            vk::DescriptorImageInfo::default()
        };

        let mut writes = Vec::new();
        for kind in DescriptorKind::ALL {
            for binding in bitmask.bindings(kind) {
                let (contents, resources) = match kind {
                    DescriptorKind::UniformBuffer => (
                        WriteContents::UniformBuffer(buffer_info),
                        vec![TrackedResource::from(placeholders.buffer.clone())],
                    ),
                    DescriptorKind::DynamicUniformBuffer => (
                        WriteContents::DynamicUniformBuffer(buffer_info),
                        vec![TrackedResource::from(placeholders.buffer.clone())],
                    ),
                    DescriptorKind::Sampler => (
                        WriteContents::CombinedImageSampler(image_info),
                        vec![
                            TrackedResource::from(placeholders.texture.clone()),
                            TrackedResource::from(placeholders.sampler.clone()),
                        ],
                    ),
                    DescriptorKind::InputAttachment => (
                        WriteContents::InputAttachment(attachment_info),
                        vec![TrackedResource::from(placeholders.texture.clone())],
                    ),
                };
                writes.push(DescriptorWrite { binding, contents });
                set.acquire(binding, resources);
            }
        }
        apply_writes(&self.device, set.handle(), &writes);
        Ok(())
    }
}
