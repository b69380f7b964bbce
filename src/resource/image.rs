//! Provides [`Texture`], a `VkImage` together with a cache of the image views that descriptors refer to.
//!
//! # Image views
//!
//! Descriptors never reference an image directly. Instead, [`Texture::view`] lazily creates one
//! [`VkImageView`](vk::ImageView) per subresource range and view type and keeps it for the lifetime of the texture.
//! Two views are special:
//! - The primary view covers the whole texture with the texture's own view type. This is what samplers read from.
//! - Attachment views cover a single mip level and array layer as a 2D view. These are what framebuffers and input
//!   attachments use.

use std::collections::HashMap;

use anyhow::Result;
use ash::vk;
use parking_lot::Mutex;

use crate::Device;

/// Hashable version of [`vk::ImageSubresourceRange`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct SubresourceRange {
    /// Image aspect
    pub aspect: vk::ImageAspectFlags,
    /// First mip level in the range
    pub base_level: u32,
    /// Number of mip levels in the range
    pub level_count: u32,
    /// First array layer in the range
    pub base_layer: u32,
    /// Number of array layers in the range
    pub layer_count: u32,
}

impl SubresourceRange {
    pub fn to_vk(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect,
            base_mip_level: self.base_level,
            level_count: self.level_count,
            base_array_layer: self.base_layer,
            layer_count: self.layer_count,
        }
    }
}

/// Describes an existing image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Pixel format of the image
    pub format: vk::Format,
    /// Aspects of the image. Depth textures must include `DEPTH`.
    pub aspect: vk::ImageAspectFlags,
    /// Usage flags the image was created with
    pub usage: vk::ImageUsageFlags,
    /// Number of mip levels
    pub mip_levels: u32,
    /// Number of array layers
    pub layers: u32,
    /// View type of the primary view
    pub view_type: vk::ImageViewType,
    /// Layout the image is in when it is first sampled
    pub layout: vk::ImageLayout,
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self {
            format: vk::Format::R8G8B8A8_UNORM,
            aspect: vk::ImageAspectFlags::COLOR,
            usage: vk::ImageUsageFlags::SAMPLED,
            mip_levels: 1,
            layers: 1,
            view_type: vk::ImageViewType::TYPE_2D,
            layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }
    }
}

type ViewKey = (SubresourceRange, vk::ImageViewType);

/// An image that can be sampled or read as an input attachment. The image memory itself is owned by the caller, the
/// texture only owns the image views it created.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Texture {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Image,
    info: TextureInfo,
    layout: Mutex<vk::ImageLayout>,
    views: Mutex<HashMap<ViewKey, vk::ImageView>>,
}

impl Texture {
    /// Wrap an existing `VkImage`.
    pub fn from_raw(device: Device, handle: vk::Image, info: TextureInfo) -> Self {
        Self {
            device,
            handle,
            layout: Mutex::new(info.layout),
            info,
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Get the raw Vulkan handle of the image.
    pub fn handle(&self) -> vk::Image {
        self.handle
    }

    pub fn info(&self) -> &TextureInfo {
        &self.info
    }

    pub fn mip_levels(&self) -> u32 {
        self.info.mip_levels
    }

    /// Whether this is a depth (or depth-stencil) texture.
    pub fn is_depth(&self) -> bool {
        self.info.aspect.contains(vk::ImageAspectFlags::DEPTH)
    }

    /// Whether this texture can be rendered to as a depth attachment.
    pub fn is_depth_attachment(&self) -> bool {
        self.is_depth() && self.info.usage.contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
    }

    /// The layout the texture is currently in.
    pub fn layout(&self) -> vk::ImageLayout {
        *self.layout.lock()
    }

    /// Record a layout transition performed by the renderer. Descriptors written afterwards use the new layout.
    pub fn set_layout(&self, layout: vk::ImageLayout) {
        *self.layout.lock() = layout;
    }

    /// The range covering every level and layer of the texture. Depth-stencil textures are only viewed through their
    /// depth aspect.
    pub fn primary_range(&self) -> SubresourceRange {
        let aspect = if self.is_depth() {
            vk::ImageAspectFlags::DEPTH
        } else {
            self.info.aspect
        };
        SubresourceRange {
            aspect,
            base_level: 0,
            level_count: self.info.mip_levels,
            base_layer: 0,
            layer_count: self.info.layers,
        }
    }

    /// The view samplers read from.
    pub fn primary_view(&self) -> Result<vk::ImageView> {
        self.view(self.primary_range(), self.info.view_type)
    }

    /// A single level, single layer 2D view as used by framebuffer attachments.
    pub fn attachment_view(&self, level: u32, layer: u32) -> Result<vk::ImageView> {
        let range = SubresourceRange {
            base_level: level,
            level_count: 1,
            base_layer: layer,
            layer_count: 1,
            ..self.primary_range()
        };
        self.view(range, vk::ImageViewType::TYPE_2D)
    }

    /// Get the image view for a range and view type, creating it on first use.
    pub fn view(&self, range: SubresourceRange, view_type: vk::ImageViewType) -> Result<vk::ImageView> {
        let mut views = self.views.lock();
        if let Some(view) = views.get(&(range, view_type)) {
            return Ok(*view);
        }

        let info = vk::ImageViewCreateInfo::builder()
            .image(self.handle)
            .view_type(view_type)
            .format(self.info.format)
            .components(vk::ComponentMapping::default())
            .subresource_range(range.to_vk())
            .build();
        let view = unsafe { self.device.create_image_view(&info)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkImageView {view:p} for VkImage {:p}", self.handle);
        views.insert((range, view_type), view);
        Ok(view)
    }

    /// Number of image views created so far.
    pub fn view_count(&self) -> usize {
        self.views.lock().len()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        for (_, view) in self.views.get_mut().drain() {
            #[cfg(feature = "log-objects")]
            trace!("Destroying VkImageView {view:p}");
            unsafe {
                self.device.destroy_image_view(view);
            }
        }
    }
}
