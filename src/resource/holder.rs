//! Keep-alive references to GPU resources.
//!
//! A [`ResourceHolder`] exclusively owns one strong reference per acquired resource. Holders never share their
//! contents. Ownership moves between holders explicitly through [`ResourceHolder::transfer_into`], which is how a
//! descriptor set hands its references to a command context when it is bound.

use std::sync::Arc;

use crate::{Buffer, DescriptorSet, Sampler, Texture};

/// Any resource whose lifetime can be extended by a holder.
#[derive(Debug, Clone)]
pub enum TrackedResource {
    Buffer(Arc<Buffer>),
    Texture(Arc<Texture>),
    Sampler(Arc<Sampler>),
    DescriptorSet(Arc<DescriptorSet>),
}

impl TrackedResource {
    /// Whether both values keep the same object alive.
    pub fn same_object(&self, other: &TrackedResource) -> bool {
        match (self, other) {
            (TrackedResource::Buffer(a), TrackedResource::Buffer(b)) => Arc::ptr_eq(a, b),
            (TrackedResource::Texture(a), TrackedResource::Texture(b)) => Arc::ptr_eq(a, b),
            (TrackedResource::Sampler(a), TrackedResource::Sampler(b)) => Arc::ptr_eq(a, b),
            (TrackedResource::DescriptorSet(a), TrackedResource::DescriptorSet(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Arc<Buffer>> for TrackedResource {
    fn from(value: Arc<Buffer>) -> Self {
        TrackedResource::Buffer(value)
    }
}

impl From<Arc<Texture>> for TrackedResource {
    fn from(value: Arc<Texture>) -> Self {
        TrackedResource::Texture(value)
    }
}

impl From<Arc<Sampler>> for TrackedResource {
    fn from(value: Arc<Sampler>) -> Self {
        TrackedResource::Sampler(value)
    }
}

impl From<Arc<DescriptorSet>> for TrackedResource {
    fn from(value: Arc<DescriptorSet>) -> Self {
        TrackedResource::DescriptorSet(value)
    }
}

/// Aggregates keep-alive references.
#[derive(Debug, Default)]
pub struct ResourceHolder {
    resources: Vec<TrackedResource>,
}

impl ResourceHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `resource` alive until this holder is cleared or transferred.
    pub fn acquire(&mut self, resource: impl Into<TrackedResource>) {
        self.resources.push(resource.into());
    }

    pub fn contains(&self, resource: &TrackedResource) -> bool {
        self.resources.iter().any(|held| held.same_object(resource))
    }

    /// Move every reference into `other`, leaving this holder empty.
    pub fn transfer_into(&mut self, other: &mut ResourceHolder) {
        other.resources.append(&mut self.resources);
    }

    /// Drop every reference.
    pub fn clear(&mut self) {
        self.resources.clear();
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
