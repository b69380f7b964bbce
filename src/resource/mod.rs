//! Resources that can be written into descriptor sets, and the types that keep them alive.
//!
//! Buffers, textures and samplers are referenced through `Arc`s. Acquiring a resource means cloning its `Arc` into a
//! [`ResourceHolder`](holder::ResourceHolder), which keeps it alive until the holder is cleared or handed over to a
//! [`CommandContext`](crate::CommandContext).

pub mod buffer;
pub mod handle;
pub mod holder;
pub mod image;
pub mod sampler;
