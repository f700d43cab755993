//! Device-resident resources.
//!
//! Buffers, textures, and samplers are created through `&Device` from host
//! data or dimensions. Every resource records its usage-capability set at
//! creation; operations check that set *before* any GPU work is enqueued,
//! so violations surface as typed errors instead of submission-time
//! validation failures.

mod buffer;
mod sampler;
mod texture;

pub use buffer::{Buffer, MappedView};
pub use sampler::{Sampler, SamplerDesc};
pub use texture::Texture;
