//! GPU resource management
//!
//! Materials and texture maps on the CPU side, and the uniforms, textures
//! and bind groups they become on the GPU.

pub mod global_bindings;
pub mod material;
pub mod object_bindings;
pub mod texture_map;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use object_bindings::{ObjectBindings, ObjectUniformContent};
pub use texture_resource::TextureResource;
