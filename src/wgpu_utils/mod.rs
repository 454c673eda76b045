//! Thin helpers over wgpu bind groups and uniform buffers.
//!
//! The editor has three kinds of bind group: the per-frame globals with the
//! shadow maps, one group per drawable object, and one small uniform per
//! shadow pass. Everything here exists to keep those three short to declare.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
