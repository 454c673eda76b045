//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, and frame rendering.

pub mod gpu_mesh;
pub mod mesh_pipeline;
pub mod pipeline_manager;
pub mod render_engine;
pub mod shadow_cache;

// Re-export main types
pub use mesh_pipeline::{MeshDraw, MeshPipelineKey};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
