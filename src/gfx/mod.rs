//! # Graphics Module
//!
//! Everything the viewport needs, from scene data to GPU resources.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - the camera, the single editable mesh, lights and helpers
//! - **Geometry** ([`geometry`]) - parametric primitives and the teapot
//! - **Resources** ([`resources`]) - materials, texture maps and GPU bindings
//! - **Rendering** ([`rendering`]) - pipelines, shadow maps and the frame loop
//! - **Interaction** ([`camera`], [`picking`], [`gizmos`]) - orbit controls,
//!   ray picking and the transform gizmo
//!
//! The window-independent parts (scene, geometry, picking) are plain data and
//! can be driven without a GPU, which is how the tests use them.

pub mod camera;
pub mod color;
pub mod geometry;
pub mod gizmos;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use rendering::render_engine::RenderEngine;
