// src/lib.rs
//! primedit
//!
//! An interactive single-object 3D scene editor built on wgpu and winit:
//! parametric primitives, materials, three point lights, a transform gizmo
//! and tweened animations, all driven from an ImGui parameter panel.

pub mod animation;
pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod gfx;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::PrimeditApp;
pub use config::EditorConfig;
pub use editor::Editor;
