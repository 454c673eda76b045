//! # User Interface Module
//!
//! Dear ImGui integration and the editor's panels.
//!
//! - [`UiManager`] - ImGui context, winit input capture and wgpu rendering
//! - [`panel`] - the navigation toolbar and the parameter panel
//! - [`reflect`] - how parameter records describe their own controls
//!
//! When the UI wants the mouse or keyboard, the viewport ignores that input
//! so dragging a slider never orbits the camera.

pub mod manager;
pub mod panel;
pub mod reflect;

// Re-export main types
pub use manager::UiManager;
pub use panel::editor_panels;
