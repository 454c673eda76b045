//! Camera system: a perspective camera with an editable transform and the
//! orbit controls that drive it.

pub mod camera_utils;
pub mod orbit_controls;
pub mod perspective_camera;

// Re-export main types
pub use camera_utils::Camera;
pub use orbit_controls::{OrbitControls, OrbitGesture};
pub use perspective_camera::PerspectiveCamera;
