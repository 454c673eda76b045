//! # Gizmo System
//!
//! The transform gizmo attached to the mesh or a point light. It draws its
//! handles as overlay lines and turns pointer drags on a handle into
//! translation, rotation or scale of the attached object.

pub mod transform_gizmo;

// Re-export main types
pub use transform_gizmo::{GizmoAxis, GizmoMode, TransformGizmo};
