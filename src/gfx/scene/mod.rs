//! # Scene
//!
//! The editor edits a fixed scene: a perspective camera, exactly one mesh,
//! three point lights plus an ambient light, and helpers around them.
//!
//! ## Key Components
//!
//! - [`Scene`] - owns everything drawn in the viewport
//! - [`SceneMesh`] - the editable mesh with its geometry, material and transform
//! - [`PointLight`] / [`AmbientLight`] - the light rig
//! - [`Environment`] - background color and fog
//! - [`MeshVertex`] / [`LineVertex`] - GPU vertex formats

pub mod environment;
pub mod helpers;
pub mod light;
pub mod mesh;
pub mod scene;
pub mod transform;
pub mod vertex;

pub use environment::{Environment, FogMode};
pub use helpers::{BoxHelper, GridHelper, ShadowGround};
pub use light::{AmbientLight, PointLight, POINT_LIGHT_COUNT};
pub use mesh::{DrawMode, MeshId, SceneMesh};
pub use scene::Scene;
pub use transform::Transform;
pub use vertex::{LineVertex, MeshVertex};
