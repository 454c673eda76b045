//! The single editable mesh

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::gfx::geometry::GeometryData;
use crate::gfx::picking::AABB;
use crate::gfx::resources::material::Material;
use crate::ui::reflect::reflect_fields;

use super::transform::Transform;

pub type MeshId = u64;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// How the mesh geometry is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Solid,
    Line,
    Point,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Solid, DrawMode::Line, DrawMode::Point];
    pub const LABELS: &'static [&'static str] = &["Solid", "Line", "Point"];

    /// Combo label shown in the draw mode selector.
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`DrawMode::index`]; `None` past the last mode.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// The editable object: geometry, material and transform under one id.
///
/// A draw mode change replaces the whole mesh, so the id doubles as the
/// key for per-object GPU state.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub id: MeshId,
    pub mode: DrawMode,
    pub geometry: Arc<GeometryData>,
    /// Bumped on every geometry swap so GPU buffers can be rebuilt lazily
    pub geometry_revision: u64,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

reflect_fields!(SceneMesh {
    cast_shadow => "cast shadow": Toggle,
    receive_shadow => "receive shadow": Toggle,
    visible => "visible": Toggle,
});

impl SceneMesh {
    /// A fresh mesh: new id, identity transform, default flags.
    pub fn new(mode: DrawMode, geometry: Arc<GeometryData>, material: Material) -> Self {
        Self {
            id: NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed),
            mode,
            geometry,
            geometry_revision: 0,
            material,
            transform: Transform::default(),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    /// Swaps in rebuilt geometry and bumps the revision.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Freshly generated vertex data for the current parameters
    pub fn set_geometry(&mut self, geometry: GeometryData) {
        self.geometry = Arc::new(geometry);
        self.geometry_revision += 1;
    }

    /// Drawn and hit by the picker.
    pub fn is_shown(&self) -> bool {
        self.visible && self.material.flags().visible
    }

    /// World-space bounds of the transformed geometry.
    pub fn world_bounds(&self) -> AABB {
        self.geometry.bounds().transform(&self.transform.matrix())
    }
}
