use std::sync::Arc;

use crate::config::EditorConfig;
use crate::gfx::{camera::PerspectiveCamera, geometry::GeometryData, resources::material::Material};

use super::environment::Environment;
use super::helpers::{light_helper_lines, BoxHelper, GridHelper, ShadowGround};
use super::light::{AmbientLight, PointLight, POINT_LIGHT_COUNT};
use super::mesh::{DrawMode, MeshId, SceneMesh};
use super::vertex::LineVertex;

/// The editor's fixed scene: one mesh, its lights and helpers.
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub mesh: SceneMesh,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    pub ambient: AmbientLight,
    pub environment: Environment,
    pub box_helper: BoxHelper,
    pub grid: GridHelper,
    pub ground: ShadowGround,
}

impl Scene {
    /// Creates the initial scene: the Solid-mode mesh at the origin, the
    /// three point lights, ambient light, grid, ground and helpers.
    ///
    /// # Arguments
    /// * `config` - Camera settings
    /// * `aspect` - Viewport aspect ratio
    /// * `geometry` - Geometry of the initial mesh
    /// * `material` - Material of the initial mesh
    pub fn new(config: &EditorConfig, aspect: f32, geometry: GeometryData, material: Material) -> Self {
        Self {
            camera: PerspectiveCamera::new(config.camera.clone(), aspect),
            mesh: SceneMesh::new(DrawMode::Solid, Arc::new(geometry), material),
            point_lights: PointLight::default_rig(),
            ambient: AmbientLight::default(),
            environment: Environment::default(),
            box_helper: BoxHelper::default(),
            grid: GridHelper::default(),
            ground: ShadowGround::default(),
        }
    }

    /// Replaces the mesh with a fresh one of another draw mode that shares
    /// the current geometry. Returns the id of the removed mesh.
    pub fn replace_mesh(&mut self, mode: DrawMode, material: Material) -> MeshId {
        let mesh = SceneMesh::new(mode, self.mesh.geometry.clone(), material);
        let old = std::mem::replace(&mut self.mesh, mesh);
        self.box_helper = BoxHelper {
            enabled: mode == DrawMode::Solid,
            visible: mode == DrawMode::Solid,
        };
        old.id
    }

    /// Box helper lines, when it is drawn.
    pub fn box_helper_lines(&self) -> Option<Vec<LineVertex>> {
        let shown = self.box_helper.enabled && self.box_helper.visible && self.mesh.mode == DrawMode::Solid;
        shown.then(|| BoxHelper::lines(&self.mesh.world_bounds()))
    }

    /// Marker lines of the lights whose helpers are visible
    pub fn light_helper_lines(&self) -> Vec<LineVertex> {
        self.point_lights
            .iter()
            .filter(|l| l.helper_visible)
            .flat_map(light_helper_lines)
            .collect()
    }
}
