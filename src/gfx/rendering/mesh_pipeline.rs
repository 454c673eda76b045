//! Pipeline state of the editable mesh
//!
//! The mesh material decides topology, face culling, blending and depth
//! state. Each reachable combination maps to one named pipeline in the
//! [`PipelineManager`](super::pipeline_manager::PipelineManager).

use wgpu::{BindGroupLayout, Face, PrimitiveTopology, TextureFormat};

use crate::gfx::{
    resources::{material::Side, texture_resource::TextureResource},
    scene::{DrawMode, MeshVertex, SceneMesh},
};

use super::pipeline_manager::{DepthConfig, PipelineConfig};

/// How the mesh buffers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshDraw {
    Triangles,
    Edges,
    Sprites,
}

/// Everything about a draw that needs a distinct render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshPipelineKey {
    pub draw: MeshDraw,
    pub cull_mode: Option<Face>,
    pub blend: bool,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl MeshPipelineKey {
    /// Derives the key from the mesh's draw mode and material.
    ///
    /// # Arguments
    ///
    /// * `mesh` - Mesh about to be drawn
    ///
    /// # Returns
    ///
    /// The key naming the pipeline to fetch or build. Culling only applies to
    /// filled triangles.
    pub fn for_mesh(mesh: &SceneMesh) -> Self {
        let material = &mesh.material;
        let flags = material.flags();
        let draw = match mesh.mode {
            DrawMode::Solid if material.wireframe() => MeshDraw::Edges,
            DrawMode::Solid => MeshDraw::Triangles,
            DrawMode::Line => MeshDraw::Edges,
            DrawMode::Point => MeshDraw::Sprites,
        };
        let cull_mode = match draw {
            MeshDraw::Triangles => material.side().cull_mode(),
            _ => None,
        };

        Self {
            draw,
            cull_mode,
            blend: flags.transparent,
            depth_test: flags.depth_test,
            depth_write: flags.depth_write,
        }
    }

    /// The transparent, double sided ground that only receives shadows.
    pub fn ground() -> Self {
        Self {
            draw: MeshDraw::Triangles,
            cull_mode: Side::Double.cull_mode(),
            blend: true,
            depth_test: true,
            depth_write: false,
        }
    }

    /// Cache name under which the pipeline manager stores this variant.
    pub fn name(&self) -> String {
        format!(
            "{:?}/{:?}/blend={}/test={}/write={}",
            self.draw, self.cull_mode, self.blend, self.depth_test, self.depth_write
        )
    }

    pub fn config(&self, format: TextureFormat, layouts: Vec<BindGroupLayout>) -> PipelineConfig {
        let (shader, topology, vertex_layout) = match self.draw {
            MeshDraw::Triangles => ("mesh", PrimitiveTopology::TriangleList, MeshVertex::desc()),
            MeshDraw::Edges => ("mesh", PrimitiveTopology::LineList, MeshVertex::desc()),
            MeshDraw::Sprites => ("points", PrimitiveTopology::TriangleList, MeshVertex::instance_desc()),
        };

        PipelineConfig::default()
            .with_label(&self.name())
            .with_shader(shader)
            .with_bind_group_layouts(layouts)
            .with_vertex_layouts(vec![vertex_layout])
            .with_primitive_topology(topology)
            .with_cull_mode(self.cull_mode)
            .with_depth(
                DepthConfig::new(TextureResource::DEPTH_FORMAT).with_flags(self.depth_test, self.depth_write),
            )
            .with_color_target(format, self.blend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::GeometrySettings;
    use crate::gfx::resources::material::{LineMaterial, Material, PointsMaterial, StandardMaterial};
    use std::sync::Arc;

    fn mesh(mode: DrawMode, material: Material) -> SceneMesh {
        SceneMesh::new(mode, Arc::new(GeometrySettings::default().build()), material)
    }

    #[test]
    fn test_solid_mesh_culls_by_side() {
        let mut standard = StandardMaterial::default();
        let key = MeshPipelineKey::for_mesh(&mesh(DrawMode::Solid, Material::Standard(standard.clone())));
        assert_eq!(key.draw, MeshDraw::Triangles);
        assert_eq!(key.cull_mode, Some(Face::Back));

        standard.side = Side::Double;
        let key = MeshPipelineKey::for_mesh(&mesh(DrawMode::Solid, Material::Standard(standard)));
        assert_eq!(key.cull_mode, None);
    }

    #[test]
    fn test_wireframe_draws_edges() {
        let standard = StandardMaterial {
            wireframe: true,
            ..StandardMaterial::default()
        };
        let key = MeshPipelineKey::for_mesh(&mesh(DrawMode::Solid, Material::Standard(standard)));
        assert_eq!(key.draw, MeshDraw::Edges);
        assert_eq!(key.cull_mode, None);
    }

    #[test]
    fn test_line_and_point_modes() {
        let key = MeshPipelineKey::for_mesh(&mesh(DrawMode::Line, Material::LineBasic(LineMaterial::default())));
        assert_eq!(key.draw, MeshDraw::Edges);

        let mut points = PointsMaterial::default();
        points.flags.transparent = true;
        points.flags.depth_write = false;
        let key = MeshPipelineKey::for_mesh(&mesh(DrawMode::Point, Material::Points(points)));
        assert_eq!(key.draw, MeshDraw::Sprites);
        assert!(key.blend);
        assert!(!key.depth_write);
        assert_ne!(key.name(), MeshPipelineKey::ground().name());
    }

    #[test]
    fn test_sprite_pipeline_reads_instances() {
        let key = MeshPipelineKey {
            draw: MeshDraw::Sprites,
            cull_mode: None,
            blend: false,
            depth_test: false,
            depth_write: true,
        };
        let config = key.config(TextureFormat::Bgra8Unorm, Vec::new());
        assert_eq!(config.shader, "points");
        assert_eq!(config.vertex_layouts[0].step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(config.depth.map(|d| d.compare), Some(wgpu::CompareFunction::Always));
    }
}
