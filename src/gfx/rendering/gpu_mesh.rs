//! GPU buffers for the editable mesh, the ground and line batches

use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;
use crate::gfx::scene::{LineVertex, MeshId, SceneMesh};

/// Vertex and index buffers for one geometry. Solid drawing uses the
/// triangle indices, line drawing and wireframes the unique edges, and
/// points draw every vertex as an instanced sprite.
pub struct GpuMesh {
    key: Option<(MeshId, u64)>,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub triangle_indices: wgpu::Buffer,
    pub triangle_index_count: u32,
    pub edge_indices: wgpu::Buffer,
    pub edge_index_count: u32,
}

fn index_buffer(device: &wgpu::Device, label: &str, indices: &[u32]) -> wgpu::Buffer {
    // zero-sized buffers are not allowed
    let contents: &[u32] = if indices.is_empty() { &[0] } else { indices };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::INDEX,
    })
}

impl GpuMesh {
    /// Uploads vertices plus triangle and edge index buffers.
    ///
    /// # Arguments
    ///
    /// * `device` - Device that owns the buffers
    /// * `geometry` - Source geometry; edges are derived from its triangles
    /// * `label` - Prefix for the buffer labels
    pub fn new(device: &wgpu::Device, geometry: &GeometryData, label: &str) -> Self {
        let vertices = geometry.to_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let edges = geometry.edges();

        Self {
            key: None,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            triangle_indices: index_buffer(device, &format!("{label} Triangle Indices"), &geometry.indices),
            triangle_index_count: geometry.indices.len() as u32,
            edge_indices: index_buffer(device, &format!("{label} Edge Indices"), &edges),
            edge_index_count: edges.len() as u32,
        }
    }

    /// Uploads the mesh's geometry and tags the buffers with [`buffer_key`].
    pub fn for_mesh(device: &wgpu::Device, mesh: &SceneMesh) -> Self {
        Self {
            key: Some(buffer_key(mesh)),
            ..Self::new(device, &mesh.geometry, "Mesh")
        }
    }

    /// True when these buffers hold the mesh's current geometry.
    pub fn matches(&self, mesh: &SceneMesh) -> bool {
        self.key == Some(buffer_key(mesh))
    }
}

/// Buffers are keyed by mesh id and geometry revision.
pub fn buffer_key(mesh: &SceneMesh) -> (MeshId, u64) {
    (mesh.id, mesh.geometry_revision)
}

/// A batch of colored line segments.
pub struct GpuLines {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl GpuLines {
    /// Uploads a line list.
    ///
    /// # Returns
    ///
    /// `None` for an empty list, which has nothing to draw
    pub fn new(device: &wgpu::Device, label: &str, lines: &[LineVertex]) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(lines),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Some(Self {
            vertex_buffer,
            vertex_count: lines.len() as u32,
        })
    }
}

/// Vertices per point sprite quad
pub const SPRITE_VERTICES: u32 = 6;

/// Draw calls for [`GpuMesh`] and [`GpuLines`]
pub trait RenderPassExt {
    fn draw_triangles(&mut self, mesh: &GpuMesh);
    fn draw_edges(&mut self, mesh: &GpuMesh);
    fn draw_point_sprites(&mut self, mesh: &GpuMesh);
    fn draw_lines(&mut self, lines: &GpuLines);
}

impl RenderPassExt for wgpu::RenderPass<'_> {
    fn draw_triangles(&mut self, mesh: &GpuMesh) {
        if mesh.triangle_index_count == 0 {
            return;
        }
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.triangle_indices.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.triangle_index_count, 0, 0..1);
    }

    fn draw_edges(&mut self, mesh: &GpuMesh) {
        if mesh.edge_index_count == 0 {
            return;
        }
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.edge_indices.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.edge_index_count, 0, 0..1);
    }

    fn draw_point_sprites(&mut self, mesh: &GpuMesh) {
        if mesh.vertex_count == 0 {
            return;
        }
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.draw(0..SPRITE_VERTICES, 0..mesh.vertex_count);
    }

    fn draw_lines(&mut self, lines: &GpuLines) {
        self.set_vertex_buffer(0, lines.vertex_buffer.slice(..));
        self.draw(0..lines.vertex_count, 0..1);
    }
}
