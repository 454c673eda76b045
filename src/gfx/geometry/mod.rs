//! # Procedural Geometry Generation
//!
//! Every primitive the editor offers is generated here from its parameter
//! record; nothing is loaded from model files.
//!
//! ## Supported Primitives
//!
//! - **Sphere**: partial spheres via phi/theta start and length
//! - **Cylinder / Cone**: independent top and bottom radii, optional caps, partial sweeps
//! - **Torus**: partial arcs
//! - **Box**: per-axis subdivisions
//! - **Teapot**: lathed body, lid and bottom with swept handle and spout
//! - **Plane**: the ground plane under the mesh
//!
//! ## Usage
//!
//! ```rust
//! use primedit::gfx::geometry::{GeometryKind, GeometrySettings};
//!
//! let mut settings = GeometrySettings::default();
//! settings.kind = GeometryKind::Sphere;
//! let sphere = settings.build();
//! assert!(sphere.triangle_count() > 0);
//! ```

pub mod params;
pub mod primitives;
pub mod teapot;

use std::collections::HashSet;

pub use params::*;
pub use primitives::*;

use crate::gfx::{picking::AABB, scene::vertex::MeshVertex};

/// Color read for vertices without one, the same as an unbound vertex
/// attribute.
pub const UNSET_VERTEX_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex linear colors; empty when the geometry carries none
    pub colors: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        index
    }

    /// Appends another geometry, offsetting its indices.
    pub fn merge(&mut self, other: GeometryData) {
        let offset = self.vertices.len() as u32;
        if !self.colors.is_empty() || !other.colors.is_empty() {
            let total = self.vertices.len() + other.vertices.len();
            self.colors.resize(self.vertices.len(), UNSET_VERTEX_COLOR);
            self.colors.extend(other.colors);
            self.colors.resize(total, UNSET_VERTEX_COLOR);
        }
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.tex_coords.extend(other.tex_coords);
        self.indices.extend(other.indices.into_iter().map(|i| i + offset));
    }

    /// Object-space bounds, used by the box helper and picking.
    pub fn bounds(&self) -> AABB {
        AABB::from_vertices(&self.vertices)
    }

    /// Unique triangle edges as index pairs, for line mode and wireframe.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = HashSet::with_capacity(self.indices.len());
        let mut edges = Vec::with_capacity(self.indices.len() * 2);

        for triangle in self.indices.chunks_exact(3) {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                if seen.insert((a.min(b), a.max(b))) {
                    edges.push(a);
                    edges.push(b);
                }
            }
        }

        edges
    }

    /// Recomputes smooth normals by averaging the face normals around each vertex.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);

            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

            // area weighted
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            for vertex_idx in [i0, i1, i2] {
                for axis in 0..3 {
                    normals[vertex_idx][axis] += face_normal[axis];
                }
            }
        }

        for normal in &mut normals {
            let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            if length > 1e-12 {
                for c in normal.iter_mut() {
                    *c /= length;
                }
            } else {
                *normal = [0.0, 1.0, 0.0];
            }
        }

        self.normals = normals;
    }

    /// Interleaves positions, normals and texture coordinates for upload.
    pub fn to_vertices(&self) -> Vec<MeshVertex> {
        (0..self.vertices.len())
            .map(|i| MeshVertex {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                color: self.colors.get(i).copied().unwrap_or(UNSET_VERTEX_COLOR),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GeometryData {
        let mut data = GeometryData::new();
        data.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]);
        data.push_vertex([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0]);
        data.push_vertex([1.0, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0]);
        data.push_vertex([0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0]);
        data.indices = vec![0, 1, 2, 0, 2, 3];
        data
    }

    #[test]
    fn test_edges_are_unique() {
        // two triangles sharing the diagonal: 5 distinct edges
        let edges = quad().edges();
        assert_eq!(edges.len(), 10);
    }

    #[test]
    fn test_vertex_normals_face_the_viewer() {
        let mut data = quad();
        data.compute_vertex_normals();
        for n in &data.normals {
            assert!((n[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = quad();
        a.merge(quad());
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(&a.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_merge_pads_missing_colors() {
        let mut colored = quad();
        colored.colors = vec![[1.0, 0.0, 0.0]; 4];
        let mut a = quad();
        a.merge(colored);
        assert_eq!(a.colors.len(), 8);
        assert_eq!(a.colors[0], UNSET_VERTEX_COLOR);
        assert_eq!(a.colors[4], [1.0, 0.0, 0.0]);

        let vertices = a.to_vertices();
        assert_eq!(vertices[3].color, UNSET_VERTEX_COLOR);
        assert_eq!(vertices[7].color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bounds() {
        let bounds = quad().bounds();
        assert_eq!(bounds.max.x, 1.0);
        assert_eq!(bounds.min.y, 0.0);
    }
}
