//! # Object Picking System
//!
//! Mouse ray-casting against the editable mesh and the point-light markers.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: convert the cursor position to a world-space ray from the camera
//! 2. **Ray-Object Intersection**: test the mesh bounds first, then its triangles,
//!    edges or points depending on the draw mode; light markers are spheres
//! 3. **Selection**: return the closest hit
//!
//! Lines and points are hit within a world-space threshold, since they
//! have no area.
//!
//! ## Usage
//!
//! ```rust
//! use primedit::gfx::picking::ObjectPicker;
//!
//! let picker = ObjectPicker::new();
//! assert_eq!(picker.line_threshold, 1.0);
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::{
    camera::{Camera, PerspectiveCamera},
    resources::material::Side,
    scene::{
        light::LIGHT_HELPER_RADIUS,
        mesh::{DrawMode, MeshId, SceneMesh},
        Scene,
    },
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// The ray in another space; the direction is renormalized.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let origin = matrix * self.origin.extend(1.0);
        let direction = matrix * self.direction.extend(0.0);
        Ray::new(origin.truncate() / origin.w, direction.truncate())
    }

    /// Parameter of the point on the ray closest to `point`, never negative.
    pub fn closest_param(&self, point: Vector3<f32>) -> f32 {
        (point - self.origin).dot(self.direction).max(0.0)
    }

    /// Squared distance from `point` to the ray, measured behind the origin
    /// as the distance to the origin itself.
    pub fn distance_sq_to_point(&self, point: Vector3<f32>) -> f32 {
        (self.point_at(self.closest_param(point)) - point).magnitude2()
    }

    /// Squared distance between the ray and the segment `a..b`, with the
    /// ray parameter of the closest approach and the closest point on the
    /// segment.
    pub fn distance_sq_to_segment(&self, a: Vector3<f32>, b: Vector3<f32>) -> (f32, f32, Vector3<f32>) {
        let edge = b - a;
        let w = self.origin - a;
        let c = edge.magnitude2();
        if c < 1e-12 {
            let s = self.closest_param(a);
            return ((self.point_at(s) - a).magnitude2(), s, a);
        }

        let bd = self.direction.dot(edge);
        let dd = self.direction.dot(w);
        let f = edge.dot(w);
        let denom = c - bd * bd;

        let mut s = if denom > 1e-12 {
            ((bd * f - c * dd) / denom).max(0.0)
        } else {
            0.0
        };
        let mut t = (f + s * bd) / c;
        if t < 0.0 {
            t = 0.0;
            s = (-dd).max(0.0);
        } else if t > 1.0 {
            t = 1.0;
            s = (bd - dd).max(0.0);
        }

        let on_segment = a + edge * t;
        ((self.point_at(s) - on_segment).magnitude2(), s, on_segment)
    }

    /// Ray-triangle test (Moller-Trumbore). `side` selects which facing is
    /// hit; counter-clockwise triangles face front.
    pub fn intersect_triangle(
        &self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
        side: Side,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let facing = self.direction.dot(edge1.cross(edge2));
        match side {
            Side::Front if facing >= 0.0 => return None,
            Side::Back if facing <= 0.0 => return None,
            _ => {}
        }

        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Ray-sphere test.
    ///
    /// # Arguments
    /// * `center` - Sphere center in the ray's space
    /// * `radius` - Sphere radius
    ///
    /// # Returns
    /// Distance to the nearest hit in front of the origin; the far hit when
    /// the origin is inside the sphere
    pub fn intersect_sphere(&self, center: Vector3<f32>, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let tca = to_center.dot(self.direction);
        let d2 = to_center.magnitude2() - tca * tca;
        let r2 = radius * radius;
        if d2 > r2 {
            return None;
        }
        let thc = (r2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;
        if t1 < 0.0 {
            None
        } else if t0 < 0.0 {
            Some(t1)
        } else {
            Some(t0)
        }
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        Self::new(min, max)
    }

    /// Center point of the box
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn expand(&self, margin: f32) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self::new(self.min - m, self.max + m)
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed_corners: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| {
                let transformed = matrix * Vector4::new(corner.x, corner.y, corner.z, 1.0);
                [
                    transformed.x / transformed.w,
                    transformed.y / transformed.w,
                    transformed.z / transformed.w,
                ]
            })
            .collect();

        Self::from_vertices(&transformed_corners)
    }
}

/// What a pick landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Mesh,
    /// Marker of the point light with this index
    PointLight(usize),
}

/// Result of an object picking operation
#[derive(Debug, Clone, Copy)]
pub struct PickResult {
    pub target: PickTarget,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

struct MeshCache {
    id: MeshId,
    revision: u64,
    bounds: AABB,
    edges: Option<Vec<u32>>,
}

/// Object picker for 3D mouse selection
pub struct ObjectPicker {
    /// World-space hit distance for line segments
    pub line_threshold: f32,
    /// World-space hit distance for points
    pub point_threshold: f32,
    /// Bounds and edges of the last picked geometry revision
    cache: Option<MeshCache>,
}

impl ObjectPicker {
    /// Create a new object picker
    pub fn new() -> Self {
        Self {
            line_threshold: 1.0,
            point_threshold: 1.0,
            cache: None,
        }
    }

    /// Convert screen coordinates to a world-space ray starting at the camera
    ///
    /// # Arguments
    /// * `screen_pos` - Cursor position in pixels, origin top left
    /// * `screen_size` - Viewport size in pixels
    /// * `camera` - Camera the scene is viewed through
    ///
    /// # Returns
    /// A normalized ray from the camera position through the cursor
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &PerspectiveCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height; // Flip Y axis

        let inv_view_proj = camera
            .build_view_projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);

        // Any depth inside the frustum gives the same direction
        let world = inv_view_proj * Vector4::new(ndc_x, ndc_y, 0.5, 1.0);
        let target = world.truncate() / world.w;

        let origin = camera.position();
        Ray::new(origin, target - origin)
    }

    /// Pick the closest pickable entity under the cursor
    pub fn pick(&mut self, screen_pos: (f32, f32), screen_size: (f32, f32), scene: &Scene) -> Option<PickResult> {
        let ray = self.screen_to_ray(screen_pos, screen_size, &scene.camera);
        self.pick_ray(&ray, scene)
    }

    /// Pick the closest entity along a world-space ray.
    ///
    /// Tests the mesh as drawn (see [`ObjectPicker::intersect_mesh`]) and the
    /// markers of every point light whose helper is visible. Hidden meshes
    /// and hidden markers cannot be picked.
    ///
    /// # Arguments
    /// * `ray` - World-space ray, usually from [`ObjectPicker::screen_to_ray`]
    /// * `scene` - Scene to pick from
    ///
    /// # Returns
    /// The nearest hit, or None if nothing pickable lies along the ray
    pub fn pick_ray(&mut self, ray: &Ray, scene: &Scene) -> Option<PickResult> {
        let mut closest_result = self.intersect_mesh(ray, &scene.mesh);

        for (i, light) in scene.point_lights.iter().enumerate() {
            if !light.helper_visible {
                continue;
            }
            if let Some(distance) = ray.intersect_sphere(light.position, LIGHT_HELPER_RADIUS) {
                // Keep the closest intersection
                if closest_result
                    .as_ref()
                    .map_or(true, |result| distance < result.distance)
                {
                    closest_result = Some(PickResult {
                        target: PickTarget::PointLight(i),
                        distance,
                        intersection_point: ray.point_at(distance),
                    });
                }
            }
        }

        closest_result
    }

    /// Intersects the mesh the way it is drawn: triangles in solid mode,
    /// edges in line mode, vertices in point mode.
    ///
    /// The ray is taken into the mesh's local space. The cached bounds,
    /// grown by the line or point threshold, reject misses before any
    /// per-primitive test. Triangle tests honor the material side.
    ///
    /// # Returns
    /// The hit nearest to the ray origin, in world space
    pub fn intersect_mesh(&mut self, ray: &Ray, mesh: &SceneMesh) -> Option<PickResult> {
        if !mesh.is_shown() || mesh.geometry.is_empty() {
            return None;
        }

        let model = mesh.transform.matrix();
        let inverse = model.invert()?;
        let local_ray = ray.transform(&inverse);

        // Thresholds are world-space; scale them into the mesh's space
        let s = mesh.transform.scale;
        let mean_scale = ((s.x.abs() + s.y.abs() + s.z.abs()) / 3.0).max(1e-6);
        let local_threshold = match mesh.mode {
            DrawMode::Solid => 0.0,
            DrawMode::Line => self.line_threshold / mean_scale,
            DrawMode::Point => self.point_threshold / mean_scale,
        };

        let cache = self.cache_for(mesh);
        cache.bounds.expand(local_threshold).intersect_ray(&local_ray)?;

        let geometry = &mesh.geometry;
        let vertex = |i: u32| Vector3::from(geometry.vertices[i as usize]);

        let mut best: Option<Vector3<f32>> = None;
        let mut best_distance = f32::INFINITY;
        let mut consider = |local_point: Vector3<f32>| {
            let world = model * local_point.extend(1.0);
            let world = world.truncate() / world.w;
            let distance = (world - ray.origin).magnitude();
            if distance < best_distance {
                best_distance = distance;
                best = Some(world);
            }
        };

        match mesh.mode {
            DrawMode::Solid => {
                let side = mesh.material.side();
                for triangle in geometry.indices.chunks_exact(3) {
                    if let Some(t) =
                        local_ray.intersect_triangle(vertex(triangle[0]), vertex(triangle[1]), vertex(triangle[2]), side)
                    {
                        consider(local_ray.point_at(t));
                    }
                }
            }
            DrawMode::Line => {
                let threshold_sq = local_threshold * local_threshold;
                let edges = cache.edges.get_or_insert_with(|| geometry.edges());
                for pair in edges.chunks_exact(2) {
                    let (dist_sq, s, _) = local_ray.distance_sq_to_segment(vertex(pair[0]), vertex(pair[1]));
                    if dist_sq <= threshold_sq {
                        consider(local_ray.point_at(s));
                    }
                }
            }
            DrawMode::Point => {
                let threshold_sq = local_threshold * local_threshold;
                for position in &geometry.vertices {
                    let p = Vector3::from(*position);
                    if local_ray.distance_sq_to_point(p) <= threshold_sq {
                        consider(local_ray.point_at(local_ray.closest_param(p)));
                    }
                }
            }
        }

        best.map(|intersection_point| PickResult {
            target: PickTarget::Mesh,
            distance: best_distance,
            intersection_point,
        })
    }

    fn cache_for(&mut self, mesh: &SceneMesh) -> &mut MeshCache {
        let stale = self
            .cache
            .as_ref()
            .map_or(true, |c| c.id != mesh.id || c.revision != mesh.geometry_revision);
        if stale {
            self.cache = None;
        }
        self.cache.get_or_insert_with(|| MeshCache {
            id: mesh.id,
            revision: mesh.geometry_revision,
            bounds: mesh.geometry.bounds(),
            edges: None,
        })
    }

    /// Invalidate cached bounds (call when geometry changes in place)
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }
}

impl Default for ObjectPicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::geometry::{generate_sphere, SphereParams};
    use crate::gfx::resources::material::{Material, PointsMaterial};
    use rand::Rng;

    fn scene() -> Scene {
        let geometry = generate_sphere(&SphereParams::default());
        let mut scene = Scene::new(&EditorConfig::default(), 1.0, geometry, Material::default());
        scene.camera.transform.look_at(Vector3::zero());
        scene
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray).is_some());

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_triangle_facing() {
        // counter-clockwise seen from +Z
        let a = Vector3::new(-1.0, -1.0, 0.0);
        let b = Vector3::new(1.0, -1.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);
        let from_front = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let from_back = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

        assert_eq!(from_front.intersect_triangle(a, b, c, Side::Front), Some(5.0));
        assert_eq!(from_back.intersect_triangle(a, b, c, Side::Front), None);
        assert_eq!(from_back.intersect_triangle(a, b, c, Side::Back), Some(5.0));
        assert!(from_back.intersect_triangle(a, b, c, Side::Double).is_some());
    }

    #[test]
    fn test_segment_distance() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let (d2, s, point) =
            ray.distance_sq_to_segment(Vector3::new(-1.0, 0.5, 0.0), Vector3::new(1.0, 0.5, 0.0));
        assert!((d2 - 0.25).abs() < 1e-5);
        assert!((s - 5.0).abs() < 1e-5);
        assert!((point - Vector3::new(0.0, 0.5, 0.0)).magnitude() < 1e-5);

        // closest approach clamps to the segment end
        let (d2, _, point) =
            ray.distance_sq_to_segment(Vector3::new(2.0, 0.0, 0.0), Vector3::new(3.0, 0.0, 0.0));
        assert!((d2 - 4.0).abs() < 1e-5);
        assert_eq!(point, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_random_rays_at_sphere_center_hit_surface() {
        let mut rng = rand::rng();
        let center = Vector3::new(1.0, 2.0, 3.0);
        for _ in 0..100 {
            let offset = Vector3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            );
            if offset.magnitude() < 1.0 {
                continue;
            }
            let ray = Ray::new(center + offset, -offset);
            let t = ray.intersect_sphere(center, 0.5).unwrap();
            assert!((t - (offset.magnitude() - 0.5)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_center_click_picks_mesh() {
        let mut scene = scene();
        let mut picker = ObjectPicker::new();
        let hit = picker.pick((400.0, 400.0), (800.0, 800.0), &scene).unwrap();
        assert_eq!(hit.target, PickTarget::Mesh);
        // the sphere surface faces the camera at distance |eye| - 1
        let expected = scene.camera.position().magnitude() - 1.0;
        assert!((hit.distance - expected).abs() < 0.02);

        scene.mesh.visible = false;
        assert!(picker.pick((400.0, 400.0), (800.0, 800.0), &scene).is_none());
    }

    #[test]
    fn test_corner_click_misses() {
        let scene = scene();
        let mut picker = ObjectPicker::new();
        assert!(picker.pick((2.0, 2.0), (800.0, 800.0), &scene).is_none());
    }

    #[test]
    fn test_light_marker_is_picked() {
        let mut scene = scene();
        let light = scene.point_lights[0].position;
        scene.camera.transform.look_at(light);
        let mut picker = ObjectPicker::new();
        let hit = picker.pick((400.0, 400.0), (800.0, 800.0), &scene).unwrap();
        assert_eq!(hit.target, PickTarget::PointLight(0));

        scene.point_lights[0].helper_visible = false;
        assert!(picker.pick((400.0, 400.0), (800.0, 800.0), &scene).is_none());
    }

    #[test]
    fn test_points_hit_within_threshold() {
        let mut scene = scene();
        scene.replace_mesh(DrawMode::Point, Material::Points(PointsMaterial::default()));
        let mut picker = ObjectPicker::new();
        let near_miss = Ray::new(Vector3::new(1.5, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(picker.intersect_mesh(&near_miss, &scene.mesh).is_some());

        picker.point_threshold = 0.1;
        assert!(picker.intersect_mesh(&near_miss, &scene.mesh).is_none());
    }
}
