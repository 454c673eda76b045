use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

use super::camera_utils::{Camera, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;
use crate::gfx::scene::transform::Transform;
use crate::ui::reflect::reflect_fields;

/// Perspective camera placed by a full transform, so the panel can edit its
/// position, rotation and scale directly. Orbit controls re-aim it through
/// [`Transform::look_at`].
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub transform: Transform,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    defaults: CameraConfig,
}

reflect_fields!(PerspectiveCamera {
    fov => "fov": Drag(0.01),
    near => "near": Drag(0.01),
    far => "far": Drag(0.01),
});

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl PerspectiveCamera {
    /// Creates a camera at its configured placement.
    ///
    /// # Arguments
    ///
    /// * `defaults` - Lens and position restored by [`PerspectiveCamera::reset`]
    /// * `aspect` - Initial width over height
    pub fn new(defaults: CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            transform: Transform::default(),
            fov: defaults.fov,
            near: defaults.near,
            far: defaults.far,
            aspect,
            defaults,
        };
        camera.reset();
        camera
    }

    /// Restores the configured lens and placement, with no rotation and unit scale.
    pub fn reset(&mut self) {
        self.transform = Transform::from_position(Vector3::from(self.defaults.position));
        self.fov = self.defaults.fov;
        self.near = self.defaults.near;
        self.far = self.defaults.far;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position
    }

    /// Updates the aspect ratio, ignoring a minimized window.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Inverse of the camera's world transform.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.transform
            .matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }

    /// Projection with lens values clamped to what a perspective matrix accepts;
    /// the panel allows any value to be typed in.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let fov = self.fov.clamp(1.0, 179.0);
        let near = self.near.max(1e-4);
        let far = self.far.max(near + 1e-3);
        let aspect = if self.aspect > 0.0 { self.aspect } else { 1.0 };
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(fov), aspect, near, far)
    }

    /// Half-height of the view frustum at `distance`, used to scale panning
    /// and screen-constant gizmos.
    pub fn half_height_at(&self, distance: f32) -> f32 {
        distance * (self.fov.clamp(1.0, 179.0).to_radians() / 2.0).tan()
    }
}
