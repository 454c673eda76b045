//! Orbit controls for the perspective camera
//!
//! Left-drag orbits around the target, right-drag pans, the wheel dollies.
//! Input only accumulates deltas; [`OrbitControls::update`] applies them by
//! re-deriving spherical coordinates from the camera's current position, so
//! positions written by the panel or by tweens are respected.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3, Zero};

use super::perspective_camera::PerspectiveCamera;
use crate::config::OrbitConfig;

const MIN_POLAR: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitGesture {
    Rotate,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vector3<f32>,
    /// Disabled while the transform gizmo is dragging
    pub enabled: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    gesture: Option<OrbitGesture>,
    last_cursor: Option<(f32, f32)>,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            target: Vector3::zero(),
            enabled: true,
            rotate_speed: config.rotate_speed,
            pan_speed: config.pan_speed,
            zoom_speed: config.zoom_speed,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            gesture: None,
            last_cursor: None,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
        }
    }

    /// Starts a gesture. Returns false when the controls are disabled.
    pub fn begin(&mut self, gesture: OrbitGesture, cursor: (f32, f32)) -> bool {
        if !self.enabled {
            return false;
        }
        self.gesture = Some(gesture);
        self.last_cursor = Some(cursor);
        true
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Feeds a cursor move.
    ///
    /// Rotation is scaled so a drag across the full viewport height turns
    /// the camera by a full circle at unit speed; panning moves the target
    /// in the view plane by the distance the cursor covers at the target
    /// depth.
    ///
    /// # Arguments
    /// * `cursor` - Cursor position in pixels
    /// * `viewport_height` - Viewport height in pixels
    /// * `camera` - Camera to move
    ///
    /// # Returns
    /// True if the camera changed
    pub fn cursor_moved(
        &mut self,
        cursor: (f32, f32),
        viewport_height: f32,
        camera: &mut PerspectiveCamera,
    ) -> bool {
        let (Some(gesture), Some(last)) = (self.gesture, self.last_cursor) else {
            return false;
        };
        self.last_cursor = Some(cursor);
        if !self.enabled {
            return false;
        }

        let dx = cursor.0 - last.0;
        let dy = cursor.1 - last.1;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let height = viewport_height.max(1.0);

        match gesture {
            OrbitGesture::Rotate => {
                self.delta_theta -= 2.0 * PI * dx * self.rotate_speed / height;
                self.delta_phi -= 2.0 * PI * dy * self.rotate_speed / height;
            }
            OrbitGesture::Pan => {
                let distance = (camera.position() - self.target).magnitude();
                let span = camera.half_height_at(distance);
                let rotation = camera.transform.rotation_matrix();
                let left = rotation.x * (-2.0 * dx * span * self.pan_speed / height);
                let up = rotation.y * (2.0 * dy * span * self.pan_speed / height);
                self.pan_offset += left + up;
            }
        }

        self.update(camera)
    }

    /// Ends the current gesture. Returns true if one was in progress.
    pub fn end(&mut self) -> bool {
        self.last_cursor = None;
        self.gesture.take().is_some()
    }

    /// Wheel input; positive `lines` scrolls away from the user and dollies in.
    pub fn scroll(&mut self, lines: f32, camera: &mut PerspectiveCamera) -> bool {
        if !self.enabled || lines == 0.0 {
            return false;
        }
        let step = 0.95f32.powf(self.zoom_speed);
        self.scale *= step.powf(lines);
        self.update(camera)
    }

    /// Applies pending deltas and aims the camera at the target.
    /// Returns true if the camera moved or turned.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.transform;

        let offset = camera.position() - self.target;
        let mut radius = offset.magnitude();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };

        theta += self.delta_theta;
        phi = (phi + self.delta_phi).clamp(MIN_POLAR, PI - MIN_POLAR);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.transform.position = self.target + offset;
        camera.transform.look_at(self.target);

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::zero();

        (camera.transform.position - before.position).magnitude2() > 1e-12
            || (camera.transform.rotation - before.rotation).magnitude2() > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn setup() -> (OrbitControls, PerspectiveCamera) {
        let mut camera = PerspectiveCamera::new(CameraConfig::default(), 1.0);
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        controls.update(&mut camera);
        (controls, camera)
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let (mut controls, mut camera) = setup();
        let distance = camera.position().magnitude();

        assert!(controls.begin(OrbitGesture::Rotate, (100.0, 100.0)));
        assert!(controls.cursor_moved((160.0, 120.0), 600.0, &mut camera));
        assert!(controls.end());

        assert!((camera.position().magnitude() - distance).abs() < 1e-4);
    }

    #[test]
    fn test_update_without_input_reports_no_change() {
        let (mut controls, mut camera) = setup();
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_update_reaims_moved_camera() {
        let (mut controls, mut camera) = setup();
        camera.transform.position = Vector3::new(-16.0, 0.6, 0.0);
        assert!(controls.update(&mut camera));
        let forward = -(camera.transform.rotation_matrix() * Vector3::unit_z());
        assert!((forward - (-camera.position()).normalize()).magnitude() < 1e-4);
    }

    #[test]
    fn test_disabled_controls_ignore_gestures() {
        let (mut controls, mut camera) = setup();
        controls.enabled = false;
        assert!(!controls.begin(OrbitGesture::Rotate, (0.0, 0.0)));
        assert!(!controls.scroll(3.0, &mut camera));
        assert!(!controls.end());
    }

    #[test]
    fn test_scroll_dollies() {
        let (mut controls, mut camera) = setup();
        let before = camera.position().magnitude();
        controls.scroll(1.0, &mut camera);
        assert!(camera.position().magnitude() < before);
        controls.scroll(-2.0, &mut camera);
        assert!(camera.position().magnitude() > before);
    }

    #[test]
    fn test_pan_moves_target() {
        let (mut controls, mut camera) = setup();
        controls.begin(OrbitGesture::Pan, (0.0, 0.0));
        controls.cursor_moved((50.0, 0.0), 600.0, &mut camera);
        // dragging right moves the scene right, so the target moves left
        assert!(controls.target.x < 0.0);
    }
}
