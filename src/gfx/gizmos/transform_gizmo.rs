//! # Transform Gizmo
//!
//! On-screen handles that move, turn and scale whatever the last pick
//! attached them to. Translate and rotate work along world axes, scale along
//! the object's own axes. Point lights only accept translation.
//!
//! Handles keep a constant size on screen: their length is derived from the
//! camera distance and field of view every time they are hit-tested or drawn.

use cgmath::{InnerSpace, Matrix3, Rad, Vector3};

use crate::gfx::{
    camera::PerspectiveCamera,
    color::Rgb,
    picking::{PickTarget, Ray},
    scene::{
        helpers::line_color,
        transform::{euler_from_rotation_matrix, Transform},
        vertex::LineVertex,
    },
};

const RING_SEGMENTS: usize = 48;
const RING_RADIUS: f32 = 0.5;
/// Pick tolerance around a handle, relative to the handle length
const HANDLE_TOLERANCE: f32 = 0.12;
const HIGHLIGHT: Rgb = Rgb(0xffff00);

/// What dragging a handle does to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// One of the three handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn unit(self) -> Vector3<f32> {
        match self {
            GizmoAxis::X => Vector3::unit_x(),
            GizmoAxis::Y => Vector3::unit_y(),
            GizmoAxis::Z => Vector3::unit_z(),
        }
    }

    /// Red, green and blue for X, Y and Z
    pub fn color(self) -> Rgb {
        match self {
            GizmoAxis::X => Rgb(0xff0000),
            GizmoAxis::Y => Rgb(0x00ff00),
            GizmoAxis::Z => Rgb(0x0000ff),
        }
    }
}

/// Where the handles sit for one frame.
#[derive(Debug, Clone, Copy)]
struct HandleFrame {
    origin: Vector3<f32>,
    axes: [Vector3<f32>; 3],
    size: f32,
}

impl HandleFrame {
    fn axis(&self, axis: GizmoAxis) -> Vector3<f32> {
        self.axes[axis.index()]
    }

    fn ring_point(&self, axis: GizmoAxis, i: usize) -> Vector3<f32> {
        let (u, v) = match axis {
            GizmoAxis::X => (self.axes[1], self.axes[2]),
            GizmoAxis::Y => (self.axes[2], self.axes[0]),
            GizmoAxis::Z => (self.axes[0], self.axes[1]),
        };
        let angle = i as f32 / RING_SEGMENTS as f32 * std::f32::consts::TAU;
        self.origin + (u * angle.cos() + v * angle.sin()) * (RING_RADIUS * self.size)
    }
}

#[derive(Debug, Clone, Copy)]
struct GizmoDrag {
    axis: GizmoAxis,
    mode: GizmoMode,
    axis_dir: Vector3<f32>,
    plane_normal: Vector3<f32>,
    origin: Vector3<f32>,
    start_point: Vector3<f32>,
    start: Transform,
}

/// Transform gizmo state: the attached target, the hovered handle and the
/// drag in progress.
///
/// The gizmo does not own the transform it edits. Callers pass the
/// target's current [`Transform`] to every call and receive edits through
/// [`TransformGizmo::drag`].
#[derive(Debug, Clone, Default)]
pub struct TransformGizmo {
    pub mode: GizmoMode,
    target: Option<PickTarget>,
    hovered: Option<GizmoAxis>,
    drag: Option<GizmoDrag>,
}

fn intersect_plane(ray: &Ray, origin: Vector3<f32>, normal: Vector3<f32>) -> Option<Vector3<f32>> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = normal.dot(origin - ray.origin) / denom;
    (t >= 0.0).then(|| ray.point_at(t))
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the handles to `target`. Switching targets cancels any drag.
    pub fn attach(&mut self, target: PickTarget) {
        if self.target != Some(target) {
            self.drag = None;
            self.hovered = None;
        }
        self.target = Some(target);
    }

    /// Hides the handles and cancels any drag.
    pub fn detach(&mut self) {
        self.target = None;
        self.drag = None;
        self.hovered = None;
    }

    pub fn target(&self) -> Option<PickTarget> {
        self.target
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The mode the handles work in for the current target.
    pub fn effective_mode(&self) -> GizmoMode {
        match self.target {
            Some(PickTarget::PointLight(_)) => GizmoMode::Translate,
            _ => self.mode,
        }
    }

    /// World length of a handle at `position`, constant on screen.
    pub fn handle_size(camera: &PerspectiveCamera, position: Vector3<f32>) -> f32 {
        let distance = (position - camera.position()).magnitude();
        let factor = (1.9 * (camera.fov.clamp(1.0, 179.0).to_radians() / 2.0).tan()).min(7.0);
        (distance * factor / 4.0).max(1e-4)
    }

    fn frame(&self, camera: &PerspectiveCamera, transform: &Transform) -> HandleFrame {
        let axes = if self.effective_mode() == GizmoMode::Scale {
            let r = transform.rotation_matrix();
            [r.x, r.y, r.z]
        } else {
            [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()]
        };
        HandleFrame {
            origin: transform.position,
            axes,
            size: Self::handle_size(camera, transform.position),
        }
    }

    /// The handle under `ray`, if any.
    pub fn hit_axis(&self, ray: &Ray, camera: &PerspectiveCamera, transform: &Transform) -> Option<GizmoAxis> {
        self.target?;
        let frame = self.frame(camera, transform);
        let tolerance = (HANDLE_TOLERANCE * frame.size).powi(2);

        let mut best: Option<(GizmoAxis, f32, f32)> = None;
        for axis in GizmoAxis::ALL {
            let candidate = match self.effective_mode() {
                GizmoMode::Translate | GizmoMode::Scale => {
                    let end = frame.origin + frame.axis(axis) * frame.size;
                    let (d2, s, _) = ray.distance_sq_to_segment(frame.origin, end);
                    (d2 <= tolerance).then_some((d2, s))
                }
                GizmoMode::Rotate => (0..RING_SEGMENTS)
                    .map(|i| {
                        ray.distance_sq_to_segment(frame.ring_point(axis, i), frame.ring_point(axis, i + 1))
                    })
                    .filter(|(d2, _, _)| *d2 <= tolerance)
                    .map(|(d2, s, _)| (d2, s))
                    .min_by(|a, b| a.1.total_cmp(&b.1)),
            };
            if let Some((d2, s)) = candidate {
                // nearest along the ray wins, ties broken by closeness
                let better = best.map_or(true, |(_, bd2, bs)| s < bs - 1e-4 || ((s - bs).abs() <= 1e-4 && d2 < bd2));
                if better {
                    best = Some((axis, d2, s));
                }
            }
        }
        best.map(|(axis, _, _)| axis)
    }

    /// Updates the highlighted handle. Returns true if it changed.
    pub fn hover(&mut self, ray: &Ray, camera: &PerspectiveCamera, transform: &Transform) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let hovered = self.hit_axis(ray, camera, transform);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    /// Starts a drag if `ray` grabs a handle.
    ///
    /// The drag works on a plane through the gizmo origin: the rotation
    /// plane of the axis for rotate, and otherwise the plane containing the
    /// axis that faces the viewer most. The target transform at this moment
    /// is the reference for every later [`TransformGizmo::drag`].
    ///
    /// # Arguments
    /// * `ray` - World-space pointer ray
    /// * `camera` - Camera the handles are sized for
    /// * `transform` - Current transform of the attached target
    ///
    /// # Returns
    /// True if a drag started
    pub fn begin_drag(&mut self, ray: &Ray, camera: &PerspectiveCamera, transform: &Transform) -> bool {
        let Some(axis) = self.hit_axis(ray, camera, transform) else {
            return false;
        };
        let frame = self.frame(camera, transform);
        let axis_dir = frame.axis(axis);
        let mode = self.effective_mode();

        let plane_normal = match mode {
            GizmoMode::Rotate => axis_dir,
            GizmoMode::Translate | GizmoMode::Scale => {
                // plane through the axis, turned toward the viewer
                let to_eye = ray.direction;
                let normal = axis_dir.cross(to_eye.cross(axis_dir));
                if normal.magnitude2() < 1e-10 {
                    return false;
                }
                normal.normalize()
            }
        };
        let Some(start_point) = intersect_plane(ray, frame.origin, plane_normal) else {
            return false;
        };

        self.hovered = Some(axis);
        self.drag = Some(GizmoDrag {
            axis,
            mode,
            axis_dir,
            plane_normal,
            origin: frame.origin,
            start_point,
            start: *transform,
        });
        true
    }

    /// Applies the drag for the current pointer ray. Returns true if the
    /// transform changed.
    pub fn drag(&mut self, ray: &Ray, transform: &mut Transform) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(point) = intersect_plane(ray, drag.origin, drag.plane_normal) else {
            return false;
        };
        let before = *transform;

        match drag.mode {
            GizmoMode::Translate => {
                let along = (point - drag.start_point).dot(drag.axis_dir);
                transform.position = drag.start.position + drag.axis_dir * along;
            }
            GizmoMode::Rotate => {
                let from = drag.start_point - drag.origin;
                let to = point - drag.origin;
                if from.magnitude2() < 1e-12 || to.magnitude2() < 1e-12 {
                    return false;
                }
                let angle = from.cross(to).dot(drag.axis_dir).atan2(from.dot(to));
                let turn = Matrix3::from_axis_angle(drag.axis_dir, Rad(angle));
                transform.rotation = euler_from_rotation_matrix(&(turn * drag.start.rotation_matrix()));
            }
            GizmoMode::Scale => {
                let from = (drag.start_point - drag.origin).dot(drag.axis_dir);
                let to = (point - drag.origin).dot(drag.axis_dir);
                if from.abs() < 1e-6 {
                    return false;
                }
                let ratio = to / from;
                let i = drag.axis.index();
                transform.scale[i] = drag.start.scale[i] * ratio;
            }
        }

        *transform != before
    }

    /// Ends a drag. Returns true if one was in progress.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Handle lines for the attached target, drawn over the scene.
    pub fn lines(&self, camera: &PerspectiveCamera, transform: &Transform) -> Vec<LineVertex> {
        if self.target.is_none() {
            return Vec::new();
        }
        let frame = self.frame(camera, transform);
        let active = self.drag.map(|d| d.axis).or(self.hovered);
        let mut lines = Vec::new();

        for axis in GizmoAxis::ALL {
            let rgb = if active == Some(axis) { HIGHLIGHT } else { axis.color() };
            let color = line_color(rgb, 1.0);
            let mut segment = |a: Vector3<f32>, b: Vector3<f32>| {
                lines.push(LineVertex::new(a.into(), color));
                lines.push(LineVertex::new(b.into(), color));
            };
            let dir = frame.axis(axis);

            match self.effective_mode() {
                GizmoMode::Rotate => {
                    for i in 0..RING_SEGMENTS {
                        segment(frame.ring_point(axis, i), frame.ring_point(axis, i + 1));
                    }
                }
                mode => {
                    let end = frame.origin + dir * frame.size;
                    segment(frame.origin, end);
                    // arrow heads for translate, boxes for scale
                    let tip = frame.size * 0.08;
                    let side_a = frame.axis(GizmoAxis::ALL[(axis.index() + 1) % 3]) * tip;
                    let side_b = frame.axis(GizmoAxis::ALL[(axis.index() + 2) % 3]) * tip;
                    if mode == GizmoMode::Translate {
                        let base = end - dir * (tip * 2.0);
                        for side in [side_a, -side_a, side_b, -side_b] {
                            segment(end, base + side);
                        }
                    } else {
                        let corners = [side_a + side_b, side_a - side_b, -side_a - side_b, -side_a + side_b];
                        for i in 0..4 {
                            segment(end + corners[i], end + corners[(i + 1) % 4]);
                        }
                    }
                }
            }
        }
        lines
    }
}
