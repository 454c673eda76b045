//! Pointer and keyboard handling: picking, gizmo drags, orbiting and the
//! transform toolbar.

use log::debug;

use crate::gfx::camera::OrbitGesture;
use crate::gfx::color::Rgb;
use crate::gfx::gizmos::GizmoMode;
use crate::gfx::picking::{PickTarget, Ray};
use crate::gfx::scene::Transform;

use super::Editor;

pub const NAV_ACTIVE_COLOR: Rgb = Rgb(0x35ffff);
pub const NAV_INACTIVE_COLOR: Rgb = Rgb(0xd1d1d1);

/// Where the pointer interaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No button held, gizmo attached
    Idle,
    /// Button held after a pick; the orbit controls own the drag
    HoveringPick,
    /// A gizmo handle is being dragged
    DraggingGizmo,
    /// No button held, gizmo detached
    Detached,
}

/// Mouse buttons the editor reacts to: primary picks and orbits, secondary
/// pans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Toolbar entries, also bound to `w`, `e`, `r` and `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Translate,
    Rotate,
    Scale,
    Detach,
}

impl NavAction {
    pub const ALL: [NavAction; 4] = [
        NavAction::Translate,
        NavAction::Rotate,
        NavAction::Scale,
        NavAction::Detach,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NavAction::Translate => "translate",
            NavAction::Rotate => "rotate",
            NavAction::Scale => "scale",
            NavAction::Detach => "detach",
        }
    }

    /// Maps a lowercase key to its toolbar action
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(NavAction::Translate),
            "e" => Some(NavAction::Rotate),
            "r" => Some(NavAction::Scale),
            "t" => Some(NavAction::Detach),
            _ => None,
        }
    }
}

impl Editor {
    /// The highlighted toolbar action
    pub fn nav(&self) -> NavAction {
        self.nav
    }

    /// Toolbar highlight for `action`.
    pub fn nav_color(&self, action: NavAction) -> Rgb {
        if self.nav == action {
            NAV_ACTIVE_COLOR
        } else {
            NAV_INACTIVE_COLOR
        }
    }

    /// Switches the gizmo mode, attaching it to the mesh, or detaches it.
    pub fn apply_nav(&mut self, action: NavAction) {
        self.nav = action;
        let mode = match action {
            NavAction::Translate => GizmoMode::Translate,
            NavAction::Rotate => GizmoMode::Rotate,
            NavAction::Scale => GizmoMode::Scale,
            NavAction::Detach => {
                self.gizmo.detach();
                self.selection = self.resting_state();
                return;
            }
        };
        self.gizmo.attach(PickTarget::Mesh);
        self.gizmo.mode = mode;
        if self.selection == SelectionState::Detached {
            self.selection = SelectionState::Idle;
        }
    }

    /// Keyboard shortcut. Returns true if the key was bound.
    pub fn key_pressed(&mut self, key: &str) -> bool {
        match NavAction::from_key(key) {
            Some(action) => {
                self.apply_nav(action);
                true
            }
            None => false,
        }
    }

    /// Whether a button press started a gizmo drag or an orbit that has not
    /// been released yet. Pointer input keeps flowing to the editor while
    /// this holds, even over the panel.
    pub fn pointer_captured(&self) -> bool {
        self.gizmo.is_dragging() || self.orbit.is_active()
    }

    fn ray_at(&self, cursor: (f32, f32)) -> Ray {
        self.picker.screen_to_ray(cursor, self.viewport, &self.scene.camera)
    }

    /// Handles a button press.
    ///
    /// A primary press on a gizmo handle starts a drag and suspends the
    /// orbit controls. Otherwise the primary button picks under the cursor,
    /// attaching the gizmo to whatever was hit, and starts orbiting; the
    /// secondary button starts panning.
    ///
    /// # Arguments
    /// * `button` - Which button went down
    /// * `cursor` - Cursor position in physical pixels, origin top left
    pub fn pointer_down(&mut self, button: PointerButton, cursor: (f32, f32)) {
        self.cursor = cursor;
        if self.gizmo.is_dragging() {
            return;
        }

        let gesture = match button {
            PointerButton::Primary => {
                let ray = self.ray_at(cursor);
                if self.try_begin_gizmo_drag(&ray) {
                    return;
                }
                self.pick(&ray);
                OrbitGesture::Rotate
            }
            PointerButton::Secondary => OrbitGesture::Pan,
        };

        if self.orbit.begin(gesture, cursor) {
            self.selection = SelectionState::HoveringPick;
        }
    }

    /// Starts a handle drag if `ray` hits the attached gizmo.
    fn try_begin_gizmo_drag(&mut self, ray: &Ray) -> bool {
        let Some(transform) = self.gizmo_transform() else {
            return false;
        };
        if !self.gizmo.begin_drag(ray, &self.scene.camera, &transform) {
            return false;
        }
        self.orbit.enabled = false;
        self.selection = SelectionState::DraggingGizmo;
        debug!("Gizmo drag started on {:?}", self.gizmo.target());
        true
    }

    fn pick(&mut self, ray: &Ray) {
        match self.picker.pick_ray(ray, &self.scene) {
            Some(hit) => {
                self.gizmo.attach(hit.target);
                if hit.target == PickTarget::Mesh && self.scene.box_helper.enabled {
                    self.scene.box_helper.visible = true;
                }
                self.on_target = true;
                debug!("Picked {:?} at distance {:.3}", hit.target, hit.distance);
            }
            None => {
                self.on_target = false;
                debug!("Pick missed");
            }
        }
    }

    /// Handles cursor motion: drags the gizmo, orbits the camera, or
    /// updates the hovered handle, depending on the selection state.
    ///
    /// # Arguments
    /// * `cursor` - Cursor position in physical pixels, origin top left
    ///
    /// # Returns
    /// True if anything in the scene changed
    pub fn pointer_moved(&mut self, cursor: (f32, f32)) -> bool {
        self.cursor = cursor;
        match self.selection {
            SelectionState::DraggingGizmo => {
                let ray = self.ray_at(cursor);
                self.drag_gizmo(&ray)
            }
            SelectionState::HoveringPick => {
                let moved = self
                    .orbit
                    .cursor_moved(cursor, self.viewport.1, &mut self.scene.camera);
                if moved {
                    self.camera_moved = true;
                }
                moved
            }
            SelectionState::Idle | SelectionState::Detached => {
                let ray = self.ray_at(cursor);
                match self.gizmo_transform() {
                    Some(transform) => self.gizmo.hover(&ray, &self.scene.camera, &transform),
                    None => false,
                }
            }
        }
    }

    /// Applies a handle drag to the gizmo target. Lights only move.
    fn drag_gizmo(&mut self, ray: &Ray) -> bool {
        match self.gizmo.target() {
            Some(PickTarget::Mesh) => self.gizmo.drag(ray, &mut self.scene.mesh.transform),
            Some(PickTarget::PointLight(i)) => {
                let Some(light) = self.scene.point_lights.get_mut(i) else {
                    return false;
                };
                let mut transform = Transform::from_position(light.position);
                let changed = self.gizmo.drag(ray, &mut transform);
                light.position = transform.position;
                changed
            }
            None => false,
        }
    }

    /// Handles a button release, whichever button it was.
    ///
    /// Ends a gizmo drag and re-enables the orbit controls, or ends the
    /// orbit. A release that neither moved the camera nor followed a hit
    /// detaches the gizmo and hides the box helper.
    pub fn pointer_up(&mut self, _button: PointerButton) {
        match self.selection {
            SelectionState::DraggingGizmo => {
                self.gizmo.end_drag();
                self.orbit.enabled = true;
            }
            SelectionState::HoveringPick => {
                if self.orbit.end() {
                    self.orbit_interaction_ended();
                }
            }
            SelectionState::Idle | SelectionState::Detached => {}
        }
        self.selection = self.resting_state();
    }

    /// A click that did not move the camera and hit nothing detaches the
    /// gizmo; any camera motion only clears the moved flag.
    fn orbit_interaction_ended(&mut self) {
        if self.camera_moved {
            self.camera_moved = false;
            return;
        }
        if !self.on_target {
            self.gizmo.detach();
            if self.scene.box_helper.enabled {
                self.scene.box_helper.visible = false;
            }
            debug!("Gizmo detached");
        }
    }

    /// Dollies the camera; positive `lines` move it closer.
    pub fn scroll(&mut self, lines: f32) -> bool {
        self.orbit.scroll(lines, &mut self.scene.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::gizmos::TransformGizmo;
    use crate::gfx::scene::DrawMode;

    fn editor() -> Editor {
        Editor::new(&EditorConfig::default(), 800, 600)
    }

    const CENTER: (f32, f32) = (400.0, 300.0);
    const CORNER: (f32, f32) = (5.0, 5.0);

    fn to_screen(editor: &Editor, point: cgmath::Vector3<f32>) -> (f32, f32) {
        let camera = &editor.scene.camera;
        let clip = camera.projection_matrix() * camera.view_matrix() * point.extend(1.0);
        let ndc = (clip.x / clip.w, clip.y / clip.w);
        ((ndc.0 + 1.0) * 400.0, (1.0 - ndc.1) * 300.0)
    }

    #[test]
    fn test_keys_switch_gizmo_mode() {
        let mut editor = editor();
        assert!(editor.key_pressed("e"));
        assert_eq!(editor.gizmo.mode, GizmoMode::Rotate);
        assert_eq!(editor.nav_color(NavAction::Rotate), NAV_ACTIVE_COLOR);
        assert_eq!(editor.nav_color(NavAction::Translate), NAV_INACTIVE_COLOR);

        assert!(editor.key_pressed("t"));
        assert!(!editor.gizmo.is_attached());
        assert_eq!(editor.selection(), SelectionState::Detached);

        assert!(editor.key_pressed("r"));
        assert_eq!(editor.gizmo.target(), Some(PickTarget::Mesh));
        assert_eq!(editor.gizmo.mode, GizmoMode::Scale);
        assert_eq!(editor.selection(), SelectionState::Idle);

        assert!(!editor.key_pressed("q"));
    }

    #[test]
    fn test_click_on_nothing_detaches() {
        let mut editor = editor();
        editor.pointer_down(PointerButton::Primary, CORNER);
        assert_eq!(editor.selection(), SelectionState::HoveringPick);
        assert!(!editor.on_target());
        editor.pointer_up(PointerButton::Primary);

        assert!(!editor.gizmo.is_attached());
        assert!(!editor.scene.box_helper.visible);
        assert_eq!(editor.selection(), SelectionState::Detached);
    }

    #[test]
    fn test_orbit_drag_from_nothing_keeps_gizmo() {
        let mut editor = editor();
        editor.pointer_down(PointerButton::Primary, CORNER);
        assert!(editor.pointer_moved((60.0, 40.0)));
        editor.pointer_up(PointerButton::Primary);

        assert!(editor.gizmo.is_attached());
        assert!(!editor.camera_moved);
    }

    #[test]
    fn test_click_on_light_marker_attaches_to_light() {
        let mut editor = editor();
        editor.key_pressed("t");
        // look straight at the first light
        let light = editor.scene.point_lights[0].position;
        editor.orbit.target = light;
        editor.orbit.update(&mut editor.scene.camera);

        editor.pointer_down(PointerButton::Primary, CENTER);
        editor.pointer_up(PointerButton::Primary);

        assert_eq!(editor.gizmo.target(), Some(PickTarget::PointLight(0)));
        assert!(editor.on_target());
        assert_eq!(editor.selection(), SelectionState::Idle);
    }

    #[test]
    fn test_click_on_mesh_after_detach_reattaches() {
        let mut editor = editor();
        editor.key_pressed("t");
        editor.scene.box_helper.visible = false;

        // the torus tube crosses the x axis at 1
        let screen = to_screen(&editor, cgmath::Vector3::new(1.0, 0.0, 0.0));
        editor.pointer_down(PointerButton::Primary, screen);
        editor.pointer_up(PointerButton::Primary);

        assert_eq!(editor.gizmo.target(), Some(PickTarget::Mesh));
        assert!(editor.scene.box_helper.visible);
    }

    #[test]
    fn test_gizmo_drag_moves_mesh_and_suspends_orbit() {
        let mut editor = editor();
        let position = editor.scene.mesh.transform.position;
        let size = TransformGizmo::handle_size(&editor.scene.camera, position);

        // a point on the X arrow
        let screen = to_screen(&editor, position + cgmath::Vector3::new(size * 0.6, 0.0, 0.0));

        editor.pointer_down(PointerButton::Primary, screen);
        assert_eq!(editor.selection(), SelectionState::DraggingGizmo);
        assert!(!editor.orbit.enabled);
        assert!(editor.pointer_captured());

        assert!(editor.pointer_moved((screen.0 + 40.0, screen.1)));
        assert!(editor.scene.mesh.transform.position.x > 0.0);
        assert_eq!(editor.scene.mesh.transform.position.y, 0.0);

        editor.pointer_up(PointerButton::Primary);
        assert!(editor.orbit.enabled);
        assert!(!editor.pointer_captured());
        assert_eq!(editor.selection(), SelectionState::Idle);
    }

    #[test]
    fn test_draw_mode_change_keeps_selection_consistent() {
        let mut editor = editor();
        editor.pointer_down(PointerButton::Primary, CORNER);
        editor.pointer_up(PointerButton::Primary);
        editor.change_draw_mode(DrawMode::Line).unwrap();
        assert!(!editor.gizmo.is_attached());
        assert_eq!(editor.selection(), SelectionState::Detached);
    }
}
