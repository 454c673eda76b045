//! # Editor
//!
//! The control logic of the editor, independent of the window and the GPU.
//! [`Editor`] owns the scene together with the parameter records that
//! describe it, and keeps the two in step:
//!
//! - geometry and material selection ([`Editor::select_geometry`],
//!   [`Editor::select_material`]) rebuild the mesh from the active record
//! - draw mode changes replace the mesh ([`Editor::change_draw_mode`])
//! - pointer input drives picking, the transform gizmo and the orbit
//!   controls ([`input`])
//! - the panel model is read and written by key ([`panel`])
//! - decoded textures and animation frames are applied in [`Editor::update`]

pub mod input;
pub mod panel;

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::animation::{Animatable, AnimationSequencer, Channel, Sequence, SequenceTarget};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::gfx::camera::OrbitControls;
use crate::gfx::geometry::{GeometryKind, GeometrySettings};
use crate::gfx::gizmos::TransformGizmo;
use crate::gfx::picking::{ObjectPicker, PickTarget};
use crate::gfx::resources::material::{MaterialKind, MaterialSettings};
use crate::gfx::resources::texture_map::{TextureLoader, IMAGE_EXTENSIONS};
use crate::gfx::scene::{DrawMode, LineVertex, Scene, Transform};

pub use input::{NavAction, PointerButton, SelectionState, NAV_ACTIVE_COLOR, NAV_INACTIVE_COLOR};
pub use panel::{Folder, PanelItem, PanelTarget};

/// Editor state and the operations the UI and the window shell call.
///
/// Every mutation happens on the frame or input callbacks, so the editor
/// needs no interior locking. The public records (`geometry`, `materials`)
/// are the source of truth the mesh is rebuilt from.
pub struct Editor {
    pub scene: Scene,
    pub geometry: GeometrySettings,
    pub materials: MaterialSettings,
    pub orbit: OrbitControls,
    pub gizmo: TransformGizmo,
    pub animation: AnimationSequencer,
    picker: ObjectPicker,
    textures: TextureLoader,
    selection: SelectionState,
    nav: NavAction,
    /// Last primary pick hit something pickable
    on_target: bool,
    /// The orbit controls moved the camera since the last release
    camera_moved: bool,
    cursor: (f32, f32),
    viewport: (f32, f32),
    time_ms: f64,
}

impl Editor {
    /// Creates the editor with the initial torus, the default Solid-mode
    /// material and the gizmo attached to the mesh in translate mode.
    ///
    /// # Arguments
    /// * `config` - Camera and orbit settings
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    pub fn new(config: &EditorConfig, width: u32, height: u32) -> Self {
        let geometry = GeometrySettings::default();
        let materials = MaterialSettings::default();
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let mut scene = Scene::new(config, aspect, geometry.build(), materials.build());

        let mut orbit = OrbitControls::new(&config.orbit);
        orbit.update(&mut scene.camera);

        let mut gizmo = TransformGizmo::new();
        gizmo.attach(PickTarget::Mesh);

        Self {
            scene,
            geometry,
            materials,
            orbit,
            gizmo,
            animation: AnimationSequencer::new(),
            picker: ObjectPicker::new(),
            textures: TextureLoader::new(),
            selection: SelectionState::Idle,
            nav: NavAction::Translate,
            on_target: true,
            camera_moved: false,
            cursor: (0.0, 0.0),
            viewport: (width.max(1) as f32, height.max(1) as f32),
            time_ms: 0.0,
        }
    }

    /// Current pointer interaction state
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    /// Whether the last primary pick hit the mesh or a light marker
    pub fn on_target(&self) -> bool {
        self.on_target
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Updates the viewport used for picking and the camera aspect.
    ///
    /// Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width as f32, height as f32);
        self.scene.camera.resize_projection(width, height);
    }

    /// Per-frame work: applies decoded textures and advances the animation
    /// clock.
    ///
    /// # Arguments
    /// * `time_ms` - Milliseconds since the editor started
    ///
    /// # Returns
    /// True if the scene changed and needs redrawing
    pub fn update(&mut self, time_ms: f64) -> bool {
        self.time_ms = time_ms;
        let mut changed = self.apply_loaded_textures();

        let mut view = AnimationView {
            scene: &mut self.scene,
            materials: &mut self.materials,
        };
        let tick = self.animation.update(time_ms, &mut view);
        if tick.animated {
            self.sync_material();
            changed = true;
        }
        if tick.camera_moving && self.orbit.update(&mut self.scene.camera) {
            self.camera_moved = true;
            changed = true;
        }
        changed
    }

    /// Replaces the mesh with one of another draw mode.
    ///
    /// The new mesh shares the current geometry, starts from an identity
    /// transform and gets the default material kind of `mode`. The gizmo
    /// follows it only if it was on target.
    ///
    /// # Errors
    /// [`EditorError::AnimationPlaying`] while a sequence plays
    pub fn change_draw_mode(&mut self, mode: DrawMode) -> Result<()> {
        if self.animation.is_playing() {
            return Err(EditorError::AnimationPlaying);
        }
        if mode == self.scene.mesh.mode {
            return Ok(());
        }

        self.gizmo.detach();
        self.materials.reset_for_mode(mode);
        let removed = self.scene.replace_mesh(mode, self.materials.build());
        if self.on_target {
            self.gizmo.attach(PickTarget::Mesh);
        }
        self.picker.invalidate_cache();
        self.animation.rebuild();
        self.selection = self.resting_state();

        info!(
            "Draw mode {} (mesh {} replaced by {})",
            mode.label(),
            removed,
            self.scene.mesh.id
        );
        Ok(())
    }

    /// Makes `kind` the active geometry and rebuilds the mesh from its
    /// record. Values edited on other kinds are kept.
    ///
    /// # Arguments
    /// * `kind` - Primitive to show
    pub fn select_geometry(&mut self, kind: GeometryKind) {
        self.geometry.kind = kind;
        self.rebuild_geometry();
        debug!("Geometry kind {}", kind.label());
    }

    /// Regenerates the mesh geometry from the active record.
    pub fn rebuild_geometry(&mut self) {
        let data = self.geometry.build();
        self.scene.mesh.set_geometry(data);
    }

    /// Makes `kind` the active material and copies its record onto the
    /// mesh.
    ///
    /// # Arguments
    /// * `kind` - Material kind; must be offered by the current draw mode
    ///
    /// # Errors
    /// [`EditorError::MaterialUnavailable`] if the draw mode does not offer
    /// `kind`
    pub fn select_material(&mut self, kind: MaterialKind) -> Result<()> {
        self.materials.select(kind, self.scene.mesh.mode)?;
        self.sync_material();
        debug!("Material kind {}", kind.label());
        Ok(())
    }

    /// Copies the active material record onto the mesh.
    pub fn sync_material(&mut self) {
        self.scene.mesh.material = self.materials.build();
    }

    /// Box helper toggle; only Solid mode offers the helper.
    pub fn set_box_helper_enabled(&mut self, enabled: bool) {
        let helper = &mut self.scene.box_helper;
        if self.scene.mesh.mode != DrawMode::Solid {
            helper.enabled = false;
            return;
        }
        helper.enabled = enabled;
        helper.visible = enabled && self.on_target;
    }

    /// Queues an image file for the active material's map slot.
    ///
    /// Decoding runs off the frame loop; the texture is assigned by a later
    /// [`Editor::update`]. Non-image files leave the material untouched.
    ///
    /// # Arguments
    /// * `path` - File chosen in the dialog or dropped on the window
    ///
    /// # Returns
    /// False if the file does not have an image extension
    pub fn request_texture(&mut self, path: PathBuf) -> bool {
        self.textures.request(path)
    }

    /// Opens the file dialog for the active material's map.
    pub fn choose_map(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Choose map")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.request_texture(path);
        }
    }

    fn apply_loaded_textures(&mut self) -> bool {
        let mut changed = false;
        for result in self.textures.poll() {
            match result {
                Ok(texture) => {
                    info!("Loaded texture {} ({}x{})", texture.name, texture.width, texture.height);
                    if self.materials.assign_map(texture) {
                        self.sync_material();
                        changed = true;
                    } else {
                        debug!("Active material has no map slot, texture dropped");
                    }
                }
                Err(err) => warn!("Texture not loaded: {err}"),
            }
        }
        changed
    }

    /// Starts `sequence`. While a sequence is playing, paused or not, this
    /// resumes the paused steps of `sequence` instead, so a second sequence
    /// never starts on top of the first.
    ///
    /// # Arguments
    /// * `sequence` - Fade + spin or bounce + flythrough
    pub fn play_animation(&mut self, sequence: Sequence) {
        let mut view = AnimationView {
            scene: &mut self.scene,
            materials: &mut self.materials,
        };
        self.animation.play(sequence, self.time_ms, &mut view);
        self.sync_material();
    }

    /// Pauses every running tween at the current time
    pub fn pause_animation(&mut self) {
        self.animation.pause(self.time_ms);
    }

    /// Stops every chain; values stay where they were
    pub fn stop_animation(&mut self) {
        self.animation.stop();
    }

    /// Transform the gizmo edits, if it is attached.
    pub fn gizmo_transform(&self) -> Option<Transform> {
        match self.gizmo.target()? {
            PickTarget::Mesh => Some(self.scene.mesh.transform),
            PickTarget::PointLight(i) => self
                .scene
                .point_lights
                .get(i)
                .map(|light| Transform::from_position(light.position)),
        }
    }

    /// Gizmo handle lines for the current frame.
    pub fn gizmo_lines(&self) -> Vec<LineVertex> {
        match self.gizmo_transform() {
            Some(transform) => self.gizmo.lines(&self.scene.camera, &transform),
            None => Vec::new(),
        }
    }

    fn resting_state(&self) -> SelectionState {
        if self.gizmo.is_attached() {
            SelectionState::Idle
        } else {
            SelectionState::Detached
        }
    }
}

/// What the animation sequences write into: the mesh, the camera and the
/// active material record.
struct AnimationView<'a> {
    scene: &'a mut Scene,
    materials: &'a mut MaterialSettings,
}

impl Animatable for AnimationView<'_> {
    fn read(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Opacity => self.materials.flags().opacity,
            Channel::MeshPosition(i) => self.scene.mesh.transform.position[i],
            Channel::MeshRotation(i) => self.scene.mesh.transform.rotation[i],
            Channel::CameraPosition(i) => self.scene.camera.transform.position[i],
        }
    }

    fn write(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::Opacity => self.materials.flags_mut().opacity = value,
            Channel::MeshPosition(i) => self.scene.mesh.transform.position[i] = value,
            Channel::MeshRotation(i) => self.scene.mesh.transform.rotation[i] = value,
            Channel::CameraPosition(i) => self.scene.camera.transform.position[i] = value,
        }
    }
}

impl SequenceTarget for AnimationView<'_> {
    fn set_transparent(&mut self, transparent: bool) {
        self.materials.flags_mut().transparent = transparent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn editor() -> Editor {
        Editor::new(&EditorConfig::default(), 800, 600)
    }

    #[test]
    fn test_initial_state() {
        let editor = editor();
        assert_eq!(editor.geometry.kind, GeometryKind::Torus);
        assert_eq!(editor.materials.kind, MaterialKind::Standard);
        assert_eq!(editor.scene.mesh.mode, DrawMode::Solid);
        assert_eq!(editor.gizmo.target(), Some(PickTarget::Mesh));
        assert_eq!(editor.selection(), SelectionState::Idle);
        assert!(editor.on_target());
    }

    #[test]
    fn test_select_geometry_replaces_mesh_geometry() {
        let mut editor = editor();
        let before = editor.scene.mesh.geometry.clone();
        let revision = editor.scene.mesh.geometry_revision;

        editor.select_geometry(GeometryKind::Box);

        assert!(!Arc::ptr_eq(&before, &editor.scene.mesh.geometry));
        assert_eq!(editor.scene.mesh.geometry_revision, revision + 1);
        // 6 faces of 2x2 vertices
        assert_eq!(editor.scene.mesh.geometry.vertex_count(), 24);
    }

    #[test]
    fn test_draw_mode_cycle_keeps_one_mesh() {
        let mut editor = editor();
        let geometry = editor.scene.mesh.geometry.clone();
        let mut ids = vec![editor.scene.mesh.id];

        for mode in [DrawMode::Line, DrawMode::Point, DrawMode::Solid] {
            editor.change_draw_mode(mode).unwrap();
            assert_eq!(editor.scene.mesh.mode, mode);
            assert_eq!(editor.materials.kind, MaterialKind::default_for(mode));
            assert_eq!(editor.scene.mesh.material.kind(), MaterialKind::default_for(mode));
            assert!(Arc::ptr_eq(&geometry, &editor.scene.mesh.geometry));
            assert!(!ids.contains(&editor.scene.mesh.id));
            ids.push(editor.scene.mesh.id);
        }
        assert!(editor.scene.box_helper.enabled);
    }

    #[test]
    fn test_draw_mode_change_refused_while_animating() {
        let mut editor = editor();
        editor.play_animation(Sequence::FadeSpin);
        assert!(matches!(
            editor.change_draw_mode(DrawMode::Line),
            Err(EditorError::AnimationPlaying)
        ));
        assert_eq!(editor.scene.mesh.mode, DrawMode::Solid);

        editor.stop_animation();
        editor.change_draw_mode(DrawMode::Line).unwrap();
        assert_eq!(editor.scene.mesh.mode, DrawMode::Line);
    }

    #[test]
    fn test_draw_mode_change_reattaches_only_when_on_target() {
        let mut editor = editor();
        editor.on_target = false;
        editor.change_draw_mode(DrawMode::Point).unwrap();
        assert!(!editor.gizmo.is_attached());
        assert_eq!(editor.selection(), SelectionState::Detached);

        editor.on_target = true;
        editor.change_draw_mode(DrawMode::Solid).unwrap();
        assert_eq!(editor.gizmo.target(), Some(PickTarget::Mesh));
    }

    #[test]
    fn test_material_selection_respects_draw_mode() {
        let mut editor = editor();
        editor.select_material(MaterialKind::Phong).unwrap();
        assert_eq!(editor.scene.mesh.material.kind(), MaterialKind::Phong);

        assert!(matches!(
            editor.select_material(MaterialKind::Points),
            Err(EditorError::MaterialUnavailable { .. })
        ));
        assert_eq!(editor.scene.mesh.material.kind(), MaterialKind::Phong);
    }

    #[test]
    fn test_fade_animation_writes_material_opacity() {
        let mut editor = editor();
        editor.update(0.0);
        editor.play_animation(Sequence::FadeSpin);
        assert_eq!(editor.scene.mesh.material.flags().opacity, 0.0);

        editor.update(10.0);
        assert!(editor.scene.mesh.material.flags().transparent);
        editor.update(250.0);
        let opacity = editor.scene.mesh.material.flags().opacity;
        assert!((opacity - 0.5).abs() < 1e-4);
        assert_eq!(editor.materials.flags().opacity, opacity);
    }

    #[test]
    fn test_flythrough_reaims_camera() {
        let mut editor = editor();
        editor.update(0.0);
        editor.play_animation(Sequence::BounceFlythrough);
        let rotation = editor.scene.camera.transform.rotation;
        editor.update(2500.0);
        assert_ne!(editor.scene.camera.transform.rotation, rotation);
        assert!(editor.scene.mesh.transform.position.y > 0.0);
    }

    #[test]
    fn test_non_image_file_leaves_texture_untouched() {
        let mut editor = editor();
        assert!(!editor.request_texture(PathBuf::from("notes.txt")));
        editor.update(0.0);
        assert!(editor.materials.standard.map.texture.is_none());
        assert!(editor.scene.mesh.material.map().is_none());
    }

    #[test]
    fn test_box_helper_toggle_follows_mode_and_target() {
        let mut editor = editor();
        editor.set_box_helper_enabled(false);
        assert!(!editor.scene.box_helper.visible);
        editor.set_box_helper_enabled(true);
        assert!(editor.scene.box_helper.visible);

        editor.change_draw_mode(DrawMode::Line).unwrap();
        editor.set_box_helper_enabled(true);
        assert!(!editor.scene.box_helper.enabled);
    }

    #[test]
    fn test_gizmo_transform_tracks_target() {
        let mut editor = editor();
        editor.scene.mesh.transform.position.x = 1.5;
        assert_eq!(editor.gizmo_transform().map(|t| t.position.x), Some(1.5));

        editor.gizmo.attach(PickTarget::PointLight(0));
        assert_eq!(editor.gizmo_transform().map(|t| t.position.x), Some(2.0));

        editor.gizmo.detach();
        assert!(editor.gizmo_transform().is_none());
        assert!(editor.gizmo_lines().is_empty());
    }
}
