//! The parameter panel as data: nested folders of controls, each bound to
//! a [`PanelTarget`]. The imgui layer renders whatever [`Editor::panel`]
//! returns and routes edits back through [`Editor::set_param`] and
//! [`Editor::trigger`].

use log::{debug, warn};

use crate::animation::Sequence;
use crate::error::{EditorError, Result};
use crate::gfx::geometry::GeometryKind;
use crate::gfx::resources::material::{MaterialKind, CHOOSE_MAP_ACTION};
use crate::gfx::scene::{DrawMode, POINT_LIGHT_COUNT};
use crate::ui::reflect::{unknown_param, Control, ControlKind, ParamValue, Reflect};

use super::Editor;

const CAMERA_TYPES: &[&str] = &["Perspective"];

/// The record a folder's controls read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTarget {
    Camera,
    CameraPosition,
    CameraRotation,
    CameraScale,
    PointLight(usize),
    PointLightPosition(usize),
    AmbientLight,
    Mesh,
    Object,
    ObjectPosition,
    ObjectRotation,
    ObjectScale,
    Geometry,
    Material,
    Environment,
    Animation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelItem {
    Control(Control),
    Folder(Folder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub title: String,
    /// Folders that only group other folders have no target
    pub target: Option<PanelTarget>,
    pub items: Vec<PanelItem>,
}

impl Folder {
    fn new(title: impl Into<String>, target: Option<PanelTarget>) -> Self {
        Self {
            title: title.into(),
            target,
            items: Vec::new(),
        }
    }

    fn folder(mut self, folder: Folder) -> Self {
        self.items.push(PanelItem::Folder(folder));
        self
    }

    fn controls(mut self, controls: Vec<Control>) -> Self {
        self.items.extend(controls.into_iter().map(PanelItem::Control));
        self
    }

    /// Keys of this folder's own controls, in order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PanelItem::Control(c) => Some(c.key),
                PanelItem::Folder(_) => None,
            })
            .collect()
    }

    /// Depth-first search by title.
    pub fn find(&self, title: &str) -> Option<&Folder> {
        if self.title == title {
            return Some(self);
        }
        self.items.iter().find_map(|item| match item {
            PanelItem::Folder(f) => f.find(title),
            PanelItem::Control(_) => None,
        })
    }
}

fn choice(key: &'static str, label: &'static str, options: &'static [&'static str]) -> Control {
    Control {
        key,
        label,
        kind: ControlKind::Choice(options),
    }
}

fn type_mismatch(key: &str, expected: &'static str) -> EditorError {
    EditorError::ParamType {
        key: key.to_string(),
        expected,
    }
}

fn choice_index(key: &str, value: ParamValue) -> Result<usize> {
    match value {
        ParamValue::Choice(i) => Ok(i),
        _ => Err(type_mismatch(key, "choice")),
    }
}

impl Editor {
    /// The whole panel for the current state of the editor. Folders whose
    /// fields depend on a selected kind are rebuilt on every call.
    pub fn panel(&self) -> Vec<Folder> {
        vec![
            self.camera_folder(),
            self.lights_folder(),
            self.mesh_folder(),
            Folder::new("Environment", Some(PanelTarget::Environment))
                .controls(self.controls_of(PanelTarget::Environment)),
            Folder::new("Animation", Some(PanelTarget::Animation))
                .controls(self.controls_of(PanelTarget::Animation)),
        ]
    }

    fn vector_folders(&self, targets: [PanelTarget; 3]) -> [Folder; 3] {
        let titles = ["Position", "Rotation", "Scale"];
        std::array::from_fn(|i| Folder::new(titles[i], Some(targets[i])).controls(self.controls_of(targets[i])))
    }

    fn camera_folder(&self) -> Folder {
        let [position, rotation, scale] = self.vector_folders([
            PanelTarget::CameraPosition,
            PanelTarget::CameraRotation,
            PanelTarget::CameraScale,
        ]);
        Folder::new("Camera", Some(PanelTarget::Camera))
            .folder(position)
            .folder(rotation)
            .folder(scale)
            .controls(self.controls_of(PanelTarget::Camera))
    }

    fn lights_folder(&self) -> Folder {
        let mut lights = Folder::new("Lights", None);
        for i in 0..POINT_LIGHT_COUNT {
            let position = Folder::new("Position", Some(PanelTarget::PointLightPosition(i)))
                .controls(self.controls_of(PanelTarget::PointLightPosition(i)));
            lights = lights.folder(
                Folder::new(format!("Point light {}", i + 1), Some(PanelTarget::PointLight(i)))
                    .folder(position)
                    .controls(self.controls_of(PanelTarget::PointLight(i))),
            );
        }
        lights.folder(
            Folder::new("Ambient light", Some(PanelTarget::AmbientLight))
                .controls(self.controls_of(PanelTarget::AmbientLight)),
        )
    }

    fn mesh_folder(&self) -> Folder {
        let [position, rotation, scale] = self.vector_folders([
            PanelTarget::ObjectPosition,
            PanelTarget::ObjectRotation,
            PanelTarget::ObjectScale,
        ]);
        let object = Folder::new("Object", Some(PanelTarget::Object))
            .folder(position)
            .folder(rotation)
            .folder(scale)
            .controls(self.controls_of(PanelTarget::Object));

        Folder::new("Mesh", Some(PanelTarget::Mesh))
            .controls(self.controls_of(PanelTarget::Mesh))
            .folder(object)
            .folder(
                Folder::new("Geometry", Some(PanelTarget::Geometry))
                    .controls(self.controls_of(PanelTarget::Geometry)),
            )
            .folder(
                Folder::new("Material", Some(PanelTarget::Material))
                    .controls(self.controls_of(PanelTarget::Material)),
            )
    }

    /// Controls a target shows right now.
    pub fn controls_of(&self, target: PanelTarget) -> Vec<Control> {
        match target {
            PanelTarget::Camera => {
                let mut controls = self.scene.camera.controls();
                controls.push(choice("type", "type", CAMERA_TYPES));
                controls.push(Control::action("reset", "reset"));
                controls
            }
            PanelTarget::Mesh => vec![choice("mode", "Draw mode", DrawMode::LABELS)],
            PanelTarget::Object => {
                let mut controls = self.scene.mesh.controls();
                controls.push(Control {
                    key: "helper",
                    label: "helper",
                    kind: ControlKind::Toggle,
                });
                controls
            }
            PanelTarget::Geometry => {
                let mut controls = vec![choice("type", "type", GeometryKind::LABELS)];
                controls.extend(self.geometry.active().controls());
                controls
            }
            PanelTarget::Material => {
                let labels = MaterialKind::choice_labels(self.scene.mesh.mode);
                let mut controls = vec![choice("type", "type", labels)];
                controls.extend(self.materials.active().controls());
                controls
            }
            PanelTarget::Animation => vec![
                Control::action("animation1", "animation 1"),
                Control::action("animation2", "animation 2"),
                Control::action("pause", "pause"),
                Control::action("stop", "stop"),
            ],
            _ => self.record(target).map(|r| r.controls()).unwrap_or_default(),
        }
    }

    /// Records reachable through plain reflection.
    fn record(&self, target: PanelTarget) -> Option<&dyn Reflect> {
        let scene = &self.scene;
        let record: &dyn Reflect = match target {
            PanelTarget::Camera => &scene.camera,
            PanelTarget::CameraPosition => &scene.camera.transform.position,
            PanelTarget::CameraRotation => &scene.camera.transform.rotation,
            PanelTarget::CameraScale => &scene.camera.transform.scale,
            PanelTarget::PointLight(i) => scene.point_lights.get(i)?,
            PanelTarget::PointLightPosition(i) => &scene.point_lights.get(i)?.position,
            PanelTarget::AmbientLight => &scene.ambient,
            PanelTarget::Object => &scene.mesh,
            PanelTarget::ObjectPosition => &scene.mesh.transform.position,
            PanelTarget::ObjectRotation => &scene.mesh.transform.rotation,
            PanelTarget::ObjectScale => &scene.mesh.transform.scale,
            PanelTarget::Geometry => self.geometry.active(),
            PanelTarget::Material => self.materials.active(),
            PanelTarget::Environment => &scene.environment,
            PanelTarget::Mesh | PanelTarget::Animation => return None,
        };
        Some(record)
    }

    fn record_mut(&mut self, target: PanelTarget) -> Option<&mut dyn Reflect> {
        let scene = &mut self.scene;
        let record: &mut dyn Reflect = match target {
            PanelTarget::Camera => &mut scene.camera,
            PanelTarget::CameraPosition => &mut scene.camera.transform.position,
            PanelTarget::CameraRotation => &mut scene.camera.transform.rotation,
            PanelTarget::CameraScale => &mut scene.camera.transform.scale,
            PanelTarget::PointLight(i) => scene.point_lights.get_mut(i)?,
            PanelTarget::PointLightPosition(i) => &mut scene.point_lights.get_mut(i)?.position,
            PanelTarget::AmbientLight => &mut scene.ambient,
            PanelTarget::Object => &mut scene.mesh,
            PanelTarget::ObjectPosition => &mut scene.mesh.transform.position,
            PanelTarget::ObjectRotation => &mut scene.mesh.transform.rotation,
            PanelTarget::ObjectScale => &mut scene.mesh.transform.scale,
            PanelTarget::Geometry => self.geometry.active_mut(),
            PanelTarget::Material => self.materials.active_mut(),
            PanelTarget::Environment => &mut scene.environment,
            PanelTarget::Mesh | PanelTarget::Animation => return None,
        };
        Some(record)
    }

    /// Current value of a control, `None` for actions and unknown keys.
    pub fn param(&self, target: PanelTarget, key: &str) -> Option<ParamValue> {
        match (target, key) {
            (PanelTarget::Camera, "type") => Some(ParamValue::Choice(0)),
            (PanelTarget::Mesh, "mode") => Some(ParamValue::Choice(self.scene.mesh.mode.index())),
            (PanelTarget::Object, "helper") => Some(ParamValue::Bool(self.scene.box_helper.enabled)),
            (PanelTarget::Geometry, "type") => Some(ParamValue::Choice(self.geometry.kind.index())),
            (PanelTarget::Material, "type") => MaterialKind::choices(self.scene.mesh.mode)
                .iter()
                .position(|k| *k == self.materials.kind)
                .map(ParamValue::Choice),
            _ => self.record(target)?.get(key),
        }
    }

    /// Writes a control's value and applies its side effects.
    pub fn set_param(&mut self, target: PanelTarget, key: &str, value: ParamValue) -> Result<()> {
        match (target, key) {
            (PanelTarget::Camera, "type") => {
                choice_index(key, value)?;
                Ok(())
            }
            (PanelTarget::Mesh, "mode") => {
                let index = choice_index(key, value)?;
                let mode = DrawMode::from_index(index).ok_or_else(|| EditorError::UnknownKind {
                    what: "draw mode",
                    name: index.to_string(),
                })?;
                self.change_draw_mode(mode)
            }
            (PanelTarget::Object, "helper") => match value {
                ParamValue::Bool(enabled) => {
                    self.set_box_helper_enabled(enabled);
                    Ok(())
                }
                _ => Err(type_mismatch(key, "boolean")),
            },
            (PanelTarget::Geometry, "type") => {
                let index = choice_index(key, value)?;
                let kind = GeometryKind::from_index(index).ok_or_else(|| EditorError::UnknownKind {
                    what: "geometry",
                    name: index.to_string(),
                })?;
                self.select_geometry(kind);
                Ok(())
            }
            (PanelTarget::Material, "type") => {
                let index = choice_index(key, value)?;
                let kind = MaterialKind::choices(self.scene.mesh.mode)
                    .get(index)
                    .copied()
                    .ok_or_else(|| EditorError::UnknownKind {
                        what: "material",
                        name: index.to_string(),
                    })?;
                self.select_material(kind)
            }
            _ => {
                self.record_mut(target)
                    .ok_or_else(|| unknown_param(key))?
                    .set(key, value)?;
                match target {
                    PanelTarget::Geometry => self.rebuild_geometry(),
                    PanelTarget::Material => self.sync_material(),
                    _ => {}
                }
                debug!("Set {target:?}.{key} = {value:?}");
                Ok(())
            }
        }
    }

    /// Runs an action control.
    pub fn trigger(&mut self, target: PanelTarget, key: &str) -> Result<()> {
        match (target, key) {
            (PanelTarget::Camera, "reset") => self.scene.camera.reset(),
            (PanelTarget::Material, CHOOSE_MAP_ACTION) => self.choose_map(),
            (PanelTarget::Animation, "animation1") => self.play_animation(Sequence::FadeSpin),
            (PanelTarget::Animation, "animation2") => self.play_animation(Sequence::BounceFlythrough),
            (PanelTarget::Animation, "pause") => self.pause_animation(),
            (PanelTarget::Animation, "stop") => self.stop_animation(),
            _ => return Err(unknown_param(key)),
        }
        Ok(())
    }

    /// Panel edits never stop the editor; failures are logged and dropped.
    pub fn apply_edit(&mut self, target: PanelTarget, key: &str, value: ParamValue) {
        if let Err(err) = self.set_param(target, key, value) {
            warn!("Rejected {target:?}.{key}: {err}");
        }
    }

    pub fn apply_action(&mut self, target: PanelTarget, key: &str) {
        if let Err(err) = self.trigger(target, key) {
            warn!("Action {target:?}.{key} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::color::Rgb;
    use crate::gfx::resources::material::MaterialKind;

    fn editor() -> Editor {
        Editor::new(&EditorConfig::default(), 800, 600)
    }

    fn folder<'a>(panel: &'a [Folder], title: &str) -> &'a Folder {
        panel
            .iter()
            .find_map(|f| f.find(title))
            .unwrap_or_else(|| panic!("no folder {title}"))
    }

    #[test]
    fn test_top_level_folders() {
        let titles: Vec<_> = editor().panel().into_iter().map(|f| f.title).collect();
        assert_eq!(titles, vec!["Camera", "Lights", "Mesh", "Environment", "Animation"]);
    }

    #[test]
    fn test_geometry_folder_shows_only_the_active_kind() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::Geometry, "type", ParamValue::Choice(GeometryKind::Box.index()))
            .unwrap();

        let panel = editor.panel();
        let keys = folder(&panel, "Geometry").keys();
        let mut expected = vec!["type"];
        expected.extend(editor.geometry.cuboid.keys());
        assert_eq!(keys, expected);
        assert!(!keys.contains(&"tube"));
    }

    #[test]
    fn test_geometry_field_edit_rebuilds_mesh() {
        let mut editor = editor();
        let revision = editor.scene.mesh.geometry_revision;
        editor
            .set_param(PanelTarget::Geometry, "tube", ParamValue::Float(0.5))
            .unwrap();
        assert_eq!(editor.geometry.torus.tube, 0.5);
        assert_eq!(editor.scene.mesh.geometry_revision, revision + 1);
        assert_eq!(editor.param(PanelTarget::Geometry, "tube"), Some(ParamValue::Float(0.5)));
    }

    #[test]
    fn test_material_choices_follow_draw_mode() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::Mesh, "mode", ParamValue::Choice(DrawMode::Point.index()))
            .unwrap();

        let panel = editor.panel();
        let material = folder(&panel, "Material");
        let Some(PanelItem::Control(kind)) = material.items.first() else {
            panic!("material folder starts with the kind choice");
        };
        assert_eq!(kind.kind, ControlKind::Choice(&["Points"]));
        assert!(material.keys().contains(&"size"));
        assert_eq!(editor.param(PanelTarget::Material, "type"), Some(ParamValue::Choice(0)));
        assert_eq!(editor.scene.mesh.material.kind(), MaterialKind::Points);
    }

    #[test]
    fn test_material_edit_reaches_mesh() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::Material, "color", ParamValue::Color(Rgb(0xff8800)))
            .unwrap();
        assert_eq!(editor.scene.mesh.material.color(), Rgb(0xff8800));

        editor
            .set_param(PanelTarget::Material, "opacity", ParamValue::Float(2.0))
            .unwrap();
        assert_eq!(editor.scene.mesh.material.flags().opacity, 1.0);
    }

    #[test]
    fn test_vertex_colors_toggle_on_every_solid_material() {
        let mut editor = editor();
        for (i, kind) in MaterialKind::choices(DrawMode::Solid).iter().enumerate() {
            editor
                .set_param(PanelTarget::Material, "type", ParamValue::Choice(i))
                .unwrap();
            assert_eq!(editor.scene.mesh.material.kind(), *kind);

            let panel = editor.panel();
            let keys = folder(&panel, "Material").keys();
            let color = keys.iter().position(|k| *k == "color").unwrap();
            assert_eq!(keys[color + 1], "vertex_colors");

            assert_eq!(editor.param(PanelTarget::Material, "vertex_colors"), Some(ParamValue::Bool(false)));
            editor
                .set_param(PanelTarget::Material, "vertex_colors", ParamValue::Bool(true))
                .unwrap();
            assert!(editor.scene.mesh.material.vertex_colors());
        }

        // each record keeps its own toggle
        editor
            .set_param(PanelTarget::Material, "type", ParamValue::Choice(0))
            .unwrap();
        assert!(editor.scene.mesh.material.vertex_colors());
        editor
            .set_param(PanelTarget::Mesh, "mode", ParamValue::Choice(DrawMode::Line.index()))
            .unwrap();
        assert!(!editor.scene.mesh.material.vertex_colors());
        assert!(editor
            .set_param(PanelTarget::Material, "vertex_colors", ParamValue::Float(1.0))
            .is_err());
    }

    #[test]
    fn test_object_folder_edits_transform() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::ObjectRotation, "y", ParamValue::Float(0.25))
            .unwrap();
        editor
            .set_param(PanelTarget::Object, "cast_shadow", ParamValue::Bool(true))
            .unwrap();
        assert_eq!(editor.scene.mesh.transform.rotation.y, 0.25);
        assert!(editor.scene.mesh.cast_shadow);
        assert_eq!(editor.param(PanelTarget::Object, "helper"), Some(ParamValue::Bool(true)));
    }

    #[test]
    fn test_light_folders() {
        let mut editor = editor();
        let panel = editor.panel();
        let light = folder(&panel, "Point light 2");
        assert_eq!(light.keys(), vec!["color", "intensity", "helper_visible", "cast_shadow", "enabled"]);

        editor
            .set_param(PanelTarget::PointLightPosition(1), "x", ParamValue::Float(-5.0))
            .unwrap();
        editor
            .set_param(PanelTarget::PointLight(1), "intensity", ParamValue::Float(20.0))
            .unwrap();
        assert_eq!(editor.scene.point_lights[1].position.x, -5.0);
        assert_eq!(editor.scene.point_lights[1].intensity, 10.0);
    }

    #[test]
    fn test_camera_reset_action() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::CameraPosition, "z", ParamValue::Float(9.0))
            .unwrap();
        editor.set_param(PanelTarget::Camera, "fov", ParamValue::Float(40.0)).unwrap();
        editor.trigger(PanelTarget::Camera, "reset").unwrap();

        let defaults = EditorConfig::default().camera;
        assert_eq!(editor.scene.camera.transform.position.z, defaults.position[2]);
        assert_eq!(editor.scene.camera.fov, defaults.fov);
        assert_eq!(editor.scene.camera.transform.rotation, cgmath::Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_environment_controls_follow_fog_mode() {
        let mut editor = editor();
        editor
            .set_param(PanelTarget::Environment, "fog", ParamValue::Choice(2))
            .unwrap();
        let panel = editor.panel();
        let keys = folder(&panel, "Environment").keys();
        assert!(keys.contains(&"fog_density"));
        assert!(!keys.contains(&"fog_near"));
    }

    #[test]
    fn test_animation_actions() {
        let mut editor = editor();
        editor.trigger(PanelTarget::Animation, "animation2").unwrap();
        assert!(editor.animation.is_playing());
        assert!(matches!(
            editor.set_param(PanelTarget::Mesh, "mode", ParamValue::Choice(1)),
            Err(EditorError::AnimationPlaying)
        ));
        editor.trigger(PanelTarget::Animation, "pause").unwrap();
        editor.trigger(PanelTarget::Animation, "stop").unwrap();
        assert!(!editor.animation.is_playing());
    }

    #[test]
    fn test_rejected_input() {
        let mut editor = editor();
        assert!(matches!(
            editor.set_param(PanelTarget::Geometry, "nope", ParamValue::Float(1.0)),
            Err(EditorError::UnknownParam { .. })
        ));
        assert!(matches!(
            editor.set_param(PanelTarget::Mesh, "mode", ParamValue::Float(1.0)),
            Err(EditorError::ParamType { .. })
        ));
        assert!(matches!(
            editor.trigger(PanelTarget::Animation, "rewind"),
            Err(EditorError::UnknownParam { .. })
        ));
        assert!(matches!(
            editor.set_param(PanelTarget::Animation, "stop", ParamValue::Bool(true)),
            Err(EditorError::UnknownParam { .. })
        ));
        // dropped with a warning
        editor.apply_edit(PanelTarget::Geometry, "nope", ParamValue::Float(1.0));
    }
}
