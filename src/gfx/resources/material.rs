//! Material parameter records
//!
//! One record per material kind keeps its own values while other kinds are
//! active. [`MaterialSettings::build`] resolves the active record into the
//! [`Material`] instance carried by the mesh.

use super::texture_map::TextureMap;
use crate::error::{EditorError, Result};
use crate::gfx::color::Rgb;
use crate::gfx::scene::mesh::DrawMode;
use crate::ui::reflect::{reflect_fields, unknown_param, Control, ControlKind, ParamField, ParamValue, Reflect};

pub const CHOOSE_MAP_ACTION: &str = "choose_map";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Basic,
    Standard,
    Phong,
    LineBasic,
    Points,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 5] = [
        MaterialKind::Basic,
        MaterialKind::Standard,
        MaterialKind::Phong,
        MaterialKind::LineBasic,
        MaterialKind::Points,
    ];

    const SOLID: &'static [MaterialKind] = &[MaterialKind::Basic, MaterialKind::Standard, MaterialKind::Phong];
    const SOLID_LABELS: &'static [&'static str] = &["Mesh Basic", "Mesh Standard", "Mesh Phong"];

    pub fn label(self) -> &'static str {
        match self {
            MaterialKind::Basic => "Mesh Basic",
            MaterialKind::Standard => "Mesh Standard",
            MaterialKind::Phong => "Mesh Phong",
            MaterialKind::LineBasic => "Line Basic",
            MaterialKind::Points => "Points",
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == label)
            .ok_or_else(|| EditorError::UnknownKind {
                what: "material",
                name: label.to_string(),
            })
    }

    /// Kinds offered by the material selector in `mode`.
    pub fn choices(mode: DrawMode) -> &'static [MaterialKind] {
        match mode {
            DrawMode::Solid => Self::SOLID,
            DrawMode::Line => &[MaterialKind::LineBasic],
            DrawMode::Point => &[MaterialKind::Points],
        }
    }

    pub fn choice_labels(mode: DrawMode) -> &'static [&'static str] {
        match mode {
            DrawMode::Solid => Self::SOLID_LABELS,
            DrawMode::Line => &["Line Basic"],
            DrawMode::Point => &["Points"],
        }
    }

    pub fn default_for(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Solid => MaterialKind::Standard,
            DrawMode::Line => MaterialKind::LineBasic,
            DrawMode::Point => MaterialKind::Points,
        }
    }

    pub fn available_in(self, mode: DrawMode) -> bool {
        Self::choices(mode).contains(&self)
    }
}

/// Which faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub const LABELS: &'static [&'static str] = &["Front", "Back", "Double"];

    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

impl ParamField for Side {
    const EXPECTED: &'static str = "choice";

    fn to_param(&self) -> ParamValue {
        ParamValue::Choice(*self as usize)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Choice(0) => Some(Side::Front),
            ParamValue::Choice(1) => Some(Side::Back),
            ParamValue::Choice(2) => Some(Side::Double),
            _ => None,
        }
    }
}

/// Flags shared by every material kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFlags {
    pub transparent: bool,
    pub opacity: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub visible: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            transparent: false,
            opacity: 1.0,
            depth_test: true,
            depth_write: true,
            visible: true,
        }
    }
}

reflect_fields!(RenderFlags {
    transparent => "transparent": Toggle,
    opacity => "opacity": Slider(0.0, 1.0, 0.01),
    depth_test => "depth test": Toggle,
    depth_write => "depth write": Toggle,
    visible => "visible": Toggle,
});

impl RenderFlags {
    /// Opacity only applies to transparent materials.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Texture slot of the mesh material kinds. The texture is kept while
/// `apply` is off so it can be toggled back on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapSlot {
    pub texture: Option<TextureMap>,
    pub apply: bool,
}

impl MapSlot {
    pub fn active(&self) -> Option<&TextureMap> {
        self.texture.as_ref().filter(|_| self.apply)
    }
}

impl Reflect for MapSlot {
    fn controls(&self) -> Vec<Control> {
        vec![
            Control {
                key: "apply_map",
                label: "apply map",
                kind: ControlKind::Toggle,
            },
            Control::action(CHOOSE_MAP_ACTION, "choose map"),
        ]
    }

    fn get(&self, key: &str) -> Option<ParamValue> {
        match key {
            "apply_map" => Some(self.apply.to_param()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: ParamValue) -> Result<()> {
        match key {
            "apply_map" => {
                self.apply = bool::from_param(value).ok_or_else(|| EditorError::ParamType {
                    key: key.to_string(),
                    expected: bool::EXPECTED,
                })?;
                Ok(())
            }
            _ => Err(unknown_param(key)),
        }
    }
}

/// Unlit color, optionally textured.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicMaterial {
    pub color: Rgb,
    pub vertex_colors: bool,
    pub side: Side,
    pub wireframe: bool,
    pub map: MapSlot,
    pub flags: RenderFlags,
}

reflect_fields!(BasicMaterial {
    color => "color": Color,
    vertex_colors => "vertex colors": Toggle,
    side => "side": Choice(Side::LABELS),
    wireframe => "wireframe": Toggle,
} + map + flags);

/// Metallic-roughness shading.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: Rgb,
    pub vertex_colors: bool,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Rgb,
    pub side: Side,
    pub flat_shading: bool,
    pub wireframe: bool,
    pub map: MapSlot,
    pub flags: RenderFlags,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            vertex_colors: false,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Rgb::BLACK,
            side: Side::Front,
            flat_shading: false,
            wireframe: false,
            map: MapSlot::default(),
            flags: RenderFlags::default(),
        }
    }
}

reflect_fields!(StandardMaterial {
    color => "color": Color,
    vertex_colors => "vertex colors": Toggle,
    roughness => "roughness": Slider(0.0, 1.0, 0.01),
    metalness => "metalness": Slider(0.0, 1.0, 0.01),
    emissive => "emissive": Color,
    side => "side": Choice(Side::LABELS),
    flat_shading => "flat shading": Toggle,
    wireframe => "wireframe": Toggle,
} + map + flags);

/// Blinn-Phong shading with a specular color and shininess.
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    pub color: Rgb,
    pub vertex_colors: bool,
    pub specular: Rgb,
    pub shininess: f32,
    pub emissive: Rgb,
    pub side: Side,
    pub flat_shading: bool,
    pub wireframe: bool,
    pub map: MapSlot,
    pub flags: RenderFlags,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            vertex_colors: false,
            specular: Rgb(0x111111),
            shininess: 30.0,
            emissive: Rgb::BLACK,
            side: Side::Front,
            flat_shading: false,
            wireframe: false,
            map: MapSlot::default(),
            flags: RenderFlags::default(),
        }
    }
}

reflect_fields!(PhongMaterial {
    color => "color": Color,
    vertex_colors => "vertex colors": Toggle,
    specular => "specular": Color,
    shininess => "shininess": Slider(0.0, 100.0, 1.0),
    emissive => "emissive": Color,
    side => "side": Choice(Side::LABELS),
    flat_shading => "flat shading": Toggle,
    wireframe => "wireframe": Toggle,
} + map + flags);

/// Lines are always rasterized one pixel wide; the width is shown for
/// reference only.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMaterial {
    pub color: Rgb,
    pub vertex_colors: bool,
    pub line_width: f32,
    pub side: Side,
    pub flags: RenderFlags,
}

impl Default for LineMaterial {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            vertex_colors: false,
            line_width: 1.0,
            side: Side::Front,
            flags: RenderFlags::default(),
        }
    }
}

reflect_fields!(LineMaterial {
    color => "color": Color,
    vertex_colors => "vertex colors": Toggle,
    line_width => "line width": Slider(1.0, 1.0, 1.0),
    side => "side": Choice(Side::LABELS),
} + flags);

#[derive(Debug, Clone, PartialEq)]
pub struct PointsMaterial {
    pub color: Rgb,
    pub vertex_colors: bool,
    /// World-space size when attenuated, pixels otherwise
    pub size: f32,
    pub size_attenuation: bool,
    pub side: Side,
    pub flags: RenderFlags,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            vertex_colors: false,
            size: 0.003,
            size_attenuation: true,
            side: Side::Front,
            flags: RenderFlags::default(),
        }
    }
}

reflect_fields!(PointsMaterial {
    color => "color": Color,
    vertex_colors => "vertex colors": Toggle,
    size => "size": Slider(0.001, 0.01, 0.001),
    size_attenuation => "sizeAttenuation": Toggle,
    side => "side": Choice(Side::LABELS),
} + flags);

/// Resolved material carried by the mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic(BasicMaterial),
    Standard(StandardMaterial),
    Phong(PhongMaterial),
    LineBasic(LineMaterial),
    Points(PointsMaterial),
}

impl Default for Material {
    fn default() -> Self {
        Material::Standard(StandardMaterial::default())
    }
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Basic(_) => MaterialKind::Basic,
            Material::Standard(_) => MaterialKind::Standard,
            Material::Phong(_) => MaterialKind::Phong,
            Material::LineBasic(_) => MaterialKind::LineBasic,
            Material::Points(_) => MaterialKind::Points,
        }
    }

    pub fn flags(&self) -> &RenderFlags {
        match self {
            Material::Basic(m) => &m.flags,
            Material::Standard(m) => &m.flags,
            Material::Phong(m) => &m.flags,
            Material::LineBasic(m) => &m.flags,
            Material::Points(m) => &m.flags,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Material::Basic(m) => m.color,
            Material::Standard(m) => m.color,
            Material::Phong(m) => m.color,
            Material::LineBasic(m) => m.color,
            Material::Points(m) => m.color,
        }
    }

    /// Whether vertex colors modulate the material color.
    pub fn vertex_colors(&self) -> bool {
        match self {
            Material::Basic(m) => m.vertex_colors,
            Material::Standard(m) => m.vertex_colors,
            Material::Phong(m) => m.vertex_colors,
            Material::LineBasic(m) => m.vertex_colors,
            Material::Points(m) => m.vertex_colors,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Material::Basic(m) => m.side,
            Material::Standard(m) => m.side,
            Material::Phong(m) => m.side,
            Material::LineBasic(m) => m.side,
            Material::Points(m) => m.side,
        }
    }

    pub fn wireframe(&self) -> bool {
        match self {
            Material::Basic(m) => m.wireframe,
            Material::Standard(m) => m.wireframe,
            Material::Phong(m) => m.wireframe,
            _ => false,
        }
    }

    pub fn flat_shading(&self) -> bool {
        match self {
            Material::Standard(m) => m.flat_shading,
            Material::Phong(m) => m.flat_shading,
            _ => false,
        }
    }

    pub fn emissive(&self) -> Rgb {
        match self {
            Material::Standard(m) => m.emissive,
            Material::Phong(m) => m.emissive,
            _ => Rgb::BLACK,
        }
    }

    /// The texture drawn by the material, if one is assigned and applied.
    pub fn map(&self) -> Option<&TextureMap> {
        match self {
            Material::Basic(m) => m.map.active(),
            Material::Standard(m) => m.map.active(),
            Material::Phong(m) => m.map.active(),
            _ => None,
        }
    }
}

/// Every material record plus the selected kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSettings {
    pub kind: MaterialKind,
    pub basic: BasicMaterial,
    pub standard: StandardMaterial,
    pub phong: PhongMaterial,
    pub line: LineMaterial,
    pub points: PointsMaterial,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Standard,
            basic: BasicMaterial::default(),
            standard: StandardMaterial::default(),
            phong: PhongMaterial::default(),
            line: LineMaterial::default(),
            points: PointsMaterial::default(),
        }
    }
}

impl MaterialSettings {
    /// Resolves the active record into the material carried by the mesh.
    pub fn build(&self) -> Material {
        match self.kind {
            MaterialKind::Basic => Material::Basic(self.basic.clone()),
            MaterialKind::Standard => Material::Standard(self.standard.clone()),
            MaterialKind::Phong => Material::Phong(self.phong.clone()),
            MaterialKind::LineBasic => Material::LineBasic(self.line.clone()),
            MaterialKind::Points => Material::Points(self.points.clone()),
        }
    }

    /// Switches the active kind, rejecting kinds the draw mode does not offer.
    pub fn select(&mut self, kind: MaterialKind, mode: DrawMode) -> Result<()> {
        if !kind.available_in(mode) {
            return Err(EditorError::MaterialUnavailable {
                material: kind.label(),
                mode,
            });
        }
        self.kind = kind;
        Ok(())
    }

    /// Selects the default kind of `mode` after a draw mode change. The
    /// records themselves keep their values.
    pub fn reset_for_mode(&mut self, mode: DrawMode) {
        self.kind = MaterialKind::default_for(mode);
    }

    /// The active record as seen by the panel
    pub fn active(&self) -> &dyn Reflect {
        match self.kind {
            MaterialKind::Basic => &self.basic,
            MaterialKind::Standard => &self.standard,
            MaterialKind::Phong => &self.phong,
            MaterialKind::LineBasic => &self.line,
            MaterialKind::Points => &self.points,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn Reflect {
        match self.kind {
            MaterialKind::Basic => &mut self.basic,
            MaterialKind::Standard => &mut self.standard,
            MaterialKind::Phong => &mut self.phong,
            MaterialKind::LineBasic => &mut self.line,
            MaterialKind::Points => &mut self.points,
        }
    }

    pub fn flags(&self) -> &RenderFlags {
        match self.kind {
            MaterialKind::Basic => &self.basic.flags,
            MaterialKind::Standard => &self.standard.flags,
            MaterialKind::Phong => &self.phong.flags,
            MaterialKind::LineBasic => &self.line.flags,
            MaterialKind::Points => &self.points.flags,
        }
    }

    pub fn flags_mut(&mut self) -> &mut RenderFlags {
        match self.kind {
            MaterialKind::Basic => &mut self.basic.flags,
            MaterialKind::Standard => &mut self.standard.flags,
            MaterialKind::Phong => &mut self.phong.flags,
            MaterialKind::LineBasic => &mut self.line.flags,
            MaterialKind::Points => &mut self.points.flags,
        }
    }

    /// Stores a decoded texture in the active record's map slot. Returns
    /// false when the active kind has no map slot.
    pub fn assign_map(&mut self, texture: TextureMap) -> bool {
        let slot = match self.kind {
            MaterialKind::Basic => &mut self.basic.map,
            MaterialKind::Standard => &mut self.standard.map,
            MaterialKind::Phong => &mut self.phong.map,
            MaterialKind::LineBasic | MaterialKind::Points => return false,
        };
        slot.texture = Some(texture);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_follow_draw_mode() {
        assert_eq!(
            MaterialKind::choice_labels(DrawMode::Solid),
            &["Mesh Basic", "Mesh Standard", "Mesh Phong"]
        );
        for mode in [DrawMode::Solid, DrawMode::Line, DrawMode::Point] {
            let kind = MaterialKind::default_for(mode);
            assert!(kind.available_in(mode));
            let labels: Vec<_> = MaterialKind::choices(mode).iter().map(|k| k.label()).collect();
            assert_eq!(labels, MaterialKind::choice_labels(mode));
        }
    }

    #[test]
    fn test_select_rejects_unavailable_kind() {
        let mut settings = MaterialSettings::default();
        assert!(matches!(
            settings.select(MaterialKind::Points, DrawMode::Solid),
            Err(EditorError::MaterialUnavailable { .. })
        ));
        assert_eq!(settings.kind, MaterialKind::Standard);
        settings.select(MaterialKind::Phong, DrawMode::Solid).unwrap();
        assert_eq!(settings.build().kind(), MaterialKind::Phong);
    }

    #[test]
    fn test_unknown_label() {
        assert!(MaterialKind::from_label("Mesh Toon").is_err());
        assert_eq!(MaterialKind::from_label("Line Basic").unwrap(), MaterialKind::LineBasic);
    }

    #[test]
    fn test_record_panels_include_map_and_flags() {
        let settings = MaterialSettings::default();
        let keys = settings.active().keys();
        assert_eq!(
            keys,
            vec![
                "color",
                "roughness",
                "metalness",
                "emissive",
                "side",
                "flat_shading",
                "wireframe",
                "apply_map",
                CHOOSE_MAP_ACTION,
                "transparent",
                "opacity",
                "depth_test",
                "depth_write",
                "visible",
            ]
        );
        // line and point kinds have no map slot and no wireframe toggle
        let line_keys = LineMaterial::default().keys();
        assert!(!line_keys.contains(&"wireframe"));
        assert!(!line_keys.contains(&"apply_map"));
    }

    #[test]
    fn test_nested_fields_are_settable() {
        let mut settings = MaterialSettings::default();
        settings.active_mut().set("opacity", ParamValue::Float(0.4)).unwrap();
        settings.active_mut().set("side", ParamValue::Choice(2)).unwrap();
        settings.active_mut().set("apply_map", ParamValue::Bool(true)).unwrap();
        assert_eq!(settings.standard.flags.opacity, 0.4);
        assert_eq!(settings.standard.side, Side::Double);
        assert!(settings.standard.map.apply);
        assert_eq!(settings.active().get("opacity"), Some(ParamValue::Float(0.4)));
        assert!(settings.active_mut().set(CHOOSE_MAP_ACTION, ParamValue::Bool(true)).is_err());
    }

    #[test]
    fn test_map_only_applies_when_enabled() {
        let mut settings = MaterialSettings::default();
        let texture = TextureMap::from_rgba("t.png", 1, 1, vec![255; 4], false);
        assert!(settings.assign_map(texture.clone()));
        assert!(settings.build().map().is_none());

        settings.standard.map.apply = true;
        assert_eq!(settings.build().map(), Some(&texture));

        settings.reset_for_mode(DrawMode::Point);
        assert!(!settings.assign_map(texture));
        assert!(settings.build().map().is_none());
    }

    #[test]
    fn test_records_keep_values_across_kind_switches() {
        let mut settings = MaterialSettings::default();
        settings.standard.color = Rgb(0xff0000);
        settings.select(MaterialKind::Basic, DrawMode::Solid).unwrap();
        settings.select(MaterialKind::Standard, DrawMode::Solid).unwrap();
        assert_eq!(settings.build().color(), Rgb(0xff0000));
    }

    #[test]
    fn test_effective_opacity() {
        let mut flags = RenderFlags {
            opacity: 0.3,
            ..RenderFlags::default()
        };
        assert_eq!(flags.effective_opacity(), 1.0);
        flags.transparent = true;
        assert_eq!(flags.effective_opacity(), 0.3);
    }

    #[test]
    fn test_side_culling() {
        assert_eq!(Side::Front.cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(Side::Double.cull_mode(), None);
        assert_eq!(Side::from_param(ParamValue::Choice(1)), Some(Side::Back));
        assert_eq!(Side::from_param(ParamValue::Choice(7)), None);
    }
}
