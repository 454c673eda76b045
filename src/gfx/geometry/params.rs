//! Parameter records for each primitive kind
//!
//! The editor keeps one record per kind for the whole session, so switching
//! kinds and back restores the values last entered for that kind.

use std::f32::consts::{PI, TAU};

use crate::error::{EditorError, Result};
use crate::ui::reflect::reflect_fields;

use super::{primitives, teapot, GeometryData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryKind {
    Sphere,
    Cylinder,
    Cone,
    Box,
    #[default]
    Torus,
    Teapot,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 6] = [
        GeometryKind::Sphere,
        GeometryKind::Cylinder,
        GeometryKind::Cone,
        GeometryKind::Box,
        GeometryKind::Torus,
        GeometryKind::Teapot,
    ];

    pub const LABELS: &'static [&'static str] =
        &["Sphere", "Cylinder", "Cone", "Box", "Torus", "Teapot"];

    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_label(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(name))
            .ok_or_else(|| EditorError::UnknownKind {
                what: "geometry",
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 32,
            phi_start: 0.0,
            phi_length: TAU,
            theta_start: 0.0,
            theta_length: PI,
        }
    }
}

reflect_fields!(SphereParams {
    radius => "radius": Slider(0.1, 10.0, 0.1),
    width_segments => "widthSegments": Int(3, 32),
    height_segments => "heightSegments": Int(2, 32),
    phi_start => "phiStart": Slider(0.0, TAU, 0.1),
    phi_length => "phiLength": Slider(0.0, TAU, 0.1),
    theta_start => "thetaStart": Slider(0.0, TAU, 0.1),
    theta_length => "thetaLength": Slider(0.0, TAU, 0.1),
});

#[derive(Debug, Clone, PartialEq)]
pub struct CylinderParams {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 3.0,
            radial_segments: 32,
            height_segments: 32,
            open_ended: false,
            theta_start: 0.0,
            theta_length: TAU,
        }
    }
}

reflect_fields!(CylinderParams {
    radius_top => "radiusTop": Slider(0.0, 10.0, 0.1),
    radius_bottom => "radiusBottom": Slider(0.0, 10.0, 0.1),
    height => "height": Slider(0.1, 10.0, 0.1),
    radial_segments => "radialSegments": Int(3, 64),
    height_segments => "heightSegments": Int(1, 64),
    open_ended => "openEnded": Toggle,
    theta_start => "thetaStart": Slider(0.0, TAU, 0.1),
    theta_length => "thetaLength": Slider(0.0, TAU, 0.1),
});

#[derive(Debug, Clone, PartialEq)]
pub struct ConeParams {
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for ConeParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 3.0,
            radial_segments: 32,
            height_segments: 32,
            open_ended: false,
            theta_start: 0.0,
            theta_length: TAU,
        }
    }
}

reflect_fields!(ConeParams {
    radius => "radius": Slider(0.0, 10.0, 0.1),
    height => "height": Slider(0.1, 10.0, 0.1),
    radial_segments => "radialSegments": Int(3, 64),
    height_segments => "heightSegments": Int(1, 64),
    open_ended => "openEnded": Toggle,
    theta_start => "thetaStart": Slider(0.0, TAU, 0.1),
    theta_length => "thetaLength": Slider(0.0, TAU, 0.1),
});

#[derive(Debug, Clone, PartialEq)]
pub struct TorusParams {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub arc: f32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.2,
            radial_segments: 16,
            tubular_segments: 100,
            arc: TAU,
        }
    }
}

reflect_fields!(TorusParams {
    radius => "radius": Slider(0.1, 10.0, 0.1),
    tube => "tube": Slider(0.1, 10.0, 0.1),
    radial_segments => "radialSegments": Int(2, 30),
    tubular_segments => "tubularSegments": Int(3, 200),
    arc => "arc": Slider(0.0, TAU, 0.1),
});

#[derive(Debug, Clone, PartialEq)]
pub struct BoxParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }
}

reflect_fields!(BoxParams {
    width => "width": Slider(0.1, 10.0, 0.1),
    height => "height": Slider(0.1, 10.0, 0.1),
    depth => "depth": Slider(0.1, 10.0, 0.1),
    width_segments => "widthSegments": Int(1, 10),
    height_segments => "heightSegments": Int(1, 10),
    depth_segments => "depthSegments": Int(1, 10),
});

#[derive(Debug, Clone, PartialEq)]
pub struct TeapotParams {
    pub size: f32,
    pub segments: u32,
    pub bottom: bool,
    pub lid: bool,
    pub body: bool,
    pub fit_lid: bool,
    pub blinn: bool,
}

impl Default for TeapotParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            segments: 10,
            bottom: true,
            lid: true,
            body: true,
            fit_lid: true,
            blinn: true,
        }
    }
}

reflect_fields!(TeapotParams {
    size => "size": Slider(0.1, 10.0, 0.1),
    segments => "segments": Int(2, 50),
    bottom => "bottom": Toggle,
    lid => "lid": Toggle,
    body => "body": Toggle,
    fit_lid => "fitLid": Toggle,
    blinn => "blinn": Toggle,
});

/// One record per primitive kind plus the active kind.
#[derive(Debug, Clone, Default)]
pub struct GeometrySettings {
    pub kind: GeometryKind,
    pub sphere: SphereParams,
    pub cylinder: CylinderParams,
    pub cone: ConeParams,
    pub torus: TorusParams,
    pub cuboid: BoxParams,
    pub teapot: TeapotParams,
}

impl GeometrySettings {
    /// Builds the active kind's geometry from its record.
    pub fn build(&self) -> GeometryData {
        match self.kind {
            GeometryKind::Sphere => primitives::generate_sphere(&self.sphere),
            GeometryKind::Cylinder => primitives::generate_cylinder(&self.cylinder),
            GeometryKind::Cone => primitives::generate_cone(&self.cone),
            GeometryKind::Box => primitives::generate_box(&self.cuboid),
            GeometryKind::Torus => primitives::generate_torus(&self.torus),
            GeometryKind::Teapot => teapot::generate_teapot(&self.teapot),
        }
    }

    /// The active kind's record, for the panel.
    pub fn active(&self) -> &dyn crate::ui::reflect::Reflect {
        match self.kind {
            GeometryKind::Sphere => &self.sphere,
            GeometryKind::Cylinder => &self.cylinder,
            GeometryKind::Cone => &self.cone,
            GeometryKind::Box => &self.cuboid,
            GeometryKind::Torus => &self.torus,
            GeometryKind::Teapot => &self.teapot,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn crate::ui::reflect::Reflect {
        match self.kind {
            GeometryKind::Sphere => &mut self.sphere,
            GeometryKind::Cylinder => &mut self.cylinder,
            GeometryKind::Cone => &mut self.cone,
            GeometryKind::Box => &mut self.cuboid,
            GeometryKind::Torus => &mut self.torus,
            GeometryKind::Teapot => &mut self.teapot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::reflect::{ControlKind, ParamValue, Reflect};

    #[test]
    fn test_initial_kind_is_torus() {
        let settings = GeometrySettings::default();
        assert_eq!(settings.kind, GeometryKind::Torus);
        assert_eq!(
            settings.active().keys(),
            vec!["radius", "tube", "radial_segments", "tubular_segments", "arc"]
        );
    }

    #[test]
    fn test_labels_round_trip() {
        for kind in GeometryKind::ALL {
            assert_eq!(GeometryKind::from_label(kind.label()).unwrap(), kind);
            assert_eq!(GeometryKind::from_index(kind.index()), Some(kind));
        }
        assert!(matches!(
            GeometryKind::from_label("icosahedron"),
            Err(EditorError::UnknownKind { what: "geometry", .. })
        ));
    }

    #[test]
    fn test_segment_ranges() {
        let sphere = SphereParams::default();
        let controls = sphere.controls();
        let width = controls.iter().find(|c| c.key == "width_segments").unwrap();
        assert_eq!(width.kind, ControlKind::Int(3, 32));
        assert_eq!(width.label, "widthSegments");
    }

    #[test]
    fn test_editing_inactive_record_is_kept() {
        let mut settings = GeometrySettings::default();
        settings.kind = GeometryKind::Box;
        settings.active_mut().set("width", ParamValue::Float(4.0)).unwrap();
        settings.kind = GeometryKind::Sphere;
        settings.kind = GeometryKind::Box;
        assert_eq!(settings.cuboid.width, 4.0);
    }
}
