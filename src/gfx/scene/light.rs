//! Scene lights: three point lights and one ambient term

use cgmath::Vector3;

use crate::gfx::color::Rgb;
use crate::ui::reflect::reflect_fields;

pub const POINT_LIGHT_COUNT: usize = 3;

/// Radius of the wire sphere marking a point light.
pub const LIGHT_HELPER_RADIUS: f32 = 0.5;

/// An omnidirectional light with an optional wire-sphere marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: Rgb,
    pub intensity: f32,
    pub helper_visible: bool,
    pub cast_shadow: bool,
    pub enabled: bool,
}

reflect_fields!(PointLight {
    color => "color": Color,
    intensity => "intensity": Slider(0.0, 10.0, 0.1),
    helper_visible => "helper": Toggle,
    cast_shadow => "cast shadow": Toggle,
    enabled => "enabled": Toggle,
});

impl PointLight {
    /// Creates a white light of unit intensity.
    ///
    /// # Arguments
    ///
    /// * `position` - World-space position
    /// * `enabled` - Whether the light starts switched on; the helper follows it
    pub fn new(position: Vector3<f32>, enabled: bool) -> Self {
        Self {
            position,
            color: Rgb::WHITE,
            intensity: 1.0,
            helper_visible: enabled,
            cast_shadow: true,
            enabled,
        }
    }

    /// The initial light rig: only the first light is on.
    pub fn default_rig() -> [PointLight; POINT_LIGHT_COUNT] {
        [
            PointLight::new(Vector3::new(2.0, 3.0, 4.0), true),
            PointLight::new(Vector3::new(-2.0, 3.0, -4.0), false),
            PointLight::new(Vector3::new(-2.0, 3.0, 4.0), false),
        ]
    }

    /// Whether this light needs a shadow map layer this frame.
    pub fn casts_shadow(&self) -> bool {
        self.enabled && self.cast_shadow && self.intensity > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
    pub enabled: bool,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Rgb(0x404040),
            intensity: 1.0,
            enabled: false,
        }
    }
}

reflect_fields!(AmbientLight {
    color => "color": Color,
    intensity => "intensity": Slider(0.0, 10.0, 0.1),
    enabled => "enabled": Toggle,
});

impl AmbientLight {
    /// Linear radiance added to every lit surface.
    pub fn radiance(&self) -> [f32; 3] {
        if !self.enabled {
            return [0.0; 3];
        }
        self.color.to_linear().map(|c| c * self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::reflect::{ParamValue, Reflect};

    #[test]
    fn test_default_rig() {
        let rig = PointLight::default_rig();
        assert_eq!(rig[0].position, Vector3::new(2.0, 3.0, 4.0));
        assert!(rig[0].enabled && rig[0].helper_visible);
        assert!(!rig[1].enabled && !rig[1].helper_visible);
        assert!(!rig[2].enabled);
        assert!(rig.iter().all(|l| l.cast_shadow && l.intensity == 1.0));
    }

    #[test]
    fn test_intensity_is_clamped() {
        let mut light = PointLight::new(Vector3::new(0.0, 0.0, 0.0), true);
        light.set("intensity", ParamValue::Float(25.0)).unwrap();
        assert_eq!(light.intensity, 10.0);
    }

    #[test]
    fn test_disabled_ambient_adds_nothing() {
        let mut ambient = AmbientLight::default();
        assert_eq!(ambient.radiance(), [0.0; 3]);
        ambient.enabled = true;
        ambient.intensity = 2.0;
        assert!(ambient.radiance()[0] > 0.0);
    }
}
