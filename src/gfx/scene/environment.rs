//! Background color and fog

use crate::error::{EditorError, Result};
use crate::gfx::color::Rgb;
use crate::ui::reflect::{unknown_param, Control, ControlKind, ParamField, ParamValue, Reflect};

pub const DEFAULT_FOG_NEAR: f32 = 1.0;
pub const DEFAULT_FOG_FAR: f32 = 100.0;
pub const DEFAULT_FOG_DENSITY: f32 = 0.0005;

/// Fog model, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FogMode {
    #[default]
    None,
    Linear,
    Exponential,
}

impl FogMode {
    pub const LABELS: &'static [&'static str] = &["None", "Linear", "Exponential"];

    /// Index used by the shader.
    pub fn index(self) -> u32 {
        self as u32
    }
}

impl ParamField for FogMode {
    const EXPECTED: &'static str = "choice";

    fn to_param(&self) -> ParamValue {
        ParamValue::Choice(*self as usize)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Choice(0) => Some(FogMode::None),
            ParamValue::Choice(1) => Some(FogMode::Linear),
            ParamValue::Choice(2) => Some(FogMode::Exponential),
            _ => None,
        }
    }
}

/// Background, ground and fog settings shared by the whole scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub clear_color: Rgb,
    pub alpha: f32,
    pub fog: FogMode,
    pub fog_color: Rgb,
    pub fog_near: f32,
    pub fog_far: f32,
    pub fog_density: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            clear_color: Rgb(0x24282a),
            alpha: 1.0,
            fog: FogMode::None,
            fog_color: Rgb::WHITE,
            fog_near: DEFAULT_FOG_NEAR,
            fog_far: DEFAULT_FOG_FAR,
            fog_density: DEFAULT_FOG_DENSITY,
        }
    }
}

impl Environment {
    /// Switching fog mode starts the new fog from its default parameters.
    pub fn set_fog_mode(&mut self, mode: FogMode) {
        self.fog = mode;
        self.fog_near = DEFAULT_FOG_NEAR;
        self.fog_far = DEFAULT_FOG_FAR;
        self.fog_density = DEFAULT_FOG_DENSITY;
    }

    /// Clear color for the surface. The surface is not sRGB, so the stored
    /// color is passed through unchanged.
    pub fn clear_value(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color.to_srgb();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: self.alpha.clamp(0.0, 1.0) as f64,
        }
    }
}

fn float(key: &str, value: ParamValue) -> Result<f32> {
    f32::from_param(value).ok_or_else(|| EditorError::ParamType {
        key: key.to_string(),
        expected: f32::EXPECTED,
    })
}

fn color(key: &str, value: ParamValue) -> Result<Rgb> {
    Rgb::from_param(value).ok_or_else(|| EditorError::ParamType {
        key: key.to_string(),
        expected: Rgb::EXPECTED,
    })
}

/// The fog controls depend on the fog mode.
impl Reflect for Environment {
    fn controls(&self) -> Vec<Control> {
        let mut controls = vec![
            Control {
                key: "clear_color",
                label: "bground color",
                kind: ControlKind::Color,
            },
            Control {
                key: "alpha",
                label: "alpha",
                kind: ControlKind::Slider(0.0, 1.0, 0.01),
            },
            Control {
                key: "fog",
                label: "fog",
                kind: ControlKind::Choice(FogMode::LABELS),
            },
        ];
        if self.fog != FogMode::None {
            controls.push(Control {
                key: "fog_color",
                label: "fog color",
                kind: ControlKind::Color,
            });
        }
        match self.fog {
            FogMode::None => {}
            FogMode::Linear => {
                controls.push(Control {
                    key: "fog_near",
                    label: "near",
                    kind: ControlKind::Drag(0.01),
                });
                controls.push(Control {
                    key: "fog_far",
                    label: "far",
                    kind: ControlKind::Drag(0.01),
                });
            }
            FogMode::Exponential => controls.push(Control {
                key: "fog_density",
                label: "density",
                kind: ControlKind::Slider(0.0, 0.1, 0.001),
            }),
        }
        controls
    }

    fn get(&self, key: &str) -> Option<ParamValue> {
        if !self.controls().iter().any(|c| c.key == key) {
            return None;
        }
        match key {
            "clear_color" => Some(self.clear_color.to_param()),
            "alpha" => Some(self.alpha.to_param()),
            "fog" => Some(self.fog.to_param()),
            "fog_color" => Some(self.fog_color.to_param()),
            "fog_near" => Some(self.fog_near.to_param()),
            "fog_far" => Some(self.fog_far.to_param()),
            "fog_density" => Some(self.fog_density.to_param()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: ParamValue) -> Result<()> {
        let Some(control) = self.controls().into_iter().find(|c| c.key == key) else {
            return Err(unknown_param(key));
        };
        let value = control.kind.clamp(value);
        match key {
            "clear_color" => self.clear_color = color(key, value)?,
            "alpha" => self.alpha = float(key, value)?,
            "fog" => {
                let mode = FogMode::from_param(value).ok_or_else(|| EditorError::ParamType {
                    key: key.to_string(),
                    expected: FogMode::EXPECTED,
                })?;
                if mode != self.fog {
                    self.set_fog_mode(mode);
                }
            }
            "fog_color" => self.fog_color = color(key, value)?,
            "fog_near" => self.fog_near = float(key, value)?.max(0.0),
            "fog_far" => self.fog_far = float(key, value)?.max(0.0),
            "fog_density" => self.fog_density = float(key, value)?,
            _ => return Err(unknown_param(key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_controls_follow_mode() {
        let mut env = Environment::default();
        assert_eq!(env.keys(), vec!["clear_color", "alpha", "fog"]);

        env.set("fog", ParamValue::Choice(1)).unwrap();
        assert_eq!(env.keys(), vec!["clear_color", "alpha", "fog", "fog_color", "fog_near", "fog_far"]);

        env.set("fog", ParamValue::Choice(2)).unwrap();
        assert!(env.keys().contains(&"fog_density"));
        assert!(env.set("fog_near", ParamValue::Float(3.0)).is_err());
    }

    #[test]
    fn test_mode_change_resets_fog_parameters() {
        let mut env = Environment::default();
        env.set("fog", ParamValue::Choice(1)).unwrap();
        env.set("fog_far", ParamValue::Float(20.0)).unwrap();
        env.set("fog_near", ParamValue::Float(-4.0)).unwrap();
        assert_eq!(env.fog_far, 20.0);
        assert_eq!(env.fog_near, 0.0);

        env.set("fog", ParamValue::Choice(2)).unwrap();
        env.set("fog", ParamValue::Choice(1)).unwrap();
        assert_eq!(env.fog_far, DEFAULT_FOG_FAR);
    }

    #[test]
    fn test_clear_value_uses_stored_color() {
        let env = Environment::default();
        let c = env.clear_value();
        assert!((c.r - 0x24 as f64 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }
}
