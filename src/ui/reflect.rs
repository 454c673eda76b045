//! Field reflection for parameter records
//!
//! Every record edited through the panel describes its own controls, so the
//! panel can be rebuilt for whichever geometry or material kind is active and
//! tests can inspect the panel model without a UI context.

use crate::error::{EditorError, Result};
use crate::gfx::color::Rgb;

/// Widget kind and range for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    /// Bounded float: `(min, max, step)`
    Slider(f32, f32, f32),
    /// Unbounded float with a drag speed
    Drag(f32),
    /// Bounded integer: `(min, max)`
    Int(i32, i32),
    Toggle,
    Color,
    Choice(&'static [&'static str]),
    /// A button with no stored value
    Action,
}

impl ControlKind {
    /// Clamps a value into the control's range. Values of a different type
    /// pass through untouched and are rejected by the field.
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        match (*self, value) {
            (ControlKind::Slider(min, max, _), ParamValue::Float(v)) => {
                ParamValue::Float(v.clamp(min, max))
            }
            (ControlKind::Int(min, max), ParamValue::Int(v)) => ParamValue::Int(v.clamp(min, max)),
            (ControlKind::Choice(options), ParamValue::Choice(i)) => {
                ParamValue::Choice(i.min(options.len().saturating_sub(1)))
            }
            _ => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl Control {
    pub fn action(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ControlKind::Action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Color(Rgb),
    Choice(usize),
}

/// Conversion between a record field and a [`ParamValue`].
pub trait ParamField: Sized {
    const EXPECTED: &'static str;

    fn to_param(&self) -> ParamValue;
    fn from_param(value: ParamValue) -> Option<Self>;
}

impl ParamField for f32 {
    const EXPECTED: &'static str = "number";

    fn to_param(&self) -> ParamValue {
        ParamValue::Float(*self)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Float(v) if v.is_finite() => Some(v),
            ParamValue::Int(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl ParamField for u32 {
    const EXPECTED: &'static str = "integer";

    fn to_param(&self) -> ParamValue {
        ParamValue::Int(*self as i32)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Int(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }
}

impl ParamField for bool {
    const EXPECTED: &'static str = "boolean";

    fn to_param(&self) -> ParamValue {
        ParamValue::Bool(*self)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl ParamField for Rgb {
    const EXPECTED: &'static str = "color";

    fn to_param(&self) -> ParamValue {
        ParamValue::Color(*self)
    }

    fn from_param(value: ParamValue) -> Option<Self> {
        match value {
            ParamValue::Color(v) => Some(v),
            _ => None,
        }
    }
}

pub fn expected_of<T: ParamField>(_field: &T) -> &'static str {
    T::EXPECTED
}

/// A record whose fields can be listed, read and written by key.
pub trait Reflect {
    fn controls(&self) -> Vec<Control>;

    fn get(&self, key: &str) -> Option<ParamValue>;

    fn set(&mut self, key: &str, value: ParamValue) -> Result<()>;

    fn keys(&self) -> Vec<&'static str> {
        self.controls().iter().map(|c| c.key).collect()
    }
}

pub fn unknown_param(key: &str) -> EditorError {
    EditorError::UnknownParam {
        key: key.to_string(),
    }
}

/// Implements [`Reflect`] for a struct of [`ParamField`] fields.
///
/// Fields that are themselves [`Reflect`] can be appended after the field
/// list with `+ name`; their controls follow the struct's own.
///
/// ```ignore
/// reflect_fields!(TorusParams {
///     radius => "radius": Slider(0.1, 10.0, 0.1),
///     open_ended => "openEnded": Toggle,
/// });
/// ```
macro_rules! reflect_fields {
    ($ty:ty { $( $field:ident => $label:literal : $kind:ident $( ( $($arg:expr),* ) )? ),* $(,)? } $( + $nested:ident )*) => {
        impl $crate::ui::reflect::Reflect for $ty {
            #[allow(unused_mut)]
            fn controls(&self) -> Vec<$crate::ui::reflect::Control> {
                let mut controls = vec![
                    $(
                        $crate::ui::reflect::Control {
                            key: stringify!($field),
                            label: $label,
                            kind: $crate::ui::reflect::ControlKind::$kind $( ( $($arg),* ) )?,
                        },
                    )*
                ];
                $( controls.extend($crate::ui::reflect::Reflect::controls(&self.$nested)); )*
                controls
            }

            fn get(&self, key: &str) -> Option<$crate::ui::reflect::ParamValue> {
                match key {
                    $( stringify!($field) => Some($crate::ui::reflect::ParamField::to_param(&self.$field)), )*
                    _ => {
                        $(
                            if let Some(value) = $crate::ui::reflect::Reflect::get(&self.$nested, key) {
                                return Some(value);
                            }
                        )*
                        None
                    }
                }
            }

            fn set(
                &mut self,
                key: &str,
                value: $crate::ui::reflect::ParamValue,
            ) -> $crate::error::Result<()> {
                match key {
                    $(
                        stringify!($field) => {
                            let kind = $crate::ui::reflect::ControlKind::$kind $( ( $($arg),* ) )?;
                            let expected = $crate::ui::reflect::expected_of(&self.$field);
                            self.$field = $crate::ui::reflect::ParamField::from_param(kind.clamp(value))
                                .ok_or_else(|| $crate::error::EditorError::ParamType {
                                    key: key.to_string(),
                                    expected,
                                })?;
                            Ok(())
                        }
                    )*
                    _ => {
                        $(
                            if $crate::ui::reflect::Reflect::controls(&self.$nested)
                                .iter()
                                .any(|c| c.key == key)
                            {
                                return $crate::ui::reflect::Reflect::set(&mut self.$nested, key, value);
                            }
                        )*
                        Err($crate::ui::reflect::unknown_param(key))
                    }
                }
            }
        }
    };
}

pub(crate) use reflect_fields;

/// Position, rotation and scale triples are shown as x/y/z drags.
impl Reflect for cgmath::Vector3<f32> {
    fn controls(&self) -> Vec<Control> {
        ["x", "y", "z"]
            .into_iter()
            .map(|key| Control {
                key,
                label: key,
                kind: ControlKind::Drag(0.01),
            })
            .collect()
    }

    fn get(&self, key: &str) -> Option<ParamValue> {
        match key {
            "x" => Some(ParamValue::Float(self.x)),
            "y" => Some(ParamValue::Float(self.y)),
            "z" => Some(ParamValue::Float(self.z)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: ParamValue) -> Result<()> {
        let v = f32::from_param(value).ok_or_else(|| EditorError::ParamType {
            key: key.to_string(),
            expected: f32::EXPECTED,
        })?;
        match key {
            "x" => self.x = v,
            "y" => self.y = v,
            "z" => self.z = v,
            _ => return Err(unknown_param(key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    struct Props {
        size: f32,
        count: u32,
        enabled: bool,
        tint: Rgb,
    }

    reflect_fields!(Props {
        size => "size": Slider(0.5, 2.0, 0.1),
        count => "count": Int(1, 8),
        enabled => "enabled": Toggle,
        tint => "tint": Color,
    });

    fn props() -> Props {
        Props {
            size: 1.0,
            count: 2,
            enabled: false,
            tint: Rgb::WHITE,
        }
    }

    #[test]
    fn test_controls_follow_declaration_order() {
        assert_eq!(props().keys(), vec!["size", "count", "enabled", "tint"]);
    }

    #[test]
    fn test_set_clamps_to_range() {
        let mut p = props();
        p.set("size", ParamValue::Float(50.0)).unwrap();
        p.set("count", ParamValue::Int(-3)).unwrap();
        assert_eq!(p.size, 2.0);
        assert_eq!(p.count, 1);
    }

    #[test]
    fn test_set_rejects_wrong_type_and_unknown_key() {
        let mut p = props();
        assert!(matches!(
            p.set("enabled", ParamValue::Float(1.0)),
            Err(EditorError::ParamType { expected: "boolean", .. })
        ));
        assert!(matches!(
            p.set("missing", ParamValue::Bool(true)),
            Err(EditorError::UnknownParam { .. })
        ));
        assert!(!p.enabled);
    }

    #[test]
    fn test_get_reads_current_values() {
        let mut p = props();
        p.set("tint", ParamValue::Color(Rgb(0x123456))).unwrap();
        assert_eq!(p.get("tint"), Some(ParamValue::Color(Rgb(0x123456))));
        assert_eq!(p.get("nope"), None);
    }

    #[test]
    fn test_vector_fields() {
        let mut v = Vector3::new(0.0_f32, 0.0, 0.0);
        v.set("y", ParamValue::Float(1.5)).unwrap();
        assert_eq!(v.y, 1.5);
        assert_eq!(v.keys(), vec!["x", "y", "z"]);
    }
}
