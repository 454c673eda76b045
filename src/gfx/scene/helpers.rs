//! Scene furniture: box helper, grid, light markers and the shadow ground

use std::sync::Arc;

use crate::gfx::color::Rgb;
use crate::gfx::geometry::{generate_plane, generate_sphere, GeometryData, SphereParams};
use crate::gfx::picking::AABB;

use super::light::{PointLight, LIGHT_HELPER_RADIUS};
use super::vertex::LineVertex;

pub const BOX_HELPER_COLOR: Rgb = Rgb(0xffff00);

/// Line color in linear space with alpha.
pub fn line_color(color: Rgb, alpha: f32) -> [f32; 4] {
    let [r, g, b] = color.to_linear();
    [r, g, b, alpha]
}

/// Yellow bounding box drawn around the mesh.
///
/// `enabled` is the user's "helper" toggle, `visible` whether it is drawn
/// right now; picking the mesh shows it, clicking empty space hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHelper {
    pub enabled: bool,
    pub visible: bool,
}

impl Default for BoxHelper {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
        }
    }
}

impl BoxHelper {
    pub fn lines(bounds: &AABB) -> Vec<LineVertex> {
        let color = line_color(BOX_HELPER_COLOR, 1.0);
        let (min, max) = (bounds.min, bounds.max);
        let corner = |i: usize| {
            [
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            ]
        };

        let mut lines = Vec::with_capacity(24);
        for i in 0..8 {
            for bit in [1, 2, 4] {
                if i & bit == 0 {
                    lines.push(LineVertex::new(corner(i), color));
                    lines.push(LineVertex::new(corner(i | bit), color));
                }
            }
        }
        lines
    }
}

/// Square grid on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub opacity: f32,
    pub center_color: Rgb,
    pub color: Rgb,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: 100,
            opacity: 0.25,
            center_color: Rgb(0x444444),
            color: Rgb(0x888888),
        }
    }
}

impl GridHelper {
    pub fn lines(&self) -> Vec<LineVertex> {
        let divisions = self.divisions.max(1);
        let half = self.size / 2.0;
        let step = self.size / divisions as f32;
        let center = divisions / 2;

        let mut lines = Vec::with_capacity((divisions as usize + 1) * 4);
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let rgb = if i == center { self.center_color } else { self.color };
            let color = line_color(rgb, self.opacity);
            lines.push(LineVertex::new([-half, 0.0, k], color));
            lines.push(LineVertex::new([half, 0.0, k], color));
            lines.push(LineVertex::new([k, 0.0, -half], color));
            lines.push(LineVertex::new([k, 0.0, half], color));
        }
        lines
    }
}

/// Coarse wire sphere around a point light, in the light's color.
pub fn light_helper_lines(light: &PointLight) -> Vec<LineVertex> {
    let marker = generate_sphere(&SphereParams {
        radius: LIGHT_HELPER_RADIUS,
        width_segments: 4,
        height_segments: 2,
        ..SphereParams::default()
    });
    let color = line_color(light.color, 1.0);
    marker
        .edges()
        .into_iter()
        .map(|i| {
            let p = marker.vertices[i as usize];
            LineVertex::new(
                [
                    p[0] + light.position.x,
                    p[1] + light.position.y,
                    p[2] + light.position.z,
                ],
                color,
            )
        })
        .collect()
}

/// Ground plane that only shows the shadows cast onto it.
#[derive(Debug, Clone)]
pub struct ShadowGround {
    pub geometry: Arc<GeometryData>,
    pub shadow_opacity: f32,
}

impl Default for ShadowGround {
    fn default() -> Self {
        Self {
            geometry: Arc::new(generate_plane(100.0, 100.0, 1, 1)),
            shadow_opacity: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_box_helper_has_twelve_edges() {
        let bounds = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 2.0, 1.0));
        let lines = BoxHelper::lines(&bounds);
        assert_eq!(lines.len(), 24);
        assert!(lines.iter().all(|v| v.position[1] == -1.0 || v.position[1] == 2.0));
        // every edge is axis aligned
        for pair in lines.chunks_exact(2) {
            let changed = (0..3)
                .filter(|&a| pair[0].position[a] != pair[1].position[a])
                .count();
            assert_eq!(changed, 1);
        }
    }

    #[test]
    fn test_grid_line_count_and_alpha() {
        let grid = GridHelper::default();
        let lines = grid.lines();
        assert_eq!(lines.len(), 101 * 4);
        assert!(lines.iter().all(|v| v.color[3] == 0.25));
        assert!(lines.iter().all(|v| v.position[0].abs() <= 50.0));
    }

    #[test]
    fn test_light_helper_surrounds_light() {
        let light = PointLight::new(Vector3::new(2.0, 3.0, 4.0), true);
        let lines = light_helper_lines(&light);
        assert!(!lines.is_empty());
        for v in &lines {
            let d = Vector3::from(v.position) - light.position;
            assert!((cgmath::InnerSpace::magnitude(d) - LIGHT_HELPER_RADIUS).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ground_faces_up() {
        let ground = ShadowGround::default();
        assert!(ground.geometry.normals.iter().all(|n| n[1] == 1.0));
        assert_eq!(ground.shadow_opacity, 0.2);
    }
}
