//! Procedural teapot
//!
//! The body, lid and bottom are surfaces of revolution around Y whose
//! profiles are cubic Bezier segments in the classic teapot proportions. The
//! handle and spout are tubes swept along Bezier curves in the XY plane, spout
//! towards +X. The result spans `[-size, size]` vertically.

use super::{GeometryData, TeapotParams};

type Bezier = [[f32; 2]; 4];

/// Rim, upper body, lower body and heel, traversed top to bottom.
const BODY_PROFILE: [Bezier; 4] = [
    [[1.4, 2.4], [1.3375, 2.53125], [1.4375, 2.53125], [1.5, 2.4]],
    [[1.5, 2.4], [1.75, 1.875], [2.0, 1.35], [2.0, 0.9]],
    [[2.0, 0.9], [2.0, 0.45], [1.5, 0.225], [1.5, 0.15]],
    [[1.5, 0.15], [1.5, 0.05], [1.45, 0.0], [1.35, 0.0]],
];

const BOTTOM_PROFILE: [Bezier; 1] = [[[1.35, 0.0], [0.9, 0.0], [0.45, 0.0], [0.0, 0.0]]];

/// Knob then skirt, traversed from the axis outwards.
const LID_PROFILE: [Bezier; 2] = [
    [[0.0, 3.15], [0.8, 3.15], [0.0, 2.85], [0.2, 2.7]],
    [[0.2, 2.7], [0.4, 2.55], [1.3, 2.55], [1.3, 2.4]],
];

const HANDLE_PATH: [Bezier; 2] = [
    [[-1.6, 2.025], [-2.3, 2.025], [-2.7, 2.025], [-2.7, 1.6875]],
    [[-2.7, 1.6875], [-2.7, 1.35], [-2.5, 0.975], [-2.0, 0.75]],
];
const HANDLE_RADIUS: (f32, f32) = (0.15, 0.15);

const SPOUT_PATH: [Bezier; 2] = [
    [[1.7, 1.275], [2.6, 1.275], [2.3, 1.95], [2.7, 2.25]],
    [[2.7, 2.25], [2.8, 2.325], [3.0, 2.4], [3.2, 2.4]],
];
const SPOUT_RADIUS: (f32, f32) = (0.4, 0.16);

const MAX_HEIGHT: f32 = 3.15;
const BLINN_SCALE: f32 = 1.3;
/// Widens the lid skirt so it closes the gap to the rim.
const LID_FIT_SCALE: f32 = 1.077;

fn bezier(curve: &Bezier, t: f32) -> [f32; 2] {
    let s = 1.0 - t;
    let w = [s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t];
    let mut p = [0.0; 2];
    for (point, weight) in curve.iter().zip(w) {
        p[0] += point[0] * weight;
        p[1] += point[1] * weight;
    }
    p
}

fn bezier_tangent(curve: &Bezier, t: f32) -> [f32; 2] {
    let s = 1.0 - t;
    let w = [-3.0 * s * s, 3.0 * s * s - 6.0 * s * t, 6.0 * s * t - 3.0 * t * t, 3.0 * t * t];
    let mut d = [0.0; 2];
    for (point, weight) in curve.iter().zip(w) {
        d[0] += point[0] * weight;
        d[1] += point[1] * weight;
    }
    d
}

/// Samples a chain of curves into points and tangents without duplicating
/// the shared endpoints.
fn sample_path(curves: &[Bezier], steps: u32) -> Vec<([f32; 2], [f32; 2])> {
    let mut samples = Vec::with_capacity(curves.len() * steps as usize + 1);
    for (n, curve) in curves.iter().enumerate() {
        let first = if n == 0 { 0 } else { 1 };
        for i in first..=steps {
            let t = i as f32 / steps as f32;
            samples.push((bezier(curve, t), bezier_tangent(curve, t)));
        }
    }
    samples
}

struct Frame {
    /// Horizontal scale applied to every coordinate
    scale: f32,
    /// Extra vertical stretch for the non-Blinn proportions
    stretch: f32,
}

impl Frame {
    fn place(&self, x: f32, y: f32, z: f32) -> [f32; 3] {
        let height = MAX_HEIGHT * self.stretch;
        [
            x * self.scale,
            (y * self.stretch - height / 2.0) * self.scale,
            z * self.scale,
        ]
    }
}

fn lathe(profile: &[Bezier], radial_scale: f32, steps: u32, around: u32, frame: &Frame) -> GeometryData {
    let mut data = GeometryData::new();
    let samples = sample_path(profile, steps);

    for (row, (point, tangent)) in samples.iter().enumerate() {
        let r = point[0] * radial_scale;
        let (dr, dy) = (tangent[0] * radial_scale, tangent[1] * frame.stretch);
        // outward normal in the profile plane, see module docs for traversal direction
        let (nr, ny) = {
            let (nr, ny) = (-dy, dr);
            let len = (nr * nr + ny * ny).sqrt();
            if len > 1e-6 {
                (nr / len, ny / len)
            } else {
                (0.0, 1.0)
            }
        };

        for col in 0..=around {
            let u = col as f32 / around as f32;
            let phi = u * std::f32::consts::TAU;
            let (sin_phi, cos_phi) = phi.sin_cos();
            data.push_vertex(
                frame.place(r * sin_phi, point[1], r * cos_phi),
                [nr * sin_phi, ny, nr * cos_phi],
                [u, 1.0 - row as f32 / (samples.len() - 1) as f32],
            );
        }
    }

    let stride = around + 1;
    for row in 0..(samples.len() as u32 - 1) {
        for col in 0..around {
            let a = row * stride + col;
            let b = (row + 1) * stride + col;
            let c = (row + 1) * stride + col + 1;
            let d = row * stride + col + 1;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    data
}

fn sweep(path: &[Bezier], radius: (f32, f32), steps: u32, around: u32, frame: &Frame) -> GeometryData {
    let mut data = GeometryData::new();
    let samples = sample_path(path, steps);
    let last = (samples.len() - 1) as f32;

    for (row, (center, tangent)) in samples.iter().enumerate() {
        let t = row as f32 / last;
        let r = radius.0 + (radius.1 - radius.0) * t;

        let len = (tangent[0] * tangent[0] + tangent[1] * tangent[1]).sqrt().max(1e-6);
        let normal = [-tangent[1] / len, tangent[0] / len];

        for col in 0..=around {
            let u = col as f32 / around as f32;
            let angle = u * std::f32::consts::TAU;
            let (sin_a, cos_a) = angle.sin_cos();
            data.push_vertex(
                frame.place(
                    center[0] + r * cos_a * normal[0],
                    center[1] + r * cos_a * normal[1],
                    r * sin_a,
                ),
                [0.0, 0.0, 0.0],
                [u, t],
            );
        }
    }

    let stride = around + 1;
    for row in 0..(samples.len() as u32 - 1) {
        for col in 0..around {
            let a = row * stride + col;
            let b = (row + 1) * stride + col;
            let c = (row + 1) * stride + col + 1;
            let d = row * stride + col + 1;
            data.indices.extend_from_slice(&[a, d, b, b, d, c]);
        }
    }

    data.compute_vertex_normals();
    data
}

/// Generate the teapot from its parameter record.
pub fn generate_teapot(params: &TeapotParams) -> GeometryData {
    let stretch = if params.blinn { 1.0 } else { BLINN_SCALE };
    let frame = Frame {
        scale: params.size / (MAX_HEIGHT * stretch / 2.0),
        stretch,
    };

    let steps = params.segments.max(2);
    let around = steps * 4;
    let tube_around = (steps * 2).max(6);

    let mut data = GeometryData::new();

    if params.body {
        data.merge(lathe(&BODY_PROFILE, 1.0, steps, around, &frame));
        data.merge(sweep(&HANDLE_PATH, HANDLE_RADIUS, steps, tube_around, &frame));
        data.merge(sweep(&SPOUT_PATH, SPOUT_RADIUS, steps, tube_around, &frame));
    }
    if params.lid {
        let lid_scale = if params.fit_lid { LID_FIT_SCALE } else { 1.0 };
        data.merge(lathe(&LID_PROFILE, lid_scale, steps, around, &frame));
    }
    if params.bottom {
        data.merge(lathe(&BOTTOM_PROFILE, 1.0, steps, around, &frame));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_teapot_spans_size() {
        let teapot = generate_teapot(&TeapotParams::default());
        let bounds = teapot.bounds();
        assert!((bounds.max.y - 1.0).abs() < 1e-4);
        assert!((bounds.min.y + 1.0).abs() < 1e-4);
        // spout sticks out further than the handle
        assert!(bounds.max.x > -bounds.min.x);
    }

    #[test]
    fn test_size_scales_uniformly() {
        let small = generate_teapot(&TeapotParams::default());
        let large = generate_teapot(&TeapotParams {
            size: 3.0,
            ..TeapotParams::default()
        });
        assert_eq!(small.vertex_count(), large.vertex_count());
        assert!((large.bounds().max.y - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_parts_can_be_toggled() {
        let full = generate_teapot(&TeapotParams::default());
        let no_lid = generate_teapot(&TeapotParams {
            lid: false,
            ..TeapotParams::default()
        });
        let nothing = generate_teapot(&TeapotParams {
            lid: false,
            body: false,
            bottom: false,
            ..TeapotParams::default()
        });

        assert!(no_lid.triangle_count() < full.triangle_count());
        assert!(nothing.is_empty());
        // without a lid the top sits at the rim
        assert!(no_lid.bounds().max.y < full.bounds().max.y);
    }

    #[test]
    fn test_fit_lid_widens_the_skirt() {
        let lid_only = |fit_lid| {
            generate_teapot(&TeapotParams {
                body: false,
                bottom: false,
                fit_lid,
                ..TeapotParams::default()
            })
        };
        assert!(lid_only(true).bounds().max.x > lid_only(false).bounds().max.x);
    }

    #[test]
    fn test_segments_control_density() {
        let coarse = generate_teapot(&TeapotParams {
            segments: 4,
            ..TeapotParams::default()
        });
        let fine = generate_teapot(&TeapotParams::default());
        assert!(coarse.triangle_count() < fine.triangle_count());
    }

    #[test]
    fn test_lathe_normals_are_unit_and_outward() {
        let body = generate_teapot(&TeapotParams {
            lid: false,
            bottom: false,
            ..TeapotParams::default()
        });
        for (v, n) in body.vertices.iter().zip(&body.normals) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-3, "normal {n:?} at {v:?}");
        }
    }
}
