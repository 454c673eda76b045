//! # Primitive Shape Generation
//!
//! Parametric generators for the editable primitives and the ground plane.
//! All shapes are Y-up, centered on the origin, with outward normals and
//! texture coordinates in `[0, 1]`.

use std::f32::consts::PI;

use super::{BoxParams, ConeParams, CylinderParams, GeometryData, SphereParams, TorusParams};

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}

/// Generate a (possibly partial) UV sphere.
///
/// `phi` sweeps around the Y axis and `theta` from the north pole down, so a
/// `theta_length` below PI leaves the bottom open.
pub fn generate_sphere(params: &SphereParams) -> GeometryData {
    let mut data = GeometryData::new();

    let width_segments = params.width_segments.max(3);
    let height_segments = params.height_segments.max(2);
    let theta_end = (params.theta_start + params.theta_length).min(PI);

    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = params.theta_start + v * params.theta_length;

        // poles collapse to a point; offset u so the texture does not pinch
        let u_offset = if iy == 0 && params.theta_start == 0.0 {
            0.5 / width_segments as f32
        } else if iy == height_segments && theta_end == PI {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = params.phi_start + u * params.phi_length;

            let position = [
                -params.radius * phi.cos() * theta.sin(),
                params.radius * theta.cos(),
                params.radius * phi.sin() * theta.sin(),
            ];
            row.push(data.push_vertex(position, normalize(position), [u + u_offset, 1.0 - v]));
        }
        grid.push(row);
    }

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 || params.theta_start > 0.0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 || theta_end < PI {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Shared frustum generator behind cylinders and cones.
#[allow(clippy::too_many_arguments)]
fn generate_frustum(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    open_ended: bool,
    theta_start: f32,
    theta_length: f32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial_segments = radial_segments.max(3);
    let height_segments = height_segments.max(1);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    let mut grid = Vec::with_capacity(height_segments as usize + 1);
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;

        let mut row = Vec::with_capacity(radial_segments as usize + 1);
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let theta = u * theta_length + theta_start;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let position = [radius * sin_theta, -v * height + half_height, radius * cos_theta];
            let normal = normalize([sin_theta, slope, cos_theta]);
            row.push(data.push_vertex(position, normal, [u, 1.0 - v]));
        }
        grid.push(row);
    }

    for x in 0..radial_segments as usize {
        for y in 0..height_segments as usize {
            let a = grid[y][x];
            let b = grid[y + 1][x];
            let c = grid[y + 1][x + 1];
            let d = grid[y][x + 1];
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    if !open_ended {
        if radius_top > 0.0 {
            push_cap(&mut data, true, radius_top, half_height, radial_segments, theta_start, theta_length);
        }
        if radius_bottom > 0.0 {
            push_cap(&mut data, false, radius_bottom, half_height, radial_segments, theta_start, theta_length);
        }
    }

    data
}

fn push_cap(
    data: &mut GeometryData,
    top: bool,
    radius: f32,
    half_height: f32,
    radial_segments: u32,
    theta_start: f32,
    theta_length: f32,
) {
    let sign = if top { 1.0 } else { -1.0 };
    let y = half_height * sign;
    let normal = [0.0, sign, 0.0];

    // one center vertex per segment keeps the uv seam clean
    let center_start = data.vertices.len() as u32;
    for _ in 0..radial_segments {
        data.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);
    }

    let rim_start = data.vertices.len() as u32;
    for x in 0..=radial_segments {
        let u = x as f32 / radial_segments as f32;
        let theta = u * theta_length + theta_start;
        let (sin_theta, cos_theta) = theta.sin_cos();
        data.push_vertex(
            [radius * sin_theta, y, radius * cos_theta],
            normal,
            [cos_theta * 0.5 + 0.5, sin_theta * 0.5 * sign + 0.5],
        );
    }

    for x in 0..radial_segments {
        let c = center_start + x;
        let i = rim_start + x;
        if top {
            data.indices.extend_from_slice(&[i, i + 1, c]);
        } else {
            data.indices.extend_from_slice(&[i + 1, i, c]);
        }
    }
}

/// Generate a cylinder (or truncated cone) along the Y axis.
pub fn generate_cylinder(params: &CylinderParams) -> GeometryData {
    generate_frustum(
        params.radius_top,
        params.radius_bottom,
        params.height,
        params.radial_segments,
        params.height_segments,
        params.open_ended,
        params.theta_start,
        params.theta_length,
    )
}

/// Generate a cone: a cylinder whose top radius is zero.
pub fn generate_cone(params: &ConeParams) -> GeometryData {
    generate_frustum(
        0.0,
        params.radius,
        params.height,
        params.radial_segments,
        params.height_segments,
        params.open_ended,
        params.theta_start,
        params.theta_length,
    )
}

/// Generate a torus standing in the XY plane.
pub fn generate_torus(params: &TorusParams) -> GeometryData {
    let mut data = GeometryData::new();

    let radial_segments = params.radial_segments.max(2);
    let tubular_segments = params.tubular_segments.max(3);

    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * params.arc;
            let v = j as f32 / radial_segments as f32 * PI * 2.0;

            let ring = params.radius + params.tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), params.tube * v.sin()];
            let center = [params.radius * u.cos(), params.radius * u.sin(), 0.0];
            let normal = normalize([
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ]);

            data.push_vertex(
                position,
                normal,
                [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ],
            );
        }
    }

    let stride = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    data
}

/// Generate a box with per-axis subdivisions.
pub fn generate_box(params: &BoxParams) -> GeometryData {
    let mut data = GeometryData::new();
    let (w, h, d) = (params.width, params.height, params.depth);
    let (ws, hs, ds) = (
        params.width_segments.max(1),
        params.height_segments.max(1),
        params.depth_segments.max(1),
    );

    // (u axis, v axis, w axis, u dir, v dir, width, height, depth, grid x, grid y)
    let faces = [
        (2, 1, 0, -1.0, -1.0, d, h, w, ds, hs),
        (2, 1, 0, 1.0, -1.0, d, h, -w, ds, hs),
        (0, 2, 1, 1.0, 1.0, w, d, h, ws, ds),
        (0, 2, 1, 1.0, -1.0, w, d, -h, ws, ds),
        (0, 1, 2, 1.0, -1.0, w, h, d, ws, hs),
        (0, 1, 2, -1.0, -1.0, w, h, -d, ws, hs),
    ];

    for (u, v, axis_w, udir, vdir, width, height, depth, grid_x, grid_y) in faces {
        let start = data.vertices.len() as u32;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;
        let depth_half = depth / 2.0;
        let mut normal = [0.0; 3];
        normal[axis_w] = if depth > 0.0 { 1.0 } else { -1.0 };

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;
                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[axis_w] = depth_half;
                data.push_vertex(
                    position,
                    normal,
                    [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
                );
            }
        }

        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = start + ix + row * iy;
                let b = start + ix + row * (iy + 1);
                let c = start + (ix + 1) + row * (iy + 1);
                let d = start + (ix + 1) + row * iy;
                data.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }

    data
}

/// Generate a flat plane in the XZ plane facing +Y.
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` / `depth_segments` - Subdivisions per axis
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let ws = width_segments.max(1);
    let ds = depth_segments.max(1);

    for iz in 0..=ds {
        let v = iz as f32 / ds as f32;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            data.push_vertex(
                [(u - 0.5) * width, 0.0, (v - 0.5) * depth],
                [0.0, 1.0, 0.0],
                [u, 1.0 - v],
            );
        }
    }

    let row = ws + 1;
    for iz in 0..ds {
        for ix in 0..ws {
            let a = ix + row * iz;
            let b = ix + row * (iz + 1);
            let c = ix + 1 + row * (iz + 1);
            let d = ix + 1 + row * iz;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    data
}
