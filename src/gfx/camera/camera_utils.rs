use cgmath::Matrix4;

/// Maps OpenGL clip depth `[-1, 1]` onto the `[0, 1]` range wgpu expects.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// A camera usable for rendering and picking.
pub trait Camera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}
