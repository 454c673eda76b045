//! Position / rotation / scale triple shared by the mesh and the camera.
//!
//! Rotations are XYZ euler angles in radians, composed as `Rx * Ry * Rz`.

use cgmath::{InnerSpace, Matrix3, Matrix4, Rad, SquareMatrix, Vector3, Zero};

/// Position, euler rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        euler_xyz_matrix(self.rotation)
    }

    /// World matrix `T * R * S`.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Inverse-transpose of the world matrix, for transforming normals.
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        self.matrix()
            .invert()
            .map(|m| cgmath::Matrix::transpose(&m))
            .unwrap_or_else(Matrix4::identity)
    }

    /// Orients the transform so its -Z axis points at `target`, Y up.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let mut z_axis = self.position - target;
        if z_axis.magnitude2() == 0.0 {
            z_axis = Vector3::unit_z();
        }
        z_axis = z_axis.normalize();

        let up = Vector3::unit_y();
        let mut x_axis = up.cross(z_axis);
        if x_axis.magnitude2() == 0.0 {
            // looking straight up or down
            z_axis.z += 0.0001;
            z_axis = z_axis.normalize();
            x_axis = up.cross(z_axis);
        }
        let x_axis = x_axis.normalize();
        let y_axis = z_axis.cross(x_axis);

        self.rotation = euler_from_rotation_matrix(&Matrix3::from_cols(x_axis, y_axis, z_axis));
    }
}

/// Rotation matrix for XYZ euler angles in radians.
///
/// # Arguments
///
/// * `rotation` - Angles about x, y and z, applied in that order
///
/// # Returns
///
/// `Rx * Ry * Rz`
pub fn euler_xyz_matrix(rotation: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_angle_x(Rad(rotation.x))
        * Matrix3::from_angle_y(Rad(rotation.y))
        * Matrix3::from_angle_z(Rad(rotation.z))
}

/// Decomposes a pure rotation matrix into XYZ euler angles.
pub fn euler_from_rotation_matrix(m: &Matrix3<f32>) -> Vector3<f32> {
    // m.c.r is column c, row r
    let m11 = m.x.x;
    let m12 = m.y.x;
    let m13 = m.z.x;
    let m22 = m.y.y;
    let m23 = m.z.y;
    let m32 = m.y.z;
    let m33 = m.z.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        Vector3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        Vector3::new(m32.atan2(m22), y, 0.0)
    }
}
