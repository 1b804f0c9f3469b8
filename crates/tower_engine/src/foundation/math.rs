//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics and game development.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    UnitQuaternion,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Build a rotation from Euler angles expressed in degrees (X, then Y, then Z)
pub fn quat_from_euler_degrees(degrees: &Vec3) -> Quat {
    Quat::from_euler_angles(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Compose a translation * rotation * scale matrix
pub fn compose_trs(position: &Vec3, rotation_degrees: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * quat_from_euler_degrees(rotation_degrees).to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Component-wise linear interpolation
pub fn lerp<const D: usize>(
    from: &nalgebra::SVector<f32, D>,
    to: &nalgebra::SVector<f32, D>,
    t: f32,
) -> nalgebra::SVector<f32, D> {
    from + (to - from) * t
}

/// Convert a 4x4 matrix into column-major arrays for GPU upload
pub fn mat4_to_cols(matrix: &Mat4) -> [[f32; 4]; 4] {
    let mut cols = [[0.0; 4]; 4];
    for (c, col) in cols.iter_mut().enumerate() {
        for (r, value) in col.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_compose_identity() {
        let m = compose_trs(&Vec3::zeros(), &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m, Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_compose_translation_and_scale() {
        let m = compose_trs(&Vec3::new(1.0, 2.0, 3.0), &Vec3::zeros(), &Vec3::new(2.0, 2.0, 2.0));
        let p = m.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 3.0, epsilon = EPSILON);
        assert_relative_eq!(p.y, 2.0, epsilon = EPSILON);
        assert_relative_eq!(p.z, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_degrees() {
        let q = quat_from_euler_degrees(&Vec3::new(0.0, 0.0, 90.0));
        let v = q * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_lerp_midpoint() {
        let v = lerp(&Vec3::zeros(), &Vec3::new(2.0, 4.0, 6.0), 0.5);
        assert_relative_eq!(v, Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_mat4_to_cols_translation_column() {
        let cols = mat4_to_cols(&Mat4::new_translation(&Vec3::new(4.0, 5.0, 6.0)));
        assert_relative_eq!(cols[3][0], 4.0);
        assert_relative_eq!(cols[3][1], 5.0);
        assert_relative_eq!(cols[3][2], 6.0);
    }
}
