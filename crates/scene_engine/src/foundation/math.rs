//! Math utilities and types
//!
//! Thin aliases over `nalgebra` so the rest of the engine speaks one vocabulary.
//! Matrices use column vectors: a point is transformed as `M * p`, and the
//! translation of an affine matrix lives in the last column.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Unit quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Translation matrix for `(x, y, z)`
    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    /// Translation column of an affine matrix
    pub fn translation_of(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_lives_in_last_column() {
        let m = utils::translation(1.0, 2.0, 3.0);
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(utils::translation_of(&m), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn degrees_convert_to_radians() {
        assert!((utils::deg_to_rad(180.0) - constants::PI).abs() < 1e-6);
    }
}
