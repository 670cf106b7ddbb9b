//! Local transform of a scene node
//!
//! Position, rotation and scale plus the composed local matrix. The matrix is
//! recomputed on every mutation, so readers never observe a stale value.

use crate::foundation::math::{utils, Mat3, Mat4, Quat, Quaternion, Vec3};
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};

/// Local position/rotation/scale with its cached TRS matrix
///
/// Invariant: `matrix == translate(position) * rotate(rotation) * scale(scale)`
/// unless the matrix was assigned through [`Transform::set_matrix`], in which
/// case the components are decomposed from the assigned matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformRepr", into = "TransformRepr")]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix: Mat4::identity(),
        }
    }
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from position, rotation and scale
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale,
            matrix: Mat4::identity(),
        };
        transform.recompute();
        transform
    }

    /// Create a transform by decomposing a matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        let mut transform = Self::default();
        transform.set_matrix(matrix);
        transform
    }

    /// Position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Local transformation matrix
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Set the position and recompute the matrix
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recompute();
    }

    /// Set the rotation and recompute the matrix
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.recompute();
    }

    /// Set the scale and recompute the matrix
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.recompute();
    }

    /// Assign the matrix directly and decompose it.
    ///
    /// Position is the translation column and scale the length of each basis
    /// column. Rotation is taken from the basis with each column divided by its
    /// scale. When any axis scale is exactly zero the basis carries no rotation
    /// information and the rotation falls back to identity. Mirrored bases
    /// (negative determinant) and shear are not representable and decompose to
    /// an approximation.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
        self.position = utils::translation_of(&matrix);

        let basis: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let (sx, sy, sz) = (
            basis.column(0).norm(),
            basis.column(1).norm(),
            basis.column(2).norm(),
        );
        self.scale = Vec3::new(sx, sy, sz);

        if sx == 0.0 || sy == 0.0 || sz == 0.0 {
            log::debug!("Zero axis scale in assigned matrix, using identity rotation");
            self.rotation = Quat::identity();
            return;
        }

        let unscaled = Mat3::from_columns(&[
            basis.column(0) / sx,
            basis.column(1) / sy,
            basis.column(2) / sz,
        ]);
        let rotation = Rotation3::from_matrix_unchecked(unscaled);
        self.rotation = Quat::from_rotation_matrix(&rotation);
    }

    fn recompute(&mut self) {
        self.matrix = Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale);
    }
}

/// On-disk shape: `{"position":[x,y,z],"rotation":[w,x,y,z],"scale":[x,y,z]}`
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct TransformRepr {
    position: [f32; 3],
    rotation: [f32; 4],
    scale: [f32; 3],
}

impl Default for TransformRepr {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [1.0, 0.0, 0.0, 0.0],
            scale: [1.0; 3],
        }
    }
}

impl From<TransformRepr> for Transform {
    fn from(repr: TransformRepr) -> Self {
        let [w, x, y, z] = repr.rotation;
        let quaternion = Quaternion::new(w, x, y, z);
        let rotation = if quaternion.norm() > 0.0 {
            Quat::new_normalize(quaternion)
        } else {
            log::warn!("Zero quaternion in transform document, using identity rotation");
            Quat::identity()
        };
        Self::from_parts(repr.position.into(), rotation, repr.scale.into())
    }
}

impl From<Transform> for TransformRepr {
    fn from(transform: Transform) -> Self {
        let r = transform.rotation;
        Self {
            position: transform.position.into(),
            rotation: [r.w, r.i, r.j, r.k],
            scale: transform.scale.into(),
        }
    }
}
