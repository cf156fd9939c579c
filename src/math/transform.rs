use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion};

use crate::error::{GeometryError, Result};

use super::{Matrix3, Point3, Vector3, TOLERANCE};

/// Rigid placement of a surface frame in the global frame.
///
/// Wraps a translation and an orthonormal rotation whose columns are the
/// local x, y and z axes expressed in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3 {
    isometry: Isometry3<f64>,
    rotation: Matrix3,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3 {
    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
            rotation: Matrix3::identity(),
        }
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
            rotation: Matrix3::identity(),
        }
    }

    /// Creates a placement from a translation, the local z axis and the
    /// local x axis.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis has zero length or the two axes are
    /// not perpendicular.
    pub fn new(translation: Vector3, z_axis: Vector3, x_axis: Vector3) -> Result<Self> {
        let z_len = z_axis.norm();
        let x_len = x_axis.norm();
        if z_len < TOLERANCE || x_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let z = z_axis / z_len;
        let x = x_axis / x_len;
        if z.dot(&x).abs() > 1e-6 {
            return Err(GeometryError::Degenerate("transform axes are not perpendicular").into());
        }
        let y = z.cross(&x);
        let rotation = Matrix3::from_columns(&[x, y, z]);
        let unit = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation));

        Ok(Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), unit),
            rotation,
        })
    }

    /// Translation of the local origin.
    #[must_use]
    pub fn translation(&self) -> Vector3 {
        self.isometry.translation.vector
    }

    /// Rotation matrix; its columns are the local axes in global coordinates.
    #[must_use]
    pub fn rotation(&self) -> &Matrix3 {
        &self.rotation
    }

    /// Local x axis in global coordinates.
    #[must_use]
    pub fn x(&self) -> Vector3 {
        self.rotation.column(0).into_owned()
    }

    /// Local y axis in global coordinates.
    #[must_use]
    pub fn y(&self) -> Vector3 {
        self.rotation.column(1).into_owned()
    }

    /// Local z axis in global coordinates.
    #[must_use]
    pub fn z(&self) -> Vector3 {
        self.rotation.column(2).into_owned()
    }

    #[must_use]
    pub fn point_to_global(&self, local: &Point3) -> Point3 {
        self.isometry.transform_point(local)
    }

    #[must_use]
    pub fn point_to_local(&self, global: &Point3) -> Point3 {
        self.isometry.inverse_transform_point(global)
    }

    #[must_use]
    pub fn vector_to_global(&self, local: &Vector3) -> Vector3 {
        self.rotation * local
    }

    #[must_use]
    pub fn vector_to_local(&self, global: &Vector3) -> Vector3 {
        self.rotation.tr_mul(global)
    }
}
