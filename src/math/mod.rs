pub mod search;
pub mod transform;
pub mod units;

pub use transform::Transform3;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Free track parameter vector: position, time, direction, q/p.
pub type FreeVector = nalgebra::SVector<f64, 8>;

/// Bound track parameter vector: loc0, loc1, phi, theta, q/p, time.
pub type BoundVector = nalgebra::SVector<f64, 6>;

/// Transport Jacobian in free parametrisation.
pub type FreeMatrix = nalgebra::SMatrix<f64, 8, 8>;

/// Covariance (or full Jacobian) in bound parametrisation.
pub type BoundMatrix = nalgebra::SMatrix<f64, 6, 6>;

/// Jacobian of the bound to free parameter conversion.
pub type BoundToFreeMatrix = nalgebra::SMatrix<f64, 8, 6>;

/// Jacobian of the free to bound parameter conversion.
pub type FreeToBoundMatrix = nalgebra::SMatrix<f64, 6, 8>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Indices into [`FreeVector`].
pub mod free {
    pub const POS0: usize = 0;
    pub const POS1: usize = 1;
    pub const POS2: usize = 2;
    pub const TIME: usize = 3;
    pub const DIR0: usize = 4;
    pub const DIR1: usize = 5;
    pub const DIR2: usize = 6;
    pub const QOP: usize = 7;
}

/// Indices into [`BoundVector`].
pub mod bound {
    pub const LOC0: usize = 0;
    pub const LOC1: usize = 1;
    pub const PHI: usize = 2;
    pub const THETA: usize = 3;
    pub const QOP: usize = 4;
    pub const TIME: usize = 5;
}

/// A straight ray `origin + s * direction` with unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    ///
    /// Returns `None` for a zero-length direction.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Option<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Point at path length `s`.
    #[must_use]
    pub fn at(&self, s: f64) -> Point3 {
        self.origin + self.direction * s
    }

    /// Expresses the ray in the local frame of `trf`.
    #[must_use]
    pub fn to_local(&self, trf: &Transform3) -> Self {
        Self {
            origin: trf.point_to_local(&self.origin),
            direction: trf.vector_to_local(&self.direction),
        }
    }
}

/// Direction `(cos phi sin theta, sin phi sin theta, cos theta)`.
#[must_use]
pub fn direction_from_angles(phi: f64, theta: f64) -> Vector3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3::new(cos_phi * sin_theta, sin_phi * sin_theta, cos_theta)
}

/// Azimuth and polar angle of a unit direction.
#[must_use]
pub fn angles_from_direction(dir: &Vector3) -> (f64, f64) {
    let phi = dir.y.atan2(dir.x);
    let theta = dir.x.hypot(dir.y).atan2(dir.z);
    (phi, theta)
}

/// Skew-symmetric matrix `[v]x` such that `[v]x * w = v x w`.
#[must_use]
pub fn cross_matrix(v: &Vector3) -> Matrix3 {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}
