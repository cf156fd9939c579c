//! Local coordinate frames of the bounded shapes.
//!
//! A frame maps between the global 3D position of a track on a surface and
//! the two bound local coordinates, and provides the Jacobians between free
//! and bound track parametrisations:
//!
//! | frame          | loc0              | loc1    | shapes                    |
//! |----------------|-------------------|---------|---------------------------|
//! | `Cartesian2`   | x                 | y       | rectangle, single bound   |
//! | `Polar2`       | r                 | phi     | disc                      |
//! | `Cylindrical2` | radius * phi      | z       | cylinder                  |
//! | `Line2`        | signed distance   | z       | line                      |

use nalgebra::SMatrix;

use crate::math::{
    bound, direction_from_angles, free, BoundToFreeMatrix, BoundVector, FreeToBoundMatrix, FreeVector, Matrix3,
    Point2, Point3, Transform3, Vector3, TOLERANCE,
};
use crate::track::{free_angles, BoundTrackParameters, FreeTrackParameters};

/// Derivative of the path length to a surface w.r.t. the free parameters.
pub type PathDerivative = SMatrix<f64, 1, 8>;

/// Coordinate strategy of a surface's bound parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalFrame {
    Cartesian2,
    Polar2,
    Cylindrical2 { radius: f64 },
    Line2,
}

/// Unit vector `w x d` in the wire frame, the sign reference of a line
/// surface's signed distance. Falls back to local x when `d` is along `w`.
fn line_sign_axis(local_dir: &Vector3) -> Vector3 {
    let v = Vector3::new(-local_dir.y, local_dir.x, 0.0);
    let n = v.norm();
    if n < TOLERANCE {
        Vector3::x()
    } else {
        v / n
    }
}

impl LocalFrame {
    /// Bound local coordinates of a global position.
    ///
    /// The direction is only used by the line frame.
    #[must_use]
    pub fn global_to_local(&self, trf: &Transform3, pos: &Point3, dir: &Vector3) -> Point2 {
        let l = trf.point_to_local(pos);
        match *self {
            Self::Cartesian2 => Point2::new(l.x, l.y),
            Self::Polar2 => Point2::new(l.x.hypot(l.y), l.y.atan2(l.x)),
            Self::Cylindrical2 { radius } => Point2::new(radius * l.y.atan2(l.x), l.z),
            Self::Line2 => {
                let u = line_sign_axis(&trf.vector_to_local(dir));
                Point2::new(l.coords.dot(&u), l.z)
            }
        }
    }

    /// Global position of bound local coordinates.
    #[must_use]
    pub fn local_to_global(&self, trf: &Transform3, loc: &Point2, dir: &Vector3) -> Point3 {
        let l = match *self {
            Self::Cartesian2 => Point3::new(loc.x, loc.y, 0.0),
            Self::Polar2 => {
                let (s, c) = loc.y.sin_cos();
                Point3::new(loc.x * c, loc.x * s, 0.0)
            }
            Self::Cylindrical2 { radius } => {
                let (s, c) = (loc.x / radius).sin_cos();
                Point3::new(radius * c, radius * s, loc.y)
            }
            Self::Line2 => {
                let u = line_sign_axis(&trf.vector_to_local(dir));
                Point3::from(u * loc.x + Vector3::z() * loc.y)
            }
        };
        trf.point_to_global(&l)
    }

    /// Surface normal at bound local coordinates. For lines this is the wire
    /// direction.
    #[must_use]
    pub fn normal(&self, trf: &Transform3, loc: &Point2) -> Vector3 {
        match *self {
            Self::Cartesian2 | Self::Polar2 | Self::Line2 => trf.z(),
            Self::Cylindrical2 { radius } => {
                let (s, c) = (loc.x / radius).sin_cos();
                trf.vector_to_global(&Vector3::new(c, s, 0.0))
            }
        }
    }

    #[must_use]
    pub fn free_to_bound_vector(&self, trf: &Transform3, params: &FreeTrackParameters) -> BoundVector {
        let dir = params.dir();
        let loc = self.global_to_local(trf, &params.pos(), &dir);
        let (phi, theta) = free_angles(params);
        BoundTrackParameters::compose(loc, phi, theta, params.qop(), params.time())
    }

    #[must_use]
    pub fn bound_to_free_vector(&self, trf: &Transform3, vector: &BoundVector) -> FreeTrackParameters {
        let dir = direction_from_angles(vector[bound::PHI], vector[bound::THETA]);
        let loc = Point2::new(vector[bound::LOC0], vector[bound::LOC1]);
        let pos = self.local_to_global(trf, &loc, &dir);
        FreeTrackParameters::from_parts(pos, vector[bound::TIME], dir, vector[bound::QOP])
    }

    /// Derivatives of the global position w.r.t. loc0 and loc1.
    fn position_derivatives(&self, trf: &Transform3, loc: &Point2, dir: &Vector3) -> (Vector3, Vector3) {
        match *self {
            Self::Cartesian2 => (trf.x(), trf.y()),
            Self::Polar2 => {
                let (s, c) = loc.y.sin_cos();
                (
                    trf.vector_to_global(&Vector3::new(c, s, 0.0)),
                    trf.vector_to_global(&Vector3::new(-loc.x * s, loc.x * c, 0.0)),
                )
            }
            Self::Cylindrical2 { radius } => {
                let (s, c) = (loc.x / radius).sin_cos();
                (trf.vector_to_global(&Vector3::new(-s, c, 0.0)), trf.z())
            }
            Self::Line2 => {
                let u = line_sign_axis(&trf.vector_to_local(dir));
                (trf.vector_to_global(&u), trf.z())
            }
        }
    }

    /// Jacobian of the free parameters w.r.t. the bound parameters.
    #[must_use]
    pub fn bound_to_free_jacobian(&self, trf: &Transform3, vector: &BoundVector) -> BoundToFreeMatrix {
        let (sin_theta, cos_theta) = vector[bound::THETA].sin_cos();
        let (sin_phi, cos_phi) = vector[bound::PHI].sin_cos();
        let dir = Vector3::new(cos_phi * sin_theta, sin_phi * sin_theta, cos_theta);
        let dir_dphi = Vector3::new(-sin_theta * sin_phi, sin_theta * cos_phi, 0.0);
        let dir_dtheta = Vector3::new(cos_phi * cos_theta, sin_phi * cos_theta, -sin_theta);
        let loc = Point2::new(vector[bound::LOC0], vector[bound::LOC1]);

        let mut jac = BoundToFreeMatrix::zeros();
        let (d0, d1) = self.position_derivatives(trf, &loc, &dir);
        jac.fixed_view_mut::<3, 1>(free::POS0, bound::LOC0).copy_from(&d0);
        jac.fixed_view_mut::<3, 1>(free::POS0, bound::LOC1).copy_from(&d1);
        jac[(free::TIME, bound::TIME)] = 1.0;
        jac.fixed_view_mut::<3, 1>(free::DIR0, bound::PHI).copy_from(&dir_dphi);
        jac.fixed_view_mut::<3, 1>(free::DIR0, bound::THETA).copy_from(&dir_dtheta);
        jac[(free::QOP, bound::QOP)] = 1.0;

        if *self == Self::Line2 {
            // The sign axis w x d turns with the direction.
            let w = trf.z();
            let v = w.cross(&dir);
            let n = v.norm();
            if n > TOLERANCE {
                let u = v / n;
                let projector = (Matrix3::identity() - u * u.transpose()) / n;
                let dpos_dphi = projector * w.cross(&dir_dphi) * loc.x;
                let dpos_dtheta = projector * w.cross(&dir_dtheta) * loc.x;
                jac.fixed_view_mut::<3, 1>(free::POS0, bound::PHI).copy_from(&dpos_dphi);
                jac.fixed_view_mut::<3, 1>(free::POS0, bound::THETA).copy_from(&dpos_dtheta);
            }
        }
        jac
    }

    /// Jacobian of the bound parameters w.r.t. the free parameters.
    #[must_use]
    pub fn free_to_bound_jacobian(&self, trf: &Transform3, params: &FreeTrackParameters) -> FreeToBoundMatrix {
        let dir = params.dir();
        let (phi, theta) = free_angles(params);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();

        let (row0, row1) = match *self {
            Self::Cartesian2 => (trf.x(), trf.y()),
            Self::Polar2 => {
                let l = trf.point_to_local(&params.pos());
                let r = l.x.hypot(l.y);
                if r < TOLERANCE {
                    (trf.x(), Vector3::zeros())
                } else {
                    let (s, c) = (l.y / r, l.x / r);
                    (
                        trf.vector_to_global(&Vector3::new(c, s, 0.0)),
                        trf.vector_to_global(&Vector3::new(-s / r, c / r, 0.0)),
                    )
                }
            }
            Self::Cylindrical2 { radius } => {
                let l = trf.point_to_local(&params.pos());
                let rho = l.x.hypot(l.y);
                if rho < TOLERANCE {
                    (Vector3::zeros(), trf.z())
                } else {
                    let (s, c) = (l.y / rho, l.x / rho);
                    (trf.vector_to_global(&Vector3::new(-s, c, 0.0)) * (radius / rho), trf.z())
                }
            }
            Self::Line2 => {
                let u = line_sign_axis(&trf.vector_to_local(&dir));
                (trf.vector_to_global(&u), trf.z())
            }
        };

        let mut jac = FreeToBoundMatrix::zeros();
        jac.fixed_view_mut::<1, 3>(bound::LOC0, free::POS0).copy_from(&row0.transpose());
        jac.fixed_view_mut::<1, 3>(bound::LOC1, free::POS0).copy_from(&row1.transpose());
        jac[(bound::TIME, free::TIME)] = 1.0;
        if sin_theta.abs() > TOLERANCE {
            jac[(bound::PHI, free::DIR0)] = -sin_phi / sin_theta;
            jac[(bound::PHI, free::DIR1)] = cos_phi / sin_theta;
        }
        jac[(bound::THETA, free::DIR0)] = cos_phi * cos_theta;
        jac[(bound::THETA, free::DIR1)] = sin_phi * cos_theta;
        jac[(bound::THETA, free::DIR2)] = -sin_theta;
        jac[(bound::QOP, free::QOP)] = 1.0;
        jac
    }

    /// Derivative of the path length to this surface w.r.t. the free
    /// position, used to correct the transport Jacobian so that the varied
    /// track still ends on the surface.
    #[must_use]
    pub fn path_derivative(&self, trf: &Transform3, params: &FreeTrackParameters) -> PathDerivative {
        let dir = params.dir();
        let gradient = match *self {
            Self::Cartesian2 | Self::Polar2 => planar_path_gradient(&trf.z(), &dir),
            Self::Cylindrical2 { .. } => {
                let l = trf.point_to_local(&params.pos());
                let n = Vector3::new(l.x, l.y, 0.0);
                let len = n.norm();
                if len < TOLERANCE {
                    Vector3::zeros()
                } else {
                    planar_path_gradient(&trf.vector_to_global(&(n / len)), &dir)
                }
            }
            Self::Line2 => {
                let w = trf.z();
                let dz = w.dot(&dir);
                let denom = 1.0 - dz * dz;
                if denom < TOLERANCE {
                    Vector3::zeros()
                } else {
                    (w * dz - dir) / denom
                }
            }
        };
        let mut derivative = PathDerivative::zeros();
        derivative.fixed_view_mut::<1, 3>(0, free::POS0).copy_from(&gradient.transpose());
        derivative
    }
}

fn planar_path_gradient(normal: &Vector3, dir: &Vector3) -> Vector3 {
    let cos = normal.dot(dir);
    if cos.abs() < TOLERANCE {
        Vector3::zeros()
    } else {
        -normal / cos
    }
}

/// Free parameter vector of a bound vector, exposed for Jacobian checks.
#[must_use]
pub fn bound_to_free(frame: &LocalFrame, trf: &Transform3, vector: &BoundVector) -> FreeVector {
    *frame.bound_to_free_vector(trf, vector).vector()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::BoundMatrix;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_4;

    const ISCLOSE: f64 = 1e-6;

    fn shifted() -> Transform3 {
        Transform3::new(Vector3::new(2.0, 3.0, 4.0), Vector3::z(), Vector3::x()).unwrap()
    }

    fn tilted() -> Transform3 {
        Transform3::new(
            Vector3::new(-1.0, 0.5, 2.0),
            Vector3::new(0.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn cylindrical_frame() {
        let trf = shifted();
        let frame = LocalFrame::Cylindrical2 { radius: 2.0 };
        let global1 = Point3::new(3.414_213_6, 4.414_213_6, 9.0);
        let mom = Vector3::new(1.0, 2.0, 3.0);
        let d = mom.normalize();

        let local = frame.global_to_local(&trf, &global1, &d);
        assert_abs_diff_eq!(local.x, 2.0 * FRAC_PI_4, epsilon = ISCLOSE);
        assert_abs_diff_eq!(local.y, 5.0, epsilon = ISCLOSE);

        let global2 = frame.local_to_global(&trf, &local, &d);
        assert_relative_eq!(global1, global2, epsilon = ISCLOSE);

        let free_params = FreeTrackParameters::new(global1, 0.1, mom, -1.0).unwrap();
        let bound_vec = frame.free_to_bound_vector(&trf, &free_params);
        assert_abs_diff_eq!(bound_vec[bound::LOC0], 2.0 * FRAC_PI_4, epsilon = ISCLOSE);
        assert_abs_diff_eq!(bound_vec[bound::LOC1], 5.0, epsilon = ISCLOSE);
        assert_abs_diff_eq!(bound_vec[bound::PHI], 1.107_148_7, epsilon = ISCLOSE);
        assert_abs_diff_eq!(bound_vec[bound::THETA], 0.640_522_31, epsilon = ISCLOSE);
        assert_abs_diff_eq!(bound_vec[bound::QOP], -1.0 / 3.741_657_4, epsilon = ISCLOSE);
        assert_abs_diff_eq!(bound_vec[bound::TIME], 0.1, epsilon = ISCLOSE);

        let free_vec2 = bound_to_free(&frame, &trf, &bound_vec);
        assert_relative_eq!(*free_params.vector(), free_vec2, epsilon = ISCLOSE);

        let n = frame.normal(&trf, &local);
        assert_abs_diff_eq!(n, Vector3::new(0.5_f64.sqrt(), 0.5_f64.sqrt(), 0.0), epsilon = ISCLOSE);

        let j = frame.free_to_bound_jacobian(&trf, &free_params) * frame.bound_to_free_jacobian(&trf, &bound_vec);
        assert_abs_diff_eq!(j, BoundMatrix::identity(), epsilon = ISCLOSE);
    }

    fn bound_at(loc: Point2) -> BoundVector {
        BoundTrackParameters::compose(loc, 0.4, 1.1, 0.02, 3.0)
    }

    #[test]
    fn jacobians_are_inverse_for_all_frames() {
        let trf = tilted();
        let cases = [
            (LocalFrame::Cartesian2, Point2::new(0.7, -1.3)),
            (LocalFrame::Polar2, Point2::new(2.5, 0.8)),
            (LocalFrame::Cylindrical2 { radius: 4.0 }, Point2::new(1.9, -3.0)),
            (LocalFrame::Line2, Point2::new(-0.6, 12.0)),
        ];
        for (frame, loc) in cases {
            let bv = bound_at(loc);
            let free_params = frame.bound_to_free_vector(&trf, &bv);
            let back = frame.free_to_bound_vector(&trf, &free_params);
            assert_relative_eq!(bv, back, epsilon = 1e-9);

            let j = frame.free_to_bound_jacobian(&trf, &free_params) * frame.bound_to_free_jacobian(&trf, &bv);
            assert_abs_diff_eq!(j, BoundMatrix::identity(), epsilon = 1e-9);
        }
    }

    #[test]
    fn bound_to_free_jacobian_matches_finite_differences() {
        let trf = tilted();
        let frames = [
            (LocalFrame::Polar2, Point2::new(2.5, 0.8)),
            (LocalFrame::Cylindrical2 { radius: 4.0 }, Point2::new(1.9, -3.0)),
            (LocalFrame::Line2, Point2::new(-0.6, 12.0)),
        ];
        let h = 1e-6;
        for (frame, loc) in frames {
            let bv = bound_at(loc);
            let jac = frame.bound_to_free_jacobian(&trf, &bv);
            for col in 0..6 {
                let mut plus = bv;
                let mut minus = bv;
                plus[col] += h;
                minus[col] -= h;
                let numeric = (bound_to_free(&frame, &trf, &plus) - bound_to_free(&frame, &trf, &minus)) / (2.0 * h);
                for row in 0..8 {
                    assert_abs_diff_eq!(jac[(row, col)], numeric[row], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn line_sign_follows_side_of_wire() {
        let trf = Transform3::identity();
        let dir = Vector3::x();
        let left = LocalFrame::Line2.global_to_local(&trf, &Point3::new(0.0, 1.0, 2.0), &dir);
        let right = LocalFrame::Line2.global_to_local(&trf, &Point3::new(0.0, -1.0, 2.0), &dir);
        assert_relative_eq!(left.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(right.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(left.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn planar_path_derivative() {
        let trf = Transform3::identity();
        let params = FreeTrackParameters::from_parts(Point3::origin(), 0.0, Vector3::new(0.0, 0.6, 0.8), 0.1);
        let d = LocalFrame::Cartesian2.path_derivative(&trf, &params);
        // Moving the start by +1 along the normal shortens the path by 1/cos.
        assert_relative_eq!(d[(0, free::POS2)], -1.25, epsilon = 1e-12);
        assert_relative_eq!(d[(0, free::POS0)], 0.0, epsilon = 1e-12);
    }
}
