use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Ray, TOLERANCE};

use super::{Hits, IntersectionStatus, LocalHit};

/// A cylinder barrel of fixed radius around the local z axis.
///
/// `P(phi, z) = (radius * cos(phi), radius * sin(phi), z)` for
/// `lower_z <= z <= upper_z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub radius: f64,
    pub lower_z: f64,
    pub upper_z: f64,
    pub volume_link: usize,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the z range is empty.
    pub fn new(radius: f64, lower_z: f64, upper_z: f64, volume_link: usize) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::InvalidBounds {
                shape: "cylinder",
                reason: "radius must be positive",
            }
            .into());
        }
        if upper_z <= lower_z {
            return Err(GeometryError::InvalidBounds {
                shape: "cylinder",
                reason: "lower z must be below upper z",
            }
            .into());
        }
        Ok(Self {
            radius,
            lower_z,
            upper_z,
            volume_link,
        })
    }

    /// A cylinder of infinite length, used as a reference shape.
    #[must_use]
    pub fn unbounded(radius: f64) -> Self {
        Self {
            radius,
            lower_z: f64::NEG_INFINITY,
            upper_z: f64::INFINITY,
            volume_link: usize::MAX,
        }
    }

    /// Classifies a local point: off the barrel radius is `Missed`, on the
    /// barrel but outside the z range is `Outside`.
    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        let r = local.x.hypot(local.y);
        if (r - self.radius).abs() > tolerance.max(0.0) + TOLERANCE {
            return IntersectionStatus::Missed;
        }
        self.z_status(local.z, tolerance)
    }

    fn z_status(&self, z: f64, tolerance: f64) -> IntersectionStatus {
        if z >= self.lower_z - tolerance && z <= self.upper_z + tolerance {
            IntersectionStatus::Inside
        } else {
            IntersectionStatus::Outside
        }
    }

    /// Solves `|o_perp + s * d_perp|^2 = radius^2` for the local ray.
    #[must_use]
    pub fn intersect(&self, ray: &Ray, tolerance: f64) -> Hits {
        let o = ray.origin;
        let d = ray.direction;

        let a = d.x * d.x + d.y * d.y;
        if a < TOLERANCE {
            // Parallel to the axis
            return [LocalHit::missed(), LocalHit::missed()];
        }
        let b = 2.0 * (o.x * d.x + o.y * d.y);
        let c = o.x * o.x + o.y * o.y - self.radius * self.radius;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return [LocalHit::missed(), LocalHit::missed()];
        }
        let sqrt_disc = disc.sqrt();

        // Avoid cancellation between -b and sqrt_disc.
        let q = -0.5 * (b + b.signum() * sqrt_disc);
        let (mut s0, mut s1) = if q.abs() < TOLERANCE {
            (0.0, -b / a)
        } else {
            (q / a, c / q)
        };
        if s1 < s0 {
            std::mem::swap(&mut s0, &mut s1);
        }

        [s0, s1].map(|path| {
            let local = ray.at(path);
            LocalHit {
                status: self.z_status(local.z, tolerance),
                path,
                local,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    fn barrel() -> Cylinder {
        Cylinder::new(3.0, -4.0, 4.0, 0).unwrap()
    }

    #[test]
    fn point_classification() {
        let c = barrel();
        let r = 3.0;
        let p_in = Point3::new(r, 0.0, -1.0);
        let p_edge = Point3::new(0.0, r, 4.0);
        let p_out = Point3::new(r / 2.0_f64.sqrt(), r / 2.0_f64.sqrt(), 4.5);
        let p_off = Point3::new(1.0, 1.0, -9.0);

        assert_eq!(c.is_inside(&p_in, 0.0), IntersectionStatus::Inside);
        assert_eq!(c.is_inside(&p_edge, 0.0), IntersectionStatus::Inside);
        assert_eq!(c.is_inside(&p_out, 0.0), IntersectionStatus::Outside);
        assert_eq!(c.is_inside(&p_off, 0.0), IntersectionStatus::Missed);
        // Move the outside point inside using a tolerance
        assert_eq!(c.is_inside(&p_out, 0.6), IntersectionStatus::Inside);
    }

    #[test]
    fn radial_ray_from_outside() {
        let c = barrel();
        let ray = Ray::new(Point3::new(5.0, 0.0, 0.0), -Vector3::x()).unwrap();
        let hits = c.intersect(&ray, 0.0);
        assert!(hits[0].is_inside());
        assert!(hits[1].is_inside());
        assert_relative_eq!(hits[0].path, 2.0, epsilon = 1e-12);
        assert_relative_eq!(hits[1].path, 8.0, epsilon = 1e-12);
        assert_relative_eq!(hits[0].local, Point3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn ray_from_inside_has_one_hit_behind() {
        let c = barrel();
        let ray = Ray::new(Point3::origin(), Vector3::y()).unwrap();
        let hits = c.intersect(&ray, 0.0);
        assert_relative_eq!(hits[0].path, -3.0, epsilon = 1e-12);
        assert_relative_eq!(hits[1].path, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn axial_ray_misses() {
        let c = barrel();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::z()).unwrap();
        let hits = c.intersect(&ray, 0.0);
        assert_eq!(hits[0].status, IntersectionStatus::Missed);
        assert_eq!(hits[1].status, IntersectionStatus::Missed);
    }

    #[test]
    fn ray_passing_by_misses_and_steep_ray_is_outside() {
        let c = barrel();
        let by = Ray::new(Point3::new(5.0, 4.0, 0.0), -Vector3::x()).unwrap();
        assert_eq!(c.intersect(&by, 0.0)[0].status, IntersectionStatus::Missed);

        let steep = Ray::new(Point3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 5.0)).unwrap();
        let hits = c.intersect(&steep, 0.0);
        assert_eq!(hits[0].status, IntersectionStatus::Outside);
        assert_eq!(hits[1].status, IntersectionStatus::Outside);
    }

    #[test]
    fn invalid_radius() {
        assert!(Cylinder::new(0.0, -1.0, 1.0, 0).is_err());
        assert!(Cylinder::new(1.0, 1.0, -1.0, 0).is_err());
    }
}
