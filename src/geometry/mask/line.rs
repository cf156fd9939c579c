use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Ray, TOLERANCE};

use super::{Hits, IntersectionStatus, LocalHit};

/// A wire along the local z axis with a drift cell around it.
///
/// The cell is either a circle of radius `radius` (straw tube) or a square of
/// half width `radius` (wire chamber cell). The track crosses the line at its
/// point of closest approach to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub radius: f64,
    pub half_z: f64,
    pub square_cell: bool,
    pub volume_link: usize,
}

impl Line {
    /// # Errors
    ///
    /// Returns an error if the cell size or half length is not positive.
    pub fn new(radius: f64, half_z: f64, square_cell: bool, volume_link: usize) -> Result<Self> {
        if radius <= 0.0 || half_z <= 0.0 {
            return Err(GeometryError::InvalidBounds {
                shape: "line",
                reason: "cell size and half length must be positive",
            }
            .into());
        }
        Ok(Self {
            radius,
            half_z,
            square_cell,
            volume_link,
        })
    }

    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        let transverse = if self.square_cell {
            local.x.abs().max(local.y.abs())
        } else {
            local.x.hypot(local.y)
        };
        if transverse <= self.radius + tolerance && local.z.abs() <= self.half_z + tolerance {
            IntersectionStatus::Inside
        } else {
            IntersectionStatus::Outside
        }
    }

    #[must_use]
    pub fn intersect(&self, ray: &Ray, tolerance: f64) -> Hits {
        let o = ray.origin.coords;
        let d = ray.direction;

        // Wire direction is local z.
        let dz = d.z;
        let denom = 1.0 - dz * dz;
        if denom < TOLERANCE {
            return [LocalHit::missed(), LocalHit::missed()];
        }
        let path = (o.z * dz - o.dot(&d)) / denom;
        let local = ray.at(path);

        [
            LocalHit {
                status: self.is_inside(&local, tolerance),
                path,
                local,
            },
            LocalHit::missed(),
        ]
    }
}
