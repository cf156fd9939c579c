use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Ray};

use super::{planar_hits, Hits, IntersectionStatus};

/// A ring `inner_r <= r <= outer_r` in the local `z = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub inner_r: f64,
    pub outer_r: f64,
    pub volume_link: usize,
}

impl Disc {
    /// # Errors
    ///
    /// Returns an error if the radii are negative or not ordered.
    pub fn new(inner_r: f64, outer_r: f64, volume_link: usize) -> Result<Self> {
        if inner_r < 0.0 || outer_r <= inner_r {
            return Err(GeometryError::InvalidBounds {
                shape: "disc",
                reason: "radii must satisfy 0 <= inner < outer",
            }
            .into());
        }
        Ok(Self {
            inner_r,
            outer_r,
            volume_link,
        })
    }

    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        let r = local.x.hypot(local.y);
        if r >= self.inner_r - tolerance && r <= self.outer_r + tolerance {
            IntersectionStatus::Inside
        } else {
            IntersectionStatus::Outside
        }
    }

    #[must_use]
    pub fn intersect(&self, ray: &Ray, tolerance: f64) -> Hits {
        planar_hits(ray, |p| self.is_inside(p, tolerance))
    }
}
