use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Ray};

use super::{planar_hits, Hits, IntersectionStatus};

/// A planar region bounded in a single local coordinate:
/// `|p[check_index]| <= bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleBound {
    pub check_index: usize,
    pub bound: f64,
    pub volume_link: usize,
}

impl SingleBound {
    /// # Errors
    ///
    /// Returns an error if `check_index` is not a 3D coordinate index or the
    /// bound is negative.
    pub fn new(check_index: usize, bound: f64, volume_link: usize) -> Result<Self> {
        if check_index > 2 {
            return Err(GeometryError::InvalidBounds {
                shape: "single bound",
                reason: "check index must be 0, 1 or 2",
            }
            .into());
        }
        if bound < 0.0 {
            return Err(GeometryError::InvalidBounds {
                shape: "single bound",
                reason: "bound must not be negative",
            }
            .into());
        }
        Ok(Self {
            check_index,
            bound,
            volume_link,
        })
    }

    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        if local[self.check_index].abs() <= self.bound + tolerance {
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
