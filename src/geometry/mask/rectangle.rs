use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Ray};

use super::{planar_hits, Hits, IntersectionStatus};

/// A rectangle in the local `z = 0` plane, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub half_x: f64,
    pub half_y: f64,
    pub volume_link: usize,
}

impl Rectangle {
    /// Creates a rectangle from its half lengths.
    ///
    /// # Errors
    ///
    /// Returns an error if a half length is not positive.
    pub fn new(half_x: f64, half_y: f64, volume_link: usize) -> Result<Self> {
        if half_x <= 0.0 || half_y <= 0.0 {
            return Err(GeometryError::InvalidBounds {
                shape: "rectangle",
                reason: "half lengths must be positive",
            }
            .into());
        }
        Ok(Self {
            half_x,
            half_y,
            volume_link,
        })
    }

    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        if local.x.abs() <= self.half_x + tolerance && local.y.abs() <= self.half_y + tolerance {
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
