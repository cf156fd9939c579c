mod cylinder;
mod disc;
mod line;
mod rectangle;
mod single_bound;

pub use cylinder::Cylinder;
pub use disc::Disc;
pub use line::Line;
pub use rectangle::Rectangle;
pub use single_bound::SingleBound;

use serde::{Deserialize, Serialize};

use crate::math::{Point3, Ray, TOLERANCE};

use super::frame::LocalFrame;

/// Classification of a ray crossing against a bounded shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntersectionStatus {
    /// The ray hits the underlying surface within the shape's bounds.
    Inside,
    /// The ray hits the underlying surface outside the shape's bounds.
    Outside,
    /// The ray does not hit the underlying surface at all.
    Missed,
}

/// One solution of a ray/shape intersection, in the shape's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    pub status: IntersectionStatus,
    /// Signed path length along the ray.
    pub path: f64,
    /// Intersection point in local 3D coordinates.
    pub local: Point3,
}

impl LocalHit {
    /// A hit that never happened.
    #[must_use]
    pub fn missed() -> Self {
        Self {
            status: IntersectionStatus::Missed,
            path: f64::INFINITY,
            local: Point3::origin(),
        }
    }

    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.status == IntersectionStatus::Inside
    }
}

/// Up to two solutions, ordered by path length. Unused slots are missed.
pub type Hits = [LocalHit; 2];

/// Intersects a local ray with the plane `z = 0`.
///
/// Returns `None` if the ray runs parallel to the plane.
pub(crate) fn plane_crossing(ray: &Ray) -> Option<(f64, Point3)> {
    let dz = ray.direction.z;
    if dz.abs() < TOLERANCE {
        return None;
    }
    let path = -ray.origin.z / dz;
    Some((path, ray.at(path)))
}

/// Builds the hit pair of a planar shape from its inside check.
pub(crate) fn planar_hits(ray: &Ray, status_at: impl Fn(&Point3) -> IntersectionStatus) -> Hits {
    match plane_crossing(ray) {
        Some((path, local)) => [
            LocalHit {
                status: status_at(&local),
                path,
                local,
            },
            LocalHit::missed(),
        ],
        None => [LocalHit::missed(), LocalHit::missed()],
    }
}

/// Closed set of shape kinds; the tag half of a [`MaskLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskKind {
    Rectangle,
    Disc,
    Cylinder,
    Line,
    SingleBound,
}

/// `(kind, index)` link into the mask collections of a geometry store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaskLink {
    pub kind: MaskKind,
    pub index: usize,
}

impl MaskLink {
    #[must_use]
    pub fn new(kind: MaskKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// A bounded shape of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mask {
    Rectangle(Rectangle),
    Disc(Disc),
    Cylinder(Cylinder),
    Line(Line),
    SingleBound(SingleBound),
}

impl Mask {
    #[must_use]
    pub fn kind(&self) -> MaskKind {
        match self {
            Self::Rectangle(_) => MaskKind::Rectangle,
            Self::Disc(_) => MaskKind::Disc,
            Self::Cylinder(_) => MaskKind::Cylinder,
            Self::Line(_) => MaskKind::Line,
            Self::SingleBound(_) => MaskKind::SingleBound,
        }
    }

    /// Volume reached when the surface is crossed as a portal.
    #[must_use]
    pub fn volume_link(&self) -> usize {
        match self {
            Self::Rectangle(m) => m.volume_link,
            Self::Disc(m) => m.volume_link,
            Self::Cylinder(m) => m.volume_link,
            Self::Line(m) => m.volume_link,
            Self::SingleBound(m) => m.volume_link,
        }
    }

    /// Intersects a ray given in the shape's local frame.
    #[must_use]
    pub fn intersect(&self, ray: &Ray, tolerance: f64) -> Hits {
        match self {
            Self::Rectangle(m) => m.intersect(ray, tolerance),
            Self::Disc(m) => m.intersect(ray, tolerance),
            Self::Cylinder(m) => m.intersect(ray, tolerance),
            Self::Line(m) => m.intersect(ray, tolerance),
            Self::SingleBound(m) => m.intersect(ray, tolerance),
        }
    }

    /// Checks a local point against the shape's bounds.
    #[must_use]
    pub fn is_inside(&self, local: &Point3, tolerance: f64) -> IntersectionStatus {
        match self {
            Self::Rectangle(m) => m.is_inside(local, tolerance),
            Self::Disc(m) => m.is_inside(local, tolerance),
            Self::Cylinder(m) => m.is_inside(local, tolerance),
            Self::Line(m) => m.is_inside(local, tolerance),
            Self::SingleBound(m) => m.is_inside(local, tolerance),
        }
    }

    /// Coordinate frame of the bound track parameters on this shape.
    #[must_use]
    pub fn frame(&self) -> LocalFrame {
        match self {
            Self::Rectangle(_) | Self::SingleBound(_) => LocalFrame::Cartesian2,
            Self::Disc(_) => LocalFrame::Polar2,
            Self::Cylinder(m) => LocalFrame::Cylindrical2 { radius: m.radius },
            Self::Line(_) => LocalFrame::Line2,
        }
    }
}
