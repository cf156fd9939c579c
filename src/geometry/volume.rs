use serde::{Deserialize, Serialize};

use crate::math::{Point3, Ray, Transform3};

use super::grid::Grid;
use super::mask::{plane_crossing, Cylinder, IntersectionStatus};

/// Volume link of portals at the outer boundary of the geometry.
pub const LEAVING_WORLD: usize = usize::MAX;

/// Geometric extent of a volume in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolumeShape {
    /// Tube (or full cylinder for `inner_r == 0`) centred on the local z axis.
    Cylinder { inner_r: f64, outer_r: f64, half_z: f64 },
    Cuboid { half_x: f64, half_y: f64, half_z: f64 },
}

impl VolumeShape {
    #[must_use]
    pub fn contains(&self, local: &Point3, tolerance: f64) -> bool {
        match *self {
            Self::Cylinder {
                inner_r,
                outer_r,
                half_z,
            } => {
                let r = local.x.hypot(local.y);
                r >= inner_r - tolerance && r <= outer_r + tolerance && local.z.abs() <= half_z + tolerance
            }
            Self::Cuboid { half_x, half_y, half_z } => {
                local.x.abs() <= half_x + tolerance
                    && local.y.abs() <= half_y + tolerance
                    && local.z.abs() <= half_z + tolerance
            }
        }
    }
}

/// A navigation volume: its extent, the surfaces it owns (portals included)
/// and an optional acceleration grid over its non-portal surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub index: usize,
    pub shape: VolumeShape,
    pub transform: usize,
    pub(crate) surfaces: Vec<usize>,
    pub grid: Option<usize>,
}

impl Volume {
    /// Surface indices in insertion order.
    #[must_use]
    pub fn surfaces(&self) -> &[usize] {
        &self.surfaces
    }
}

/// Reference shape that a surface grid is spanned on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GridFrame {
    /// Binned in `(phi, z)` on a cylinder of the given radius.
    Cylindrical { radius: f64 },
    /// Binned in `(x, y)` on the local `z = 0` plane.
    Cartesian,
    /// Binned in `(r, phi)` on the local `z = 0` plane.
    Polar,
}

impl GridFrame {
    fn grid_point(self, local: &Point3) -> [f64; 2] {
        match self {
            Self::Cylindrical { .. } => [local.y.atan2(local.x), local.z],
            Self::Cartesian => [local.x, local.y],
            Self::Polar => [local.x.hypot(local.y), local.y.atan2(local.x)],
        }
    }
}

/// Acceleration structure: surface indices binned over a reference shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub frame: GridFrame,
    pub transform: Transform3,
    pub grid: Grid<Vec<usize>, 2>,
    /// Bins visited on either side of a crossing, per axis.
    pub neighborhood: [usize; 2],
}

impl SurfaceGrid {
    #[must_use]
    pub fn new(frame: GridFrame, transform: Transform3, grid: Grid<Vec<usize>, 2>, neighborhood: [usize; 2]) -> Self {
        Self {
            frame,
            transform,
            grid,
            neighborhood,
        }
    }

    /// Visits the surfaces binned around the ray origin and around every
    /// forward crossing of the ray with the reference shape. A surface can be
    /// visited more than once.
    pub fn visit_candidates(&self, ray: &Ray, mut visit: impl FnMut(usize)) {
        let local = ray.to_local(&self.transform);
        let mut visit_around = |p: &Point3| {
            let point = self.frame.grid_point(p);
            self.grid.visit_neighborhood(&point, &self.neighborhood, |bin| {
                for &surface in bin {
                    visit(surface);
                }
            });
        };

        visit_around(&local.origin);
        match self.frame {
            GridFrame::Cylindrical { radius } => {
                for hit in Cylinder::unbounded(radius).intersect(&local, 0.0) {
                    if hit.status != IntersectionStatus::Missed && hit.path > 0.0 {
                        visit_around(&hit.local);
                    }
                }
            }
            GridFrame::Cartesian | GridFrame::Polar => {
                if let Some((path, p)) = plane_crossing(&local) {
                    if path > 0.0 {
                        visit_around(&p);
                    }
                }
            }
        }
    }
}
