//! Uniform access to one unit of material on a surface.
//!
//! Homogeneous collections hold one unit per surface and ignore the local
//! point; material maps resolve the point into a bin and return the slab
//! stored there.

use crate::math::Point2;

use super::{Material, MaterialMap, MaterialRod, MaterialSlab};

/// A collection that yields one unit of material per `(index, local point)`.
pub trait MaterialAccess {
    type Unit;

    /// The unit at `index`, or `None` if the index is invalid or the point is
    /// outside a map's covered domain.
    fn unit_at(&self, index: usize, local: &Point2) -> Option<&Self::Unit>;
}

impl MaterialAccess for [MaterialSlab] {
    type Unit = MaterialSlab;

    fn unit_at(&self, index: usize, _local: &Point2) -> Option<&MaterialSlab> {
        <[MaterialSlab]>::get(self, index)
    }
}

impl MaterialAccess for [MaterialRod] {
    type Unit = MaterialRod;

    fn unit_at(&self, index: usize, _local: &Point2) -> Option<&MaterialRod> {
        <[MaterialRod]>::get(self, index)
    }
}

impl MaterialAccess for [MaterialMap] {
    type Unit = MaterialSlab;

    fn unit_at(&self, index: usize, local: &Point2) -> Option<&MaterialSlab> {
        <[MaterialMap]>::get(self, index)?.search(&[local.x, local.y])
    }
}

/// Looks up the material unit of `collection[index]` at `local`.
pub fn get<'a, C>(collection: &'a C, index: usize, local: &Point2) -> Option<&'a C::Unit>
where
    C: MaterialAccess + ?Sized,
{
    collection.unit_at(index, local)
}

/// One resolved unit of material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialUnit<'a> {
    Slab(&'a MaterialSlab),
    Rod(&'a MaterialRod),
}

impl MaterialUnit<'_> {
    #[must_use]
    pub fn material(&self) -> &Material {
        match self {
            Self::Slab(slab) => &slab.material,
            Self::Rod(rod) => &rod.material,
        }
    }

    /// Path length through the unit. Slabs use the incidence cosine, rods the
    /// distance of closest approach to their axis.
    #[must_use]
    pub fn path_segment(&self, cos_inc: f64, approach: f64) -> f64 {
        match self {
            Self::Slab(slab) => slab.path_segment(cos_inc),
            Self::Rod(rod) => rod.path_segment(approach),
        }
    }
}
