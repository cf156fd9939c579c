use crate::error::{GeometryError, Result};
use crate::material::{accessor, MaterialKind, MaterialLink, MaterialMap, MaterialRod, MaterialSlab, MaterialUnit};
use crate::math::{Point2, Point3, Transform3};

use super::mask::{Cylinder, Disc, Line, Mask, MaskKind, MaskLink, Rectangle, SingleBound};
use super::surface::Surface;
use super::volume::{SurfaceGrid, Volume, VolumeShape, LEAVING_WORLD};

fn invalid_link(collection: &'static str, index: usize, size: usize) -> GeometryError {
    GeometryError::InvalidLink {
        collection,
        index,
        size,
    }
}

/// Flat collections of everything a propagation reads.
///
/// Entities reference each other by index or by `(kind, index)` link. A
/// builder fills the store through the `add_*` methods, which check every
/// link they are given; afterwards the store is only read.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    volumes: Vec<Volume>,
    surfaces: Vec<Surface>,
    transforms: Vec<Transform3>,
    rectangles: Vec<Rectangle>,
    discs: Vec<Disc>,
    cylinders: Vec<Cylinder>,
    lines: Vec<Line>,
    single_bounds: Vec<SingleBound>,
    slabs: Vec<MaterialSlab>,
    rods: Vec<MaterialRod>,
    slab_maps: Vec<MaterialMap>,
    surface_grids: Vec<SurfaceGrid>,
}

impl GeometryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Insertion ---

    /// Inserts a placement and returns its index.
    pub fn add_transform(&mut self, transform: Transform3) -> usize {
        self.transforms.push(transform);
        self.transforms.len() - 1
    }

    /// Inserts a mask into the collection of its kind and returns its link.
    pub fn add_mask(&mut self, mask: Mask) -> MaskLink {
        let index = match mask {
            Mask::Rectangle(m) => push(&mut self.rectangles, m),
            Mask::Disc(m) => push(&mut self.discs, m),
            Mask::Cylinder(m) => push(&mut self.cylinders, m),
            Mask::Line(m) => push(&mut self.lines, m),
            Mask::SingleBound(m) => push(&mut self.single_bounds, m),
        };
        MaskLink::new(mask.kind(), index)
    }

    pub fn add_slab(&mut self, slab: MaterialSlab) -> MaterialLink {
        MaterialLink::new(MaterialKind::Slab, push(&mut self.slabs, slab))
    }

    pub fn add_rod(&mut self, rod: MaterialRod) -> MaterialLink {
        MaterialLink::new(MaterialKind::Rod, push(&mut self.rods, rod))
    }

    pub fn add_slab_map(&mut self, map: MaterialMap) -> MaterialLink {
        MaterialLink::new(MaterialKind::SlabMap, push(&mut self.slab_maps, map))
    }

    /// Inserts an empty volume and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement does not exist.
    pub fn add_volume(&mut self, shape: VolumeShape, transform: usize) -> Result<usize> {
        self.transform(transform)?;
        let index = self.volumes.len();
        self.volumes.push(Volume {
            index,
            shape,
            transform,
            surfaces: Vec::new(),
            grid: None,
        });
        Ok(index)
    }

    /// Inserts a surface and registers it with its volume.
    ///
    /// # Errors
    ///
    /// Returns an error if any link of the surface is dangling.
    pub fn add_surface(&mut self, surface: Surface) -> Result<usize> {
        self.transform(surface.transform)?;
        self.mask(surface.mask)?;
        if let Some(link) = surface.material {
            let size = self.material_count(link.kind);
            if link.index >= size {
                return Err(invalid_link("material", link.index, size).into());
            }
        }
        let size = self.volumes.len();
        let volume = self
            .volumes
            .get_mut(surface.volume)
            .ok_or_else(|| invalid_link("volume", surface.volume, size))?;
        let index = self.surfaces.len();
        volume.surfaces.push(index);
        self.surfaces.push(surface);
        Ok(index)
    }

    /// Attaches an acceleration grid to a volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume does not exist or a binned surface does
    /// not belong to it.
    pub fn add_surface_grid(&mut self, volume: usize, grid: SurfaceGrid) -> Result<usize> {
        let owned = self.volume(volume)?.surfaces();
        let mut dangling = None;
        for a in 0..grid.grid.axes()[0].bins() {
            for b in 0..grid.grid.axes()[1].bins() {
                if let Some(bin) = grid.grid.at(&[a, b]) {
                    dangling = dangling.or_else(|| bin.iter().copied().find(|s| !owned.contains(s)));
                }
            }
        }
        if let Some(surface) = dangling {
            return Err(invalid_link("surface", surface, self.surfaces.len()).into());
        }
        let index = push(&mut self.surface_grids, grid);
        if let Some(v) = self.volumes.get_mut(volume) {
            v.grid = Some(index);
        }
        Ok(index)
    }

    /// Checks that every mask's volume link points to an existing volume or
    /// out of the world.
    ///
    /// # Errors
    ///
    /// Returns the first dangling volume link.
    pub fn validate(&self) -> Result<()> {
        for surface in &self.surfaces {
            let link = self.mask(surface.mask)?.volume_link();
            if surface.is_portal() && link != LEAVING_WORLD && link >= self.volumes.len() {
                return Err(invalid_link("volume", link, self.volumes.len()).into());
            }
        }
        Ok(())
    }

    // --- Read access ---

    #[must_use]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn volume(&self, index: usize) -> Result<&Volume> {
        self.volumes
            .get(index)
            .ok_or_else(|| invalid_link("volume", index, self.volumes.len()).into())
    }

    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn surface(&self, index: usize) -> Result<&Surface> {
        self.surfaces
            .get(index)
            .ok_or_else(|| invalid_link("surface", index, self.surfaces.len()).into())
    }

    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn transform(&self, index: usize) -> Result<&Transform3> {
        self.transforms
            .get(index)
            .ok_or_else(|| invalid_link("transform", index, self.transforms.len()).into())
    }

    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn surface_grid(&self, index: usize) -> Result<&SurfaceGrid> {
        self.surface_grids
            .get(index)
            .ok_or_else(|| invalid_link("surface grid", index, self.surface_grids.len()).into())
    }

    fn mask_count(&self, kind: MaskKind) -> usize {
        match kind {
            MaskKind::Rectangle => self.rectangles.len(),
            MaskKind::Disc => self.discs.len(),
            MaskKind::Cylinder => self.cylinders.len(),
            MaskKind::Line => self.lines.len(),
            MaskKind::SingleBound => self.single_bounds.len(),
        }
    }

    /// Resolves a mask link.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is out of range for its kind.
    pub fn mask(&self, link: MaskLink) -> Result<Mask> {
        let i = link.index;
        let mask = match link.kind {
            MaskKind::Rectangle => self.rectangles.get(i).copied().map(Mask::Rectangle),
            MaskKind::Disc => self.discs.get(i).copied().map(Mask::Disc),
            MaskKind::Cylinder => self.cylinders.get(i).copied().map(Mask::Cylinder),
            MaskKind::Line => self.lines.get(i).copied().map(Mask::Line),
            MaskKind::SingleBound => self.single_bounds.get(i).copied().map(Mask::SingleBound),
        };
        mask.ok_or_else(|| invalid_link("mask", i, self.mask_count(link.kind)).into())
    }

    fn material_count(&self, kind: MaterialKind) -> usize {
        match kind {
            MaterialKind::Slab => self.slabs.len(),
            MaterialKind::Rod => self.rods.len(),
            MaterialKind::SlabMap => self.slab_maps.len(),
        }
    }

    /// Material unit of a link at a bound local position. `None` if the link
    /// is dangling or the position is outside a material map.
    #[must_use]
    pub fn material(&self, link: MaterialLink, local: &Point2) -> Option<MaterialUnit<'_>> {
        match link.kind {
            MaterialKind::Slab => accessor::get(self.slabs.as_slice(), link.index, local).map(MaterialUnit::Slab),
            MaterialKind::Rod => accessor::get(self.rods.as_slice(), link.index, local).map(MaterialUnit::Rod),
            MaterialKind::SlabMap => {
                accessor::get(self.slab_maps.as_slice(), link.index, local).map(MaterialUnit::Slab)
            }
        }
    }

    /// Finds the volume containing a global point, preferring the last
    /// inserted volume when volumes are nested.
    #[must_use]
    pub fn find_volume(&self, point: &Point3, tolerance: f64) -> Option<usize> {
        self.volumes.iter().rev().find_map(|v| {
            let trf = self.transforms.get(v.transform)?;
            v.shape
                .contains(&trf.point_to_local(point), tolerance)
                .then_some(v.index)
        })
    }
}

fn push<T>(collection: &mut Vec<T>, item: T) -> usize {
    collection.push(item);
    collection.len() - 1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::grid::{Axis, AxisBounds, Grid};
    use crate::geometry::surface::SurfaceRole;
    use crate::geometry::volume::GridFrame;
    use crate::material::predefined;

    fn tube() -> VolumeShape {
        VolumeShape::Cylinder {
            inner_r: 0.0,
            outer_r: 3.0,
            half_z: 4.0,
        }
    }

    #[test]
    fn masks_are_stored_per_kind() {
        let mut store = GeometryStore::new();
        let a = store.add_mask(Mask::Disc(Disc::new(0.0, 3.0, 0).unwrap()));
        let b = store.add_mask(Mask::Rectangle(Rectangle::new(1.0, 1.0, 0).unwrap()));
        let c = store.add_mask(Mask::Disc(Disc::new(1.0, 2.0, 0).unwrap()));
        assert_eq!(a, MaskLink::new(MaskKind::Disc, 0));
        assert_eq!(b, MaskLink::new(MaskKind::Rectangle, 0));
        assert_eq!(c, MaskLink::new(MaskKind::Disc, 1));
        assert_eq!(store.mask(c).unwrap(), Mask::Disc(Disc::new(1.0, 2.0, 0).unwrap()));
        assert!(store.mask(MaskLink::new(MaskKind::Line, 0)).is_err());
    }

    #[test]
    fn surface_links_are_checked() {
        let mut store = GeometryStore::new();
        let trf = store.add_transform(Transform3::identity());
        let vol = store.add_volume(tube(), trf).unwrap();
        let mask = store.add_mask(Mask::Cylinder(Cylinder::new(3.0, -4.0, 4.0, vol).unwrap()));

        assert!(store
            .add_surface(Surface::new(5, mask, vol, SurfaceRole::Sensitive))
            .is_err());
        assert!(store
            .add_surface(Surface::new(trf, mask, 3, SurfaceRole::Sensitive))
            .is_err());
        let dangling_material = MaterialLink::new(MaterialKind::Rod, 0);
        assert!(store
            .add_surface(Surface::new(trf, mask, vol, SurfaceRole::Sensitive).with_material(dangling_material))
            .is_err());

        let s = store
            .add_surface(Surface::new(trf, mask, vol, SurfaceRole::Sensitive))
            .unwrap();
        assert_eq!(store.volume(vol).unwrap().surfaces(), &[s]);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn portal_volume_links_are_validated() {
        let mut store = GeometryStore::new();
        let trf = store.add_transform(Transform3::identity());
        let vol = store.add_volume(tube(), trf).unwrap();
        let exit = store.add_mask(Mask::Disc(Disc::new(0.0, 3.0, LEAVING_WORLD).unwrap()));
        let broken = store.add_mask(Mask::Disc(Disc::new(0.0, 3.0, 7).unwrap()));
        store
            .add_surface(Surface::new(trf, exit, vol, SurfaceRole::Portal))
            .unwrap();
        assert!(store.validate().is_ok());
        store
            .add_surface(Surface::new(trf, broken, vol, SurfaceRole::Portal))
            .unwrap();
        assert!(store.validate().is_err());
    }

    #[test]
    fn grid_surfaces_must_belong_to_volume() {
        let mut store = GeometryStore::new();
        let trf = store.add_transform(Transform3::identity());
        let vol = store.add_volume(tube(), trf).unwrap();
        let axes = [
            Axis::regular(AxisBounds::Open, -1.0, 1.0, 1).unwrap(),
            Axis::regular(AxisBounds::Open, -1.0, 1.0, 1).unwrap(),
        ];
        let grid = SurfaceGrid::new(
            GridFrame::Cartesian,
            Transform3::identity(),
            Grid::new(axes, vec![vec![0]]).unwrap(),
            [0, 0],
        );
        assert!(store.add_surface_grid(vol, grid.clone()).is_err());

        let mask = store.add_mask(Mask::Rectangle(Rectangle::new(1.0, 1.0, vol).unwrap()));
        store
            .add_surface(Surface::new(trf, mask, vol, SurfaceRole::Passive))
            .unwrap();
        let g = store.add_surface_grid(vol, grid).unwrap();
        assert_eq!(store.volume(vol).unwrap().grid, Some(g));
    }

    #[test]
    fn material_lookup_by_kind() {
        let mut store = GeometryStore::new();
        let slab = MaterialSlab::new(predefined::silicon(), 0.3).unwrap();
        let link = store.add_slab(slab);
        assert_eq!(
            store.material(link, &Point2::new(5.0, 5.0)),
            Some(MaterialUnit::Slab(&slab))
        );
        assert_eq!(store.material(MaterialLink::new(MaterialKind::SlabMap, 0), &Point2::origin()), None);
    }

    #[test]
    fn locates_volume() {
        let mut store = GeometryStore::new();
        let trf = store.add_transform(Transform3::identity());
        let vol = store.add_volume(tube(), trf).unwrap();
        assert_eq!(store.find_volume(&Point3::new(1.0, 1.0, 0.0), 0.0), Some(vol));
        assert_eq!(store.find_volume(&Point3::new(5.0, 0.0, 0.0), 0.0), None);
    }
}
