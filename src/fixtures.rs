//! Toy detectors shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, PI, TAU};

use crate::geometry::grid::{Axis, AxisBounds, Grid};
use crate::geometry::mask::{Cylinder, Disc, Line, Mask, Rectangle};
use crate::geometry::{GeometryStore, GridFrame, Surface, SurfaceGrid, SurfaceRole, VolumeShape, LEAVING_WORLD};
use crate::material::{predefined, MaterialMap, MaterialRod, MaterialSlab};
use crate::math::{Transform3, Vector3};

pub struct CylinderIds {
    pub volume: usize,
    pub sensitive: usize,
    pub negative_portal: usize,
    pub positive_portal: usize,
}

/// One tube of radius 3 and half length 4 with a sensitive barrel on its
/// mantle. The `-z` disc leads back into the tube, the `+z` disc out of the
/// world. The barrel optionally carries 0.5 mm of silicon.
pub fn cylinder_detector(with_material: bool) -> (GeometryStore, CylinderIds) {
    let mut store = GeometryStore::new();
    let identity = store.add_transform(Transform3::identity());
    let volume = store
        .add_volume(
            VolumeShape::Cylinder {
                inner_r: 0.0,
                outer_r: 3.0,
                half_z: 4.0,
            },
            identity,
        )
        .unwrap();

    let barrel = store.add_mask(Mask::Cylinder(Cylinder::new(3.0, -4.0, 4.0, volume).unwrap()));
    let mut surface = Surface::new(identity, barrel, volume, SurfaceRole::Sensitive).with_id(1);
    if with_material {
        surface = surface.with_material(store.add_slab(MaterialSlab::new(predefined::silicon(), 0.5).unwrap()));
    }
    let sensitive = store.add_surface(surface).unwrap();

    let neg = store.add_transform(Transform3::from_translation(Vector3::new(0.0, 0.0, -4.0)));
    let neg_mask = store.add_mask(Mask::Disc(Disc::new(0.0, 3.0, volume).unwrap()));
    let negative_portal = store
        .add_surface(Surface::new(neg, neg_mask, volume, SurfaceRole::Portal).with_id(2))
        .unwrap();

    let pos = store.add_transform(Transform3::from_translation(Vector3::new(0.0, 0.0, 4.0)));
    let pos_mask = store.add_mask(Mask::Disc(Disc::new(0.0, 3.0, LEAVING_WORLD).unwrap()));
    let positive_portal = store
        .add_surface(Surface::new(pos, pos_mask, volume, SurfaceRole::Portal).with_id(3))
        .unwrap();

    store.validate().unwrap();
    (
        store,
        CylinderIds {
            volume,
            sensitive,
            negative_portal,
            positive_portal,
        },
    )
}

pub struct BarrelIds {
    pub volume: usize,
    pub modules: Vec<usize>,
    pub portals: Vec<usize>,
}

pub const BARREL_RADIUS: f64 = 30.0;
pub const BARREL_HALF_Z: f64 = 50.0;

/// Azimuth of the centre of barrel module `k`.
pub fn module_phi(k: u32) -> f64 {
    -PI + FRAC_PI_8 + FRAC_PI_4 * f64::from(k)
}

/// Eight slightly overlapping planar modules tangent to a cylinder of
/// radius 30 inside a tube of radius 40, all portals leading out of the
/// world. With `with_grid` the modules are binned in phi.
pub fn barrel_detector(with_grid: bool) -> (GeometryStore, BarrelIds) {
    let mut store = GeometryStore::new();
    let identity = store.add_transform(Transform3::identity());
    let volume = store
        .add_volume(
            VolumeShape::Cylinder {
                inner_r: 0.0,
                outer_r: 40.0,
                half_z: BARREL_HALF_Z,
            },
            identity,
        )
        .unwrap();

    let half_x = BARREL_RADIUS * FRAC_PI_8.tan() * 1.1;
    let module_mask = store.add_mask(Mask::Rectangle(Rectangle::new(half_x, BARREL_HALF_Z, volume).unwrap()));
    let mut modules = Vec::new();
    for k in 0..8_u32 {
        let (s, c) = module_phi(k).sin_cos();
        let trf = Transform3::new(
            Vector3::new(c, s, 0.0) * BARREL_RADIUS,
            Vector3::new(c, s, 0.0),
            Vector3::new(-s, c, 0.0),
        )
        .unwrap();
        let t = store.add_transform(trf);
        let id = 100 + u64::from(k);
        modules.push(
            store
                .add_surface(Surface::new(t, module_mask, volume, SurfaceRole::Sensitive).with_id(id))
                .unwrap(),
        );
    }

    let portals = closing_portals(&mut store, volume, 40.0, BARREL_HALF_Z);

    if with_grid {
        let axes = [
            Axis::regular(AxisBounds::Circular, -PI, PI, 8).unwrap(),
            Axis::regular(AxisBounds::Closed, -BARREL_HALF_Z, BARREL_HALF_Z, 1).unwrap(),
        ];
        let bins = modules.iter().map(|&m| vec![m]).collect();
        let grid = SurfaceGrid::new(
            GridFrame::Cylindrical { radius: BARREL_RADIUS },
            Transform3::identity(),
            Grid::new(axes, bins).unwrap(),
            [1, 0],
        );
        store.add_surface_grid(volume, grid).unwrap();
    }

    store.validate().unwrap();
    (
        store,
        BarrelIds {
            volume,
            modules,
            portals,
        },
    )
}

/// Outer tube and end caps of a cylindrical volume, all leading out of the
/// world.
fn closing_portals(store: &mut GeometryStore, volume: usize, radius: f64, half_z: f64) -> Vec<usize> {
    let identity = store.add_transform(Transform3::identity());
    let tube = store.add_mask(Mask::Cylinder(
        Cylinder::new(radius, -half_z, half_z, LEAVING_WORLD).unwrap(),
    ));
    let cap = store.add_mask(Mask::Disc(Disc::new(0.0, radius, LEAVING_WORLD).unwrap()));
    let neg = store.add_transform(Transform3::from_translation(Vector3::new(0.0, 0.0, -half_z)));
    let pos = store.add_transform(Transform3::from_translation(Vector3::new(0.0, 0.0, half_z)));
    [(identity, tube), (neg, cap), (pos, cap)]
        .into_iter()
        .map(|(trf, mask)| {
            store
                .add_surface(Surface::new(trf, mask, volume, SurfaceRole::Portal))
                .unwrap()
        })
        .collect()
}

pub struct MappedPlaneIds {
    pub volume: usize,
    pub plane: usize,
}

/// A 10 x 10 passive plane at `z = 0` inside a tube of radius and half
/// length 10. Its material map covers only the `x >= 0` half with 0.5 mm of
/// silicon.
pub fn mapped_plane_detector() -> (GeometryStore, MappedPlaneIds) {
    let mut store = GeometryStore::new();
    let identity = store.add_transform(Transform3::identity());
    let volume = store
        .add_volume(
            VolumeShape::Cylinder {
                inner_r: 0.0,
                outer_r: 10.0,
                half_z: 10.0,
            },
            identity,
        )
        .unwrap();

    let axes = [
        Axis::regular(AxisBounds::Open, 0.0, 5.0, 2).unwrap(),
        Axis::regular(AxisBounds::Open, -5.0, 5.0, 1).unwrap(),
    ];
    let map: MaterialMap = Grid::filled(axes, MaterialSlab::new(predefined::silicon(), 0.5).unwrap());
    let material = store.add_slab_map(map);
    let mask = store.add_mask(Mask::Rectangle(Rectangle::new(5.0, 5.0, volume).unwrap()));
    let plane = store
        .add_surface(Surface::new(identity, mask, volume, SurfaceRole::Passive).with_material(material))
        .unwrap();
    closing_portals(&mut store, volume, 10.0, 10.0);

    store.validate().unwrap();
    (store, MappedPlaneIds { volume, plane })
}

pub struct WireChamberIds {
    pub volume: usize,
    /// Wire surfaces per layer, wire 0 of every layer on the `+x` axis.
    pub layers: Vec<Vec<usize>>,
    pub portals: Vec<usize>,
}

/// Radius and wire count of the wire chamber layers.
pub const WIRE_LAYERS: [(f64, u32); 4] = [(6.0, 18), (10.0, 30), (14.0, 42), (18.0, 54)];
pub const WIRE_CELL: f64 = 1.0;
pub const WIRE_HALF_Z: f64 = 50.0;
pub const WIRE_RADIUS: f64 = 0.02;

/// Concentric layers of axial wires with square drift cells of half width
/// 1 inside a tube of radius 25. With `with_material` every wire is a
/// tungsten rod of radius 20 um.
pub fn wire_chamber(with_material: bool) -> (GeometryStore, WireChamberIds) {
    let mut store = GeometryStore::new();
    let identity = store.add_transform(Transform3::identity());
    let volume = store
        .add_volume(
            VolumeShape::Cylinder {
                inner_r: 0.0,
                outer_r: 25.0,
                half_z: WIRE_HALF_Z,
            },
            identity,
        )
        .unwrap();

    let cell = store.add_mask(Mask::Line(Line::new(WIRE_CELL, WIRE_HALF_Z, true, volume).unwrap()));
    let rod = with_material.then(|| store.add_rod(MaterialRod::new(predefined::tungsten(), WIRE_RADIUS).unwrap()));
    let mut layers = Vec::new();
    let mut id = 1000;
    for (radius, count) in WIRE_LAYERS {
        let mut wires = Vec::new();
        for k in 0..count {
            let (s, c) = (TAU * f64::from(k) / f64::from(count)).sin_cos();
            let radial = Vector3::new(c, s, 0.0);
            let t = store.add_transform(Transform3::new(radial * radius, Vector3::z(), radial).unwrap());
            let mut wire = Surface::new(t, cell, volume, SurfaceRole::Sensitive).with_id(id);
            if let Some(rod) = rod {
                wire = wire.with_material(rod);
            }
            wires.push(store.add_surface(wire).unwrap());
            id += 1;
        }
        layers.push(wires);
    }
    let portals = closing_portals(&mut store, volume, 25.0, WIRE_HALF_Z);

    store.validate().unwrap();
    (
        store,
        WireChamberIds {
            volume,
            layers,
            portals,
        },
    )
}
