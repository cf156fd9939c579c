//! Material descriptions attached to surfaces: homogeneous slabs and rods,
//! and binned slab maps.

pub mod accessor;
pub mod interaction;
pub mod relativistic;

pub use accessor::{MaterialAccess, MaterialUnit};

use serde::{Deserialize, Serialize};

use crate::error::{MaterialError, Result};
use crate::geometry::grid::Grid;
use crate::math::units::{EV, G_PER_CM3, MM};

/// Sternheimer parametrisation of the density effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityEffectData {
    /// Mean excitation energy `I`.
    pub mean_excitation: f64,
    /// `C-bar`.
    pub c_bar: f64,
    pub x0: f64,
    pub x1: f64,
    pub a: f64,
    pub k: f64,
    /// Density effect at `x0` for conductors.
    pub delta0: f64,
}

/// Bulk material properties.
///
/// Densities are per mm³, the molar density is derived from the mass density
/// and the relative atomic mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    x0: f64,
    l0: f64,
    ar: f64,
    z: f64,
    mass_density: f64,
    molar_density: f64,
    density_effect: Option<DensityEffectData>,
}

fn check(parameter: &'static str, value: f64, ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(MaterialError::NonPhysical { parameter, value }.into())
    }
}

impl Material {
    /// Creates a material from radiation length, nuclear interaction length,
    /// relative atomic mass, atomic number and mass density.
    ///
    /// # Errors
    ///
    /// Returns an error if a length is not positive or any other parameter
    /// is negative or NaN.
    pub fn new(x0: f64, l0: f64, ar: f64, z: f64, mass_density: f64) -> Result<Self> {
        check("x0", x0, x0 > 0.0)?;
        check("l0", l0, l0 > 0.0)?;
        check("ar", ar, ar >= 0.0)?;
        check("z", z, z >= 0.0)?;
        check("mass_density", mass_density, mass_density >= 0.0)?;
        let molar_density = if ar > 0.0 { mass_density / ar } else { 0.0 };
        Ok(Self {
            x0,
            l0,
            ar,
            z,
            mass_density,
            molar_density,
            density_effect: None,
        })
    }

    #[must_use]
    pub fn with_density_effect(mut self, data: DensityEffectData) -> Self {
        self.density_effect = Some(data);
        self
    }

    /// Empty space.
    #[must_use]
    pub fn vacuum() -> Self {
        Self {
            x0: f64::INFINITY,
            l0: f64::INFINITY,
            ar: 0.0,
            z: 0.0,
            mass_density: 0.0,
            molar_density: 0.0,
            density_effect: None,
        }
    }

    #[must_use]
    pub fn is_vacuum(&self) -> bool {
        self.molar_density <= 0.0
    }

    /// Radiation length.
    #[must_use]
    pub fn x0(&self) -> f64 {
        self.x0
    }

    /// Nuclear interaction length.
    #[must_use]
    pub fn l0(&self) -> f64 {
        self.l0
    }

    #[must_use]
    pub fn ar(&self) -> f64 {
        self.ar
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    #[must_use]
    pub fn mass_density(&self) -> f64 {
        self.mass_density
    }

    #[must_use]
    pub fn molar_density(&self) -> f64 {
        self.molar_density
    }

    #[must_use]
    pub fn density_effect(&self) -> Option<&DensityEffectData> {
        self.density_effect.as_ref()
    }

    /// Electrons per mm³ in units of mol.
    #[must_use]
    pub fn molar_electron_density(&self) -> f64 {
        self.z * self.molar_density
    }

    /// Mean excitation energy `I`, from the density effect data if present
    /// and otherwise approximated from `Z`.
    #[must_use]
    pub fn mean_excitation_energy(&self) -> f64 {
        if let Some(data) = &self.density_effect {
            return data.mean_excitation;
        }
        if self.z <= 1.0 {
            19.2 * EV
        } else {
            16.0 * EV * self.z.powf(0.9)
        }
    }
}

fn from_table(x0: f64, l0: f64, ar: f64, z: f64, density_g_cm3: f64) -> Material {
    let mass_density = density_g_cm3 * G_PER_CM3;
    Material {
        x0,
        l0,
        ar,
        z,
        mass_density,
        molar_density: mass_density / ar,
        density_effect: None,
    }
}

/// Commonly used detector materials.
pub mod predefined {
    use super::{from_table, DensityEffectData, Material, EV, MM};

    #[must_use]
    pub fn hydrogen_gas() -> Material {
        from_table(7.526e6 * MM, 6.209e6 * MM, 1.008, 1.0, 8.376e-5)
    }

    #[must_use]
    pub fn beryllium() -> Material {
        from_table(352.8 * MM, 421.0 * MM, 9.012, 4.0, 1.848)
    }

    #[must_use]
    pub fn aluminium() -> Material {
        from_table(88.97 * MM, 397.0 * MM, 26.98, 13.0, 2.699)
    }

    #[must_use]
    pub fn silicon() -> Material {
        from_table(93.7 * MM, 465.2 * MM, 28.0855, 14.0, 2.329).with_density_effect(DensityEffectData {
            mean_excitation: 173.0 * EV,
            c_bar: 4.4355,
            x0: 0.2015,
            x1: 2.8716,
            a: 0.149_21,
            k: 3.2546,
            delta0: 0.14,
        })
    }

    #[must_use]
    pub fn argon_gas() -> Material {
        from_table(1.176e5 * MM, 7.204e5 * MM, 39.948, 18.0, 1.662e-3)
    }

    #[must_use]
    pub fn iron() -> Material {
        from_table(17.57 * MM, 169.8 * MM, 55.845, 26.0, 7.874)
    }

    #[must_use]
    pub fn tungsten() -> Material {
        from_table(3.504 * MM, 99.46 * MM, 183.84, 74.0, 19.3)
    }
}

/// A layer of homogeneous material on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlab {
    pub material: Material,
    pub thickness: f64,
}

impl MaterialSlab {
    /// # Errors
    ///
    /// Returns an error if the thickness is negative or NaN.
    pub fn new(material: Material, thickness: f64) -> Result<Self> {
        check("thickness", thickness, thickness >= 0.0)?;
        Ok(Self { material, thickness })
    }

    /// Path length through the slab for a track crossing at incidence
    /// cosine `cos_inc`.
    #[must_use]
    pub fn path_segment(&self, cos_inc: f64) -> f64 {
        self.thickness / cos_inc.abs()
    }

    /// Thickness in units of radiation length.
    #[must_use]
    pub fn thickness_in_x0(&self) -> f64 {
        self.thickness / self.material.x0
    }

    /// Thickness in units of nuclear interaction length.
    #[must_use]
    pub fn thickness_in_l0(&self) -> f64 {
        self.thickness / self.material.l0
    }
}

/// A solid cylinder of material around a wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialRod {
    pub material: Material,
    pub radius: f64,
}

impl MaterialRod {
    /// # Errors
    ///
    /// Returns an error if the radius is negative or NaN.
    pub fn new(material: Material, radius: f64) -> Result<Self> {
        check("radius", radius, radius >= 0.0)?;
        Ok(Self { material, radius })
    }

    /// Chord length through the rod for a track passing at distance
    /// `approach` from its axis.
    #[must_use]
    pub fn path_segment(&self, approach: f64) -> f64 {
        let d2 = self.radius * self.radius - approach * approach;
        if d2 > 0.0 {
            2.0 * d2.sqrt()
        } else {
            0.0
        }
    }
}

/// Slabs binned over the bound local coordinates of a surface.
pub type MaterialMap = Grid<MaterialSlab, 2>;

/// Closed set of material description kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Slab,
    Rod,
    SlabMap,
}

/// `(kind, index)` link into the material collections of a geometry store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialLink {
    pub kind: MaterialKind,
    pub index: usize,
}

impl MaterialLink {
    #[must_use]
    pub fn new(kind: MaterialKind, index: usize) -> Self {
        Self { kind, index }
    }
}
