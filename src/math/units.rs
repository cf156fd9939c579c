//! Unit system and physical constants.
//!
//! Lengths are in millimetres, energies in MeV. Magnetic field values carry
//! the factor `c` so that `qop * B` is a curvature in 1/mm.

pub const MM: f64 = 1.0;
pub const UM: f64 = 1e-3 * MM;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1e3 * MM;

pub const MEV: f64 = 1.0;
pub const EV: f64 = 1e-6 * MEV;
pub const KEV: f64 = 1e-3 * MEV;
pub const GEV: f64 = 1e3 * MEV;

pub const RAD: f64 = 1.0;
pub const MRAD: f64 = 1e-3 * RAD;

/// Tesla, in MeV / (e mm): a unit charge with momentum `p` circles on a
/// radius `p / B` in a field `B`.
pub const T: f64 = 0.299_792_458 * MEV / MM;

pub const MOL: f64 = 1.0;
pub const G_PER_CM3: f64 = 1e-3;

/// Electron mass.
pub const ELECTRON_MASS: f64 = 0.510_998_950 * MEV;
/// Muon mass.
pub const MUON_MASS: f64 = 105.658_375_5 * MEV;
/// Charged pion mass.
pub const PION_MASS: f64 = 139.570_39 * MEV;
/// Proton mass.
pub const PROTON_MASS: f64 = 938.272_088_16 * MEV;

/// Bethe-Bloch coefficient `K = 4 pi N_A r_e^2 m_e c^2`.
pub const BETHE_K: f64 = 0.307_075 * MEV * CM * CM / MOL;

/// Scale of the plasma energy `hbar * omega_p = 28.816 eV * sqrt(rho <Z/A>)`.
pub const PLASMA_ENERGY_SCALE: f64 = 28.816 * EV;

/// PDG Monte Carlo particle numbers used to select physics branches.
pub mod pdg {
    pub const ELECTRON: i32 = 11;
    pub const POSITRON: i32 = -11;
    pub const MUON: i32 = 13;
    pub const ANTI_MUON: i32 = -13;
    pub const PION_PLUS: i32 = 211;
    pub const PION_MINUS: i32 = -211;
    pub const PROTON: i32 = 2212;
}
