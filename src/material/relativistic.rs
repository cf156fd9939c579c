//! Kinematic quantities of a charged particle shared by the energy loss and
//! scattering formulas.

use std::f64::consts::LN_10;

use crate::math::units::{BETHE_K, ELECTRON_MASS, PLASMA_ENERGY_SCALE};

use super::Material;

/// Relativistic quantities of a particle with mass `m`, charge `q` and
/// inverse momentum `q/p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativisticQuantities {
    pub mass: f64,
    pub qop: f64,
    pub q2_over_beta2: f64,
    pub beta2: f64,
    pub beta_gamma: f64,
    pub gamma: f64,
    pub gamma2: f64,
}

impl RelativisticQuantities {
    #[must_use]
    pub fn new(mass: f64, qop: f64, charge: f64) -> Self {
        let q2 = charge * charge;
        let q2_over_beta2 = q2 + (mass * qop) * (mass * qop);
        let beta2 = q2 / q2_over_beta2;
        let beta_gamma = (charge / (qop * mass)).abs();
        let gamma = beta_gamma.mul_add(beta_gamma, 1.0).sqrt();
        Self {
            mass,
            qop,
            q2_over_beta2,
            beta2,
            beta_gamma,
            gamma,
            gamma2: gamma * gamma,
        }
    }

    #[must_use]
    pub fn beta_gamma2(&self) -> f64 {
        self.beta_gamma * self.beta_gamma
    }

    /// Bethe prefactor per unit path, `K/2 * Ne * q²/β²`.
    #[must_use]
    pub fn epsilon_per_length(&self, molar_electron_density: f64) -> f64 {
        0.5 * BETHE_K * molar_electron_density * self.q2_over_beta2
    }

    /// Bethe prefactor for a path segment.
    #[must_use]
    pub fn epsilon(&self, molar_electron_density: f64, path: f64) -> f64 {
        self.epsilon_per_length(molar_electron_density) * path
    }

    /// `2 me β²γ²`, the mass term of the Landau most probable value.
    #[must_use]
    pub fn mass_term(&self) -> f64 {
        2.0 * ELECTRON_MASS * self.beta_gamma2()
    }

    /// Maximum energy transfer to a single electron.
    #[must_use]
    pub fn w_max(&self) -> f64 {
        let mf = ELECTRON_MASS / self.mass;
        self.mass_term() / (1.0 + 2.0 * self.gamma * mf + mf * mf)
    }

    /// `A = ½ ln(2 me β²γ² Wmax / I²)`.
    #[must_use]
    pub fn bethe_log_term(&self, mean_excitation: f64) -> f64 {
        0.5 * (self.mass_term() * self.w_max() / (mean_excitation * mean_excitation)).ln()
    }

    /// `dA/d(q/p)`.
    #[must_use]
    pub fn derive_bethe_log_term(&self) -> f64 {
        -0.5 / self.qop * (4.0 - self.w_max() / (self.gamma * self.mass))
    }

    /// `dβ²/d(q/p)`.
    #[must_use]
    pub fn derive_beta2(&self) -> f64 {
        -2.0 * self.beta2 / (self.qop * self.gamma2)
    }

    /// Half of the density effect correction, `δ/2`.
    #[must_use]
    pub fn delta_half(&self, material: &Material) -> f64 {
        if let Some(d) = material.density_effect() {
            let x = self.beta_gamma.log10();
            let delta = if x < d.x0 {
                d.delta0 * 10f64.powf(2.0 * (x - d.x0))
            } else if x < d.x1 {
                2.0 * LN_10 * x - d.c_bar + d.a * (d.x1 - x).powf(d.k)
            } else {
                2.0 * LN_10 * x - d.c_bar
            };
            return 0.5 * delta;
        }
        // High energy approximation, only valid for βγ >= 10.
        if self.beta_gamma < 10.0 {
            return 0.0;
        }
        let plasma_energy = PLASMA_ENERGY_SCALE * (1000.0 * material.molar_electron_density()).sqrt();
        self.beta_gamma.ln() + (plasma_energy / material.mean_excitation_energy()).ln() - 0.5
    }

    /// `d(δ/2)/d(q/p)`.
    #[must_use]
    pub fn derive_delta_half(&self, material: &Material) -> f64 {
        if let Some(d) = material.density_effect() {
            let x = self.beta_gamma.log10();
            return if x < d.x0 {
                -d.delta0 * 10f64.powf(2.0 * (x - d.x0)) / self.qop
            } else if x < d.x1 {
                -1.0 / self.qop + d.a * d.k / (2.0 * self.qop * LN_10) * (d.x1 - x).powf(d.k - 1.0)
            } else {
                -1.0 / self.qop
            };
        }
        if self.beta_gamma < 10.0 {
            0.0
        } else {
            -1.0 / self.qop
        }
    }
}
