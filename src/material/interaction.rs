//! Ionisation energy loss and multiple scattering of charged particles.
//!
//! All functions are pure. Energies are in MeV, lengths in mm and the
//! returned `q/p` quantities in 1/MeV.

use std::f64::consts::LN_2;

use crate::math::units::{pdg, MEV};
use crate::track::ParticleHypothesis;

use super::relativistic::RelativisticQuantities;
use super::Material;

/// Mean ionisation energy loss per unit length (Bethe formula).
///
/// Returns exactly `0` when the material holds no electrons.
#[must_use]
pub fn compute_bethe(material: &Material, rq: &RelativisticQuantities) -> f64 {
    let eps_per_length = rq.epsilon_per_length(material.molar_electron_density());
    if eps_per_length <= 0.0 {
        return 0.0;
    }
    let a = rq.bethe_log_term(material.mean_excitation_energy());
    2.0 * eps_per_length * (a - rq.beta2 - rq.delta_half(material))
}

/// Derivative of [`compute_bethe`] w.r.t. `q/p`, given its value `bethe`.
#[must_use]
pub fn derive_bethe(material: &Material, rq: &RelativisticQuantities, bethe: f64) -> f64 {
    let eps_per_length = rq.epsilon_per_length(material.molar_electron_density());
    if eps_per_length <= 0.0 {
        return 0.0;
    }
    let first = 2.0 / (rq.qop * rq.gamma2) * bethe;
    let da = rq.derive_bethe_log_term();
    let db = rq.derive_beta2();
    let dc = rq.derive_delta_half(material);
    first + 2.0 * eps_per_length * (da - db - dc)
}

/// Total stopping power. Only the ionisation term is modelled.
#[must_use]
pub fn compute_stopping_power(material: &Material, rq: &RelativisticQuantities) -> f64 {
    compute_bethe(material, rq)
}

/// Mean energy loss over `path`.
#[must_use]
pub fn energy_loss_bethe(path: f64, material: &Material, particle: &ParticleHypothesis, qop: f64) -> f64 {
    let rq = RelativisticQuantities::new(particle.mass, qop, particle.charge);
    path * compute_bethe(material, &rq)
}

/// Most probable energy loss over `path` (Landau-Vavilov).
#[must_use]
pub fn energy_loss_landau(path: f64, material: &Material, particle: &ParticleHypothesis, qop: f64) -> f64 {
    let rq = RelativisticQuantities::new(particle.mass, qop, particle.charge);
    let eps = rq.epsilon(material.molar_electron_density(), path);
    if eps <= 0.0 {
        return 0.0;
    }
    let i = material.mean_excitation_energy();
    let running = (rq.mass_term() / i).ln() + (eps / i).ln() + 0.2 - rq.beta2 - 2.0 * rq.delta_half(material);
    eps * running
}

/// Full width at half maximum of the Landau distribution.
#[must_use]
pub fn energy_loss_landau_fwhm(path: f64, material: &Material, particle: &ParticleHypothesis, qop: f64) -> f64 {
    let rq = RelativisticQuantities::new(particle.mass, qop, particle.charge);
    4.0 * rq.epsilon(material.molar_electron_density(), path)
}

/// Gaussian sigma with the same full width at half maximum.
#[must_use]
pub fn landau_fwhm_to_gaussian_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * LN_2).sqrt())
}

#[must_use]
pub fn energy_loss_landau_sigma(path: f64, material: &Material, particle: &ParticleHypothesis, qop: f64) -> f64 {
    landau_fwhm_to_gaussian_sigma(energy_loss_landau_fwhm(path, material, particle, qop))
}

/// Energy loss straggling propagated to `q/p`:
/// `sigma(q/p) = (q/β) (1/p)² sigma(E)`.
#[must_use]
pub fn energy_loss_landau_sigma_qop(path: f64, material: &Material, particle: &ParticleHypothesis, qop: f64) -> f64 {
    let sigma_e = energy_loss_landau_sigma(path, material, particle, qop);
    let p_inv = qop / particle.charge;
    let rq = RelativisticQuantities::new(particle.mass, qop, particle.charge);
    rq.q2_over_beta2.sqrt() * p_inv * p_inv * sigma_e
}

/// Width `θ0` of the projected multiple scattering angle distribution.
///
/// Electrons and positrons use the Rossi-Greisen form, every other particle
/// the Highland form.
#[must_use]
pub fn compute_multiple_scattering_theta0(x_over_x0: f64, particle: &ParticleHypothesis, qop: f64) -> f64 {
    let p_inv = (qop / particle.charge).abs();
    let rq = RelativisticQuantities::new(particle.mass, qop, particle.charge);
    if particle.pdg == pdg::ELECTRON || particle.pdg == pdg::POSITRON {
        theta0_rossi_greisen(x_over_x0, p_inv, rq.q2_over_beta2)
    } else {
        theta0_highland(x_over_x0, p_inv, rq.q2_over_beta2)
    }
}

fn theta0_highland(x_over_x0: f64, p_inv: f64, q2_over_beta2: f64) -> f64 {
    if x_over_x0 <= 0.0 {
        return 0.0;
    }
    let t = (x_over_x0 * q2_over_beta2).sqrt();
    // ln(x/X0 q²/β²) = 2 ln(t)
    13.6 * MEV * p_inv * t * (1.0 + 0.038 * 2.0 * t.ln())
}

fn theta0_rossi_greisen(x_over_x0: f64, p_inv: f64, q2_over_beta2: f64) -> f64 {
    if x_over_x0 <= 0.0 {
        return 0.0;
    }
    let t = (x_over_x0 * q2_over_beta2).sqrt();
    17.5 * MEV * p_inv * t * (1.0 + 0.125 * (10.0 * x_over_x0).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{predefined, Material};
    use crate::math::units::{GEV, MM, MUON_MASS, UM};
    use approx::assert_relative_eq;

    fn muon_rq(p: f64) -> RelativisticQuantities {
        RelativisticQuantities::new(MUON_MASS, -1.0 / p, -1.0)
    }

    #[test]
    fn bethe_of_muon_in_silicon() {
        let si = predefined::silicon();
        let bethe = compute_bethe(&si, &muon_rq(1.0 * GEV));
        // Close to minimum ionisation, about 0.4 MeV/mm.
        assert!(bethe > 0.35 && bethe < 0.5, "bethe = {bethe}");
        assert_relative_eq!(compute_stopping_power(&si, &muon_rq(1.0 * GEV)), bethe);
    }

    #[test]
    fn bethe_vanishes_without_electrons() {
        let vacuum = Material::vacuum();
        let rq = muon_rq(1.0 * GEV);
        assert_eq!(compute_bethe(&vacuum, &rq), 0.0);
        assert_eq!(derive_bethe(&vacuum, &rq, 0.0), 0.0);
        let muon = ParticleHypothesis::muon();
        assert_eq!(energy_loss_bethe(0.0, &predefined::silicon(), &muon, -1e-3), 0.0);
        assert_eq!(energy_loss_landau(0.0, &predefined::silicon(), &muon, -1e-3), 0.0);
    }

    #[test]
    fn bethe_derivative_matches_finite_difference() {
        for material in [predefined::silicon(), predefined::iron(), predefined::argon_gas()] {
            for p in [0.2 * GEV, 2.0 * GEV, 50.0 * GEV] {
                let qop = -1.0 / p;
                let rq = RelativisticQuantities::new(MUON_MASS, qop, -1.0);
                let bethe = compute_bethe(&material, &rq);
                let f = |q: f64| compute_bethe(&material, &RelativisticQuantities::new(MUON_MASS, q, -1.0));
                let h = qop.abs() * 1e-6;
                let numeric = (f(qop + h) - f(qop - h)) / (2.0 * h);
                assert_relative_eq!(derive_bethe(&material, &rq, bethe), numeric, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn landau_most_probable_below_mean() {
        let si = predefined::silicon();
        let muon = ParticleHypothesis::muon();
        let path = 300.0 * UM;
        let mean = energy_loss_bethe(path, &si, &muon, -1e-3);
        let mpv = energy_loss_landau(path, &si, &muon, -1e-3);
        assert!(mpv > 0.0 && mpv < mean, "mpv = {mpv}, mean = {mean}");
    }

    #[test]
    fn landau_width_conversion() {
        let si = predefined::silicon();
        let muon = ParticleHypothesis::muon();
        let fwhm = energy_loss_landau_fwhm(1.0 * MM, &si, &muon, -1e-3);
        let sigma = energy_loss_landau_sigma(1.0 * MM, &si, &muon, -1e-3);
        assert_relative_eq!(sigma * 2.354_820_045, fwhm, max_relative = 1e-9);

        let rq = RelativisticQuantities::new(MUON_MASS, -1e-3, -1.0);
        let sigma_qop = energy_loss_landau_sigma_qop(1.0 * MM, &si, &muon, -1e-3);
        assert_relative_eq!(sigma_qop, rq.q2_over_beta2.sqrt() * 1e-6 * sigma, max_relative = 1e-12);
    }

    #[test]
    fn theta0_vanishes_without_material() {
        let qop = -1e-3;
        for particle in [ParticleHypothesis::muon(), ParticleHypothesis::electron()] {
            assert_eq!(compute_multiple_scattering_theta0(0.0, &particle, qop), 0.0);
            assert_eq!(compute_multiple_scattering_theta0(-0.1, &particle, qop), 0.0);
        }
    }

    #[test]
    fn highland_for_muons() {
        let muon = ParticleHypothesis::muon();
        let qop = -1.0 / GEV;
        let rq = RelativisticQuantities::new(MUON_MASS, qop, -1.0);
        let t = (0.01 * rq.q2_over_beta2).sqrt();
        let expected = 13.6e-3 * t * (1.0 + 0.038 * (0.01 * rq.q2_over_beta2).ln());
        let theta0 = compute_multiple_scattering_theta0(0.01, &muon, qop);
        assert_relative_eq!(theta0, expected, max_relative = 1e-12);
        assert!(theta0 > 1.0e-3 && theta0 < 1.2e-3);
    }

    #[test]
    fn electrons_use_rossi_greisen() {
        let electron = ParticleHypothesis::electron();
        let muon = ParticleHypothesis::muon();
        let qop = -1.0 / GEV;
        let e = compute_multiple_scattering_theta0(0.1, &electron, qop);
        let mu = compute_multiple_scattering_theta0(0.1, &muon, qop);
        // At x/X0 = 0.1 the logarithmic correction vanishes: 17.5 MeV * t / p.
        assert_relative_eq!(e, 17.5e-3 * 0.1_f64.sqrt(), max_relative = 1e-6);
        assert!((e - mu).abs() > 1e-4);
    }
}
