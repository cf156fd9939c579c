//! Track parameters in free (global) and bound (surface-local)
//! parametrisation, and the particle hypothesis they are interpreted with.

use serde::{Deserialize, Serialize};

use crate::error::{PropagationError, Result};
use crate::math::units::{self, pdg};
use crate::math::{
    angles_from_direction, bound, direction_from_angles, free, BoundMatrix, BoundVector, FreeVector, Point2,
    Point3, Vector3, TOLERANCE,
};

/// Mass, charge and PDG code of the propagated particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleHypothesis {
    pub pdg: i32,
    pub mass: f64,
    pub charge: f64,
}

impl ParticleHypothesis {
    #[must_use]
    pub fn muon() -> Self {
        Self {
            pdg: pdg::MUON,
            mass: units::MUON_MASS,
            charge: -1.0,
        }
    }

    #[must_use]
    pub fn anti_muon() -> Self {
        Self {
            pdg: pdg::ANTI_MUON,
            mass: units::MUON_MASS,
            charge: 1.0,
        }
    }

    #[must_use]
    pub fn electron() -> Self {
        Self {
            pdg: pdg::ELECTRON,
            mass: units::ELECTRON_MASS,
            charge: -1.0,
        }
    }

    #[must_use]
    pub fn positron() -> Self {
        Self {
            pdg: pdg::POSITRON,
            mass: units::ELECTRON_MASS,
            charge: 1.0,
        }
    }

    #[must_use]
    pub fn pion_plus() -> Self {
        Self {
            pdg: pdg::PION_PLUS,
            mass: units::PION_MASS,
            charge: 1.0,
        }
    }

    #[must_use]
    pub fn proton() -> Self {
        Self {
            pdg: pdg::PROTON,
            mass: units::PROTON_MASS,
            charge: 1.0,
        }
    }

    /// Charge used to convert between `q/p` and `p`; neutral particles use 1.
    #[must_use]
    pub fn qop_charge(&self) -> f64 {
        if self.charge == 0.0 {
            1.0
        } else {
            self.charge
        }
    }

    /// Momentum magnitude for a given `q/p`.
    #[must_use]
    pub fn momentum(&self, qop: f64) -> f64 {
        (self.qop_charge() / qop).abs()
    }

    /// `q/p` for a given momentum magnitude.
    #[must_use]
    pub fn qop(&self, momentum: f64) -> f64 {
        self.qop_charge() / momentum
    }
}

impl Default for ParticleHypothesis {
    fn default() -> Self {
        Self::muon()
    }
}

/// Track parameters in the global frame: position, time, unit direction and
/// `q/p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeTrackParameters {
    vector: FreeVector,
}

impl FreeTrackParameters {
    /// Creates free parameters from a momentum vector.
    ///
    /// A neutral particle (`charge == 0`) stores `1/p` in the `q/p` slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the momentum is zero or any input is not finite.
    pub fn new(pos: Point3, time: f64, momentum: Vector3, charge: f64) -> Result<Self> {
        let p = momentum.norm();
        if p < TOLERANCE {
            return Err(PropagationError::ZeroDirection.into());
        }
        let q = if charge == 0.0 { 1.0 } else { charge };
        let params = Self::from_parts(pos, time, momentum / p, q / p);
        params.check_finite()?;
        Ok(params)
    }

    #[must_use]
    pub fn from_parts(pos: Point3, time: f64, dir: Vector3, qop: f64) -> Self {
        let mut vector = FreeVector::zeros();
        vector.fixed_rows_mut::<3>(free::POS0).copy_from(&pos.coords);
        vector[free::TIME] = time;
        vector.fixed_rows_mut::<3>(free::DIR0).copy_from(&dir);
        vector[free::QOP] = qop;
        Self { vector }
    }

    #[must_use]
    pub fn from_vector(vector: FreeVector) -> Self {
        Self { vector }
    }

    /// # Errors
    ///
    /// Returns an error naming the first non-finite component.
    pub fn check_finite(&self) -> Result<()> {
        if !self.pos().coords.iter().all(|v| v.is_finite()) {
            return Err(PropagationError::NonFinite("position").into());
        }
        if !self.time().is_finite() {
            return Err(PropagationError::NonFinite("time").into());
        }
        if !self.dir().iter().all(|v| v.is_finite()) {
            return Err(PropagationError::NonFinite("direction").into());
        }
        if !self.qop().is_finite() {
            return Err(PropagationError::NonFinite("q/p").into());
        }
        Ok(())
    }

    #[must_use]
    pub fn vector(&self) -> &FreeVector {
        &self.vector
    }

    pub fn vector_mut(&mut self) -> &mut FreeVector {
        &mut self.vector
    }

    #[must_use]
    pub fn pos(&self) -> Point3 {
        Point3::from(self.vector.fixed_rows::<3>(free::POS0).into_owned())
    }

    pub fn set_pos(&mut self, pos: &Point3) {
        self.vector.fixed_rows_mut::<3>(free::POS0).copy_from(&pos.coords);
    }

    #[must_use]
    pub fn dir(&self) -> Vector3 {
        self.vector.fixed_rows::<3>(free::DIR0).into_owned()
    }

    pub fn set_dir(&mut self, dir: &Vector3) {
        self.vector.fixed_rows_mut::<3>(free::DIR0).copy_from(dir);
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.vector[free::TIME]
    }

    pub fn set_time(&mut self, time: f64) {
        self.vector[free::TIME] = time;
    }

    #[must_use]
    pub fn qop(&self) -> f64 {
        self.vector[free::QOP]
    }

    pub fn set_qop(&mut self, qop: f64) {
        self.vector[free::QOP] = qop;
    }
}

/// Track parameters bound to a surface: local position, direction angles,
/// `q/p` and time, with an optional covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundTrackParameters {
    pub surface: usize,
    pub vector: BoundVector,
    pub covariance: Option<BoundMatrix>,
}

impl BoundTrackParameters {
    #[must_use]
    pub fn new(surface: usize, vector: BoundVector, covariance: Option<BoundMatrix>) -> Self {
        Self {
            surface,
            vector,
            covariance,
        }
    }

    /// Builds the bound vector from its components.
    #[must_use]
    pub fn compose(loc: Point2, phi: f64, theta: f64, qop: f64, time: f64) -> BoundVector {
        let mut v = BoundVector::zeros();
        v[bound::LOC0] = loc.x;
        v[bound::LOC1] = loc.y;
        v[bound::PHI] = phi;
        v[bound::THETA] = theta;
        v[bound::QOP] = qop;
        v[bound::TIME] = time;
        v
    }

    #[must_use]
    pub fn loc(&self) -> Point2 {
        Point2::new(self.vector[bound::LOC0], self.vector[bound::LOC1])
    }

    #[must_use]
    pub fn phi(&self) -> f64 {
        self.vector[bound::PHI]
    }

    #[must_use]
    pub fn theta(&self) -> f64 {
        self.vector[bound::THETA]
    }

    #[must_use]
    pub fn qop(&self) -> f64 {
        self.vector[bound::QOP]
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.vector[bound::TIME]
    }

    #[must_use]
    pub fn dir(&self) -> Vector3 {
        direction_from_angles(self.phi(), self.theta())
    }
}

/// Global direction angles of free parameters.
#[must_use]
pub fn free_angles(params: &FreeTrackParameters) -> (f64, f64) {
    angles_from_direction(&params.dir())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn momentum_is_split_into_direction_and_qop() {
        let t = FreeTrackParameters::new(
            Point3::new(1.0, 2.0, 3.0),
            0.5,
            Vector3::new(0.0, 3.0, 4.0),
            -1.0,
        )
        .unwrap();
        assert_relative_eq!(t.dir(), Vector3::new(0.0, 0.6, 0.8), epsilon = 1e-12);
        assert_relative_eq!(t.qop(), -0.2, epsilon = 1e-12);
        assert_relative_eq!(t.time(), 0.5);
        assert_relative_eq!(t.pos(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn neutral_particle_stores_inverse_momentum() {
        let t = FreeTrackParameters::new(Point3::origin(), 0.0, Vector3::new(0.0, 0.0, 2.0), 0.0).unwrap();
        assert_relative_eq!(t.qop(), 0.5);
        let photon = ParticleHypothesis {
            pdg: 22,
            mass: 0.0,
            charge: 0.0,
        };
        assert_relative_eq!(photon.momentum(t.qop()), 2.0);
    }

    #[test]
    fn rejects_zero_and_non_finite_momentum() {
        assert!(FreeTrackParameters::new(Point3::origin(), 0.0, Vector3::zeros(), 1.0).is_err());
        assert!(FreeTrackParameters::new(Point3::new(f64::NAN, 0.0, 0.0), 0.0, Vector3::x(), 1.0).is_err());
    }

    #[test]
    fn bound_accessors() {
        let v = BoundTrackParameters::compose(Point2::new(1.0, -2.0), 0.3, 1.2, -0.01, 4.0);
        let b = BoundTrackParameters::new(3, v, None);
        assert_eq!(b.surface, 3);
        assert_relative_eq!(b.loc(), Point2::new(1.0, -2.0));
        assert_relative_eq!(b.dir().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(b.time(), 4.0);
    }
}
