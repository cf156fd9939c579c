//! Track parameter and Jacobian transport along a path segment.

use serde::{Deserialize, Serialize};

use crate::math::{
    cross_matrix, free, BoundMatrix, BoundToFreeMatrix, FreeMatrix, FreeVector, Matrix3, Point3, Vector3,
};
use crate::track::{BoundTrackParameters, FreeTrackParameters, ParticleHypothesis};

/// Per-track stepping data.
#[derive(Debug, Clone, PartialEq)]
pub struct SteppingState {
    pub params: FreeTrackParameters,
    /// Bound parameters on the last surface the track was anchored to.
    pub bound: Option<BoundTrackParameters>,
    /// Free transport Jacobian since the last anchoring surface.
    pub transport_jacobian: FreeMatrix,
    /// Bound to free Jacobian on the last anchoring surface.
    pub bound_to_free: BoundToFreeMatrix,
    /// Bound to bound Jacobian between the last two anchoring surfaces.
    pub full_jacobian: BoundMatrix,
    /// `d(free)/ds` at the end of the last step.
    pub derivative: FreeVector,
    /// Signed path length since the last anchoring surface.
    pub path_length: f64,
    /// Absolute path length since the start of the propagation.
    pub total_path: f64,
    /// Length of the last step.
    pub step_size: f64,
    /// Upper bound on the next step's length, set by actors.
    pub step_limit: f64,
}

impl SteppingState {
    #[must_use]
    pub fn new(params: FreeTrackParameters) -> Self {
        Self {
            params,
            bound: None,
            transport_jacobian: FreeMatrix::identity(),
            bound_to_free: BoundToFreeMatrix::zeros(),
            full_jacobian: BoundMatrix::identity(),
            derivative: FreeVector::zeros(),
            path_length: 0.0,
            total_path: 0.0,
            step_size: 0.0,
            step_limit: f64::INFINITY,
        }
    }

    /// Restricts the next step to at most `length`.
    pub fn constrain(&mut self, length: f64) {
        self.step_limit = self.step_limit.min(length.abs());
    }

    /// Re-anchors the transport bookkeeping on a surface.
    pub fn reset(&mut self, bound_to_free: BoundToFreeMatrix) {
        self.path_length = 0.0;
        self.transport_jacobian = FreeMatrix::identity();
        self.bound_to_free = bound_to_free;
    }
}

/// `1/β` of the particle.
fn inverse_beta(particle: &ParticleHypothesis, qop: f64) -> f64 {
    let q = particle.qop_charge();
    (1.0 + (particle.mass * qop / q).powi(2)).sqrt()
}

/// Integration scheme. All schemes advance the free parameters and multiply
/// the transport Jacobian with the step's Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stepper {
    /// Straight line, exact without field.
    Line,
    /// Fourth order Runge-Kutta-Nyström in a homogeneous magnetic field.
    /// The field is given in units of [`T`](crate::math::units::T).
    RungeKutta { field: Vector3 },
}

impl Stepper {
    /// Advances the state by the signed path length `h`.
    pub fn step(&self, state: &mut SteppingState, particle: &ParticleHypothesis, h: f64) {
        let qop = state.params.qop();
        let inv_beta = inverse_beta(particle, qop);
        let q = particle.qop_charge();

        let mut jac = FreeMatrix::identity();
        // time advances with 1/β
        jac[(free::TIME, free::QOP)] = h * particle.mass * particle.mass * qop / (q * q * inv_beta);

        let pos = state.params.pos();
        let dir = state.params.dir();
        let (new_pos, new_dir, curvature) = match *self {
            Self::Line => {
                jac.fixed_view_mut::<3, 3>(free::POS0, free::DIR0)
                    .copy_from(&(Matrix3::identity() * h));
                (pos + dir * h, dir, Vector3::zeros())
            }
            Self::RungeKutta { field } => {
                // neutral tracks keep 1/p in the q/p slot but do not bend
                let charge_scale = particle.charge / q;
                let lambda = qop * charge_scale;
                let (p, t) = rkn4(&mut jac, &pos.coords, &dir, lambda, charge_scale, &field, h);
                let t = t.normalize();
                (Point3::from(p), t, t.cross(&field) * lambda)
            }
        };

        state.params.set_pos(&new_pos);
        state.params.set_dir(&new_dir);
        state.params.set_time(state.params.time() + h * inv_beta);

        state.transport_jacobian = jac * state.transport_jacobian;
        state.derivative = FreeVector::zeros();
        state.derivative.fixed_rows_mut::<3>(free::POS0).copy_from(&new_dir);
        state.derivative[free::TIME] = inv_beta;
        state.derivative.fixed_rows_mut::<3>(free::DIR0).copy_from(&curvature);

        state.step_size = h;
        state.path_length += h;
        state.total_path += h.abs();
    }
}

/// One Runge-Kutta-Nyström step for `t' = λ t × B` with constant `B`,
/// writing the position and direction rows of the step Jacobian.
/// `dlambda` is `dλ/d(q/p)`.
fn rkn4(
    jac: &mut FreeMatrix,
    pos: &Vector3,
    t: &Vector3,
    lambda: f64,
    dlambda: f64,
    field: &Vector3,
    h: f64,
) -> (Vector3, Vector3) {
    let force = |v: &Vector3| v.cross(field);
    // d(λ v × B)/dv
    let a = -cross_matrix(field) * lambda;
    let id = Matrix3::identity();

    let k1 = force(t) * lambda;
    let t2 = t + k1 * (h / 2.0);
    let k2 = force(&t2) * lambda;
    let t3 = t + k2 * (h / 2.0);
    let k3 = force(&t3) * lambda;
    let t4 = t + k3 * h;
    let k4 = force(&t4) * lambda;

    let new_pos = pos + t * h + (k1 + k2 + k3) * (h * h / 6.0);
    let new_t = t + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);

    // Derivatives of the stages w.r.t. the direction ...
    let dk1 = a;
    let dk2 = a * (id + dk1 * (h / 2.0));
    let dk3 = a * (id + dk2 * (h / 2.0));
    let dk4 = a * (id + dk3 * h);
    // ... and w.r.t. λ.
    let lk1 = force(t);
    let lk2 = force(&t2) + a * lk1 * (h / 2.0);
    let lk3 = force(&t3) + a * lk2 * (h / 2.0);
    let lk4 = force(&t4) + a * lk3 * h;

    jac.fixed_view_mut::<3, 3>(free::POS0, free::DIR0)
        .copy_from(&(id * h + (dk1 + dk2 + dk3) * (h * h / 6.0)));
    jac.fixed_view_mut::<3, 1>(free::POS0, free::QOP)
        .copy_from(&((lk1 + lk2 + lk3) * (dlambda * h * h / 6.0)));
    jac.fixed_view_mut::<3, 3>(free::DIR0, free::DIR0)
        .copy_from(&(id + (dk1 + dk2 * 2.0 + dk3 * 2.0 + dk4) * (h / 6.0)));
    jac.fixed_view_mut::<3, 1>(free::DIR0, free::QOP)
        .copy_from(&((lk1 + lk2 * 2.0 + lk3 * 2.0 + lk4) * (dlambda * h / 6.0)));

    (new_pos, new_t)
}
