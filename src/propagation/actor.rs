//! Actors observe and modify the propagation state after every step.
//!
//! Actors are composed statically: a tuple of actors is itself an actor that
//! runs its members in order and stops at the first abort.

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::geometry::store::GeometryStore;
use crate::geometry::surface::Surface;
use crate::geometry::LocalFrame;
use crate::material::interaction::{
    compute_bethe, compute_multiple_scattering_theta0, derive_bethe, energy_loss_landau_sigma_qop,
};
use crate::material::relativistic::RelativisticQuantities;
use crate::math::{bound, free, FreeMatrix, Transform3, TOLERANCE};
use crate::track::BoundTrackParameters;

use super::propagator::PropagationState;

/// Outcome of an actor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorVerdict {
    Continue,
    /// Stop the propagation on behalf of the named actor.
    Abort { actor: &'static str },
}

pub trait Actor {
    /// Identifies the actor in abort reasons.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns an error if the geometry store holds a dangling link.
    fn act(&mut self, store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict>;
}

impl Actor for () {
    fn name(&self) -> &'static str {
        "none"
    }

    fn act(&mut self, _store: &GeometryStore, _state: &mut PropagationState) -> Result<ActorVerdict> {
        Ok(ActorVerdict::Continue)
    }
}

macro_rules! impl_actor_chain {
    ($($actor:ident => $binding:ident),+) => {
        impl<$($actor: Actor),+> Actor for ($($actor,)+) {
            fn name(&self) -> &'static str {
                "chain"
            }

            fn act(&mut self, store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
                let ($($binding,)+) = self;
                $(
                    if let verdict @ ActorVerdict::Abort { .. } = $binding.act(store, state)? {
                        return Ok(verdict);
                    }
                )+
                Ok(ActorVerdict::Continue)
            }
        }
    };
}

impl_actor_chain!(A => a);
impl_actor_chain!(A => a, B => b);
impl_actor_chain!(A => a, B => b, C => c);
impl_actor_chain!(A => a, B => b, C => c, D => d);
impl_actor_chain!(A => a, B => b, C => c, D => d, E => e);
impl_actor_chain!(A => a, B => b, C => c, D => d, E => e, F => f);

/// The surface the track sits on, with its placement and local frame.
fn current_surface<'a>(
    store: &'a GeometryStore,
    state: &PropagationState,
) -> Result<Option<(usize, &'a Surface, &'a Transform3, LocalFrame)>> {
    let Some(index) = state.navigation.current_surface() else {
        return Ok(None);
    };
    let surface = store.surface(index)?;
    let trf = store.transform(surface.transform)?;
    let frame = store.mask(surface.mask)?.frame();
    Ok(Some((index, surface, trf, frame)))
}

/// Converts the free parameters to bound parameters on every surface
/// reached and transports the bound covariance.
///
/// The full Jacobian is `F2B · (1 + d·∂s/∂x) · J_transport · B2F`, the middle
/// factor keeping the varied track on the target surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterTransporter;

impl Actor for ParameterTransporter {
    fn name(&self) -> &'static str {
        "parameter_transporter"
    }

    fn act(&mut self, store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
        let Some((index, _, trf, frame)) = current_surface(store, state)? else {
            return Ok(ActorVerdict::Continue);
        };
        let stepping = &mut state.stepping;
        let params = &stepping.params;

        let vector = frame.free_to_bound_vector(trf, params);
        let correction = FreeMatrix::identity() + stepping.derivative * frame.path_derivative(trf, params);
        let jacobian =
            frame.free_to_bound_jacobian(trf, params) * correction * stepping.transport_jacobian * stepping.bound_to_free;
        let covariance = stepping
            .bound
            .and_then(|b| b.covariance)
            .map(|c| jacobian * c * jacobian.transpose());

        stepping.full_jacobian = jacobian;
        stepping.bound = Some(BoundTrackParameters::new(index, vector, covariance));
        Ok(ActorVerdict::Continue)
    }
}

/// Accumulated effect of a [`MaterialInteractor`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionSummary {
    /// Mean energy lost, in MeV.
    pub total_energy_loss: f64,
    /// Material traversed, in radiation lengths.
    pub total_x0: f64,
    pub interactions: usize,
    /// Crossings whose local position was outside the material map.
    pub lookup_misses: usize,
}

/// Applies mean energy loss to `q/p` on every surface carrying material and
/// adds scattering and straggling noise to the bound covariance.
///
/// Must run after [`ParameterTransporter`] for the noise to reach the
/// covariance of the surface just reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialInteractor {
    pub summary: InteractionSummary,
}

impl Actor for MaterialInteractor {
    fn name(&self) -> &'static str {
        "material_interactor"
    }

    fn act(&mut self, store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
        let Some((index, surface, trf, frame)) = current_surface(store, state)? else {
            return Ok(ActorVerdict::Continue);
        };
        let Some(link) = surface.material else {
            return Ok(ActorVerdict::Continue);
        };
        let particle = state.particle;
        if particle.charge == 0.0 {
            return Ok(ActorVerdict::Continue);
        }

        let params = state.stepping.params;
        let dir = params.dir();
        let loc = frame.global_to_local(trf, &params.pos(), &dir);
        let Some(unit) = store.material(link, &loc) else {
            self.summary.lookup_misses += 1;
            warn!(surface = index, loc0 = loc.x, loc1 = loc.y, "no material at crossing");
            return Ok(ActorVerdict::Continue);
        };
        let material = unit.material();
        let cos_inc = frame.normal(trf, &loc).dot(&dir).abs();
        let path = unit.path_segment(cos_inc, loc.x);
        if !path.is_finite() || path <= 0.0 || material.is_vacuum() {
            return Ok(ActorVerdict::Continue);
        }

        let qop = params.qop();
        let mass = particle.mass;
        let rq = RelativisticQuantities::new(mass, qop, particle.charge);
        let bethe = compute_bethe(material, &rq);
        // backward propagation gains energy
        let direction = if state.stepping.step_size < 0.0 { -1.0 } else { 1.0 };
        let energy_loss = direction * path * bethe;

        let p = particle.momentum(qop);
        let energy = p.hypot(mass);
        let new_energy = energy - energy_loss;
        if new_energy <= mass {
            warn!(surface = index, energy, energy_loss, "particle stopped in material");
            return Ok(ActorVerdict::Abort { actor: self.name() });
        }
        let new_p = (new_energy * new_energy - mass * mass).sqrt();
        let new_qop = qop.signum() * particle.charge.abs() / new_p;

        let de_dqop = -p * p / (energy * qop) - direction * path * derive_bethe(material, &rq, bethe);
        let factor = -(new_qop / new_p) * (new_energy / new_p) * de_dqop;

        let x_over_x0 = path / material.x0();
        let theta0 = compute_multiple_scattering_theta0(x_over_x0, &particle, qop);
        let sigma_qop = energy_loss_landau_sigma_qop(path, material, &particle, qop);

        let stepping = &mut state.stepping;
        stepping.params.set_qop(new_qop);
        stepping.transport_jacobian.row_mut(free::QOP).scale_mut(factor);
        if let Some(bound_params) = stepping.bound.as_mut().filter(|b| b.surface == index) {
            stepping.full_jacobian.row_mut(bound::QOP).scale_mut(factor);
            bound_params.vector[bound::QOP] = new_qop;
            if let Some(cov) = bound_params.covariance.as_mut() {
                cov.row_mut(bound::QOP).scale_mut(factor);
                cov.column_mut(bound::QOP).scale_mut(factor);
                let var_theta = theta0 * theta0;
                let sin_theta = bound_params.vector[bound::THETA].sin();
                if sin_theta.abs() > TOLERANCE {
                    cov[(bound::PHI, bound::PHI)] += var_theta / (sin_theta * sin_theta);
                }
                cov[(bound::THETA, bound::THETA)] += var_theta;
                cov[(bound::QOP, bound::QOP)] += sigma_qop * sigma_qop;
            }
        }

        self.summary.total_energy_loss += energy_loss;
        self.summary.total_x0 += x_over_x0;
        self.summary.interactions += 1;
        trace!(surface = index, path, energy_loss, theta0, "material interaction");
        Ok(ActorVerdict::Continue)
    }
}

/// Re-anchors the transport on every surface reached: the free parameters
/// are put exactly onto the surface, the path length since the last anchor
/// and the transport Jacobian are reset, and the bound to free Jacobian is
/// recomputed on the new surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resetter;

impl Actor for Resetter {
    fn name(&self) -> &'static str {
        "resetter"
    }

    fn act(&mut self, store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
        let Some((index, _, trf, frame)) = current_surface(store, state)? else {
            return Ok(ActorVerdict::Continue);
        };
        let stepping = &mut state.stepping;
        let vector = match stepping.bound {
            Some(b) if b.surface == index => b.vector,
            _ => frame.free_to_bound_vector(trf, &stepping.params),
        };
        stepping.params = frame.bound_to_free_vector(trf, &vector);
        stepping.reset(frame.bound_to_free_jacobian(trf, &vector));
        Ok(ActorVerdict::Continue)
    }
}

/// Aborts once the absolute path length reaches `limit`, shortening the last
/// step so the limit is met exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLimitAborter {
    pub limit: f64,
}

impl PathLimitAborter {
    #[must_use]
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }
}

impl Actor for PathLimitAborter {
    fn name(&self) -> &'static str {
        "path_limit"
    }

    fn act(&mut self, _store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
        let remaining = self.limit - state.stepping.total_path;
        if remaining <= TOLERANCE {
            debug!(limit = self.limit, "path limit reached");
            return Ok(ActorVerdict::Abort { actor: self.name() });
        }
        state.stepping.constrain(remaining);
        Ok(ActorVerdict::Continue)
    }
}

/// Aborts when the track reaches a target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceAborter {
    pub surface: usize,
}

impl SurfaceAborter {
    #[must_use]
    pub fn new(surface: usize) -> Self {
        Self { surface }
    }
}

impl Actor for SurfaceAborter {
    fn name(&self) -> &'static str {
        "surface_target"
    }

    fn act(&mut self, _store: &GeometryStore, state: &mut PropagationState) -> Result<ActorVerdict> {
        if state.navigation.current_surface() == Some(self.surface) {
            debug!(surface = self.surface, "target surface reached");
            return Ok(ActorVerdict::Abort { actor: self.name() });
        }
        Ok(ActorVerdict::Continue)
    }
}
