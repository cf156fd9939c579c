use tracing::{debug, trace};

use crate::error::{PropagationError, Result};
use crate::geometry::store::GeometryStore;
use crate::track::{BoundTrackParameters, FreeTrackParameters, ParticleHypothesis};

use super::actor::{Actor, ActorVerdict};
use super::config::PropagationConfig;
use super::inspector::Inspector;
use super::navigator::{AbortReason, NavigationState, NavigationStatus, Navigator};
use super::stepper::{Stepper, SteppingState};

/// Everything one in-flight propagation owns.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationState {
    pub particle: ParticleHypothesis,
    pub navigation: NavigationState,
    pub stepping: SteppingState,
    pub step_count: usize,
}

impl PropagationState {
    #[must_use]
    pub fn new(particle: ParticleHypothesis, params: FreeTrackParameters, volume: usize, capacity: usize) -> Self {
        Self {
            particle,
            navigation: NavigationState::new(volume, capacity),
            stepping: SteppingState::new(params),
            step_count: 0,
        }
    }
}

/// Start of a propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialTrack {
    /// Free parameters inside a known volume.
    Free {
        params: FreeTrackParameters,
        volume: usize,
    },
    /// Parameters bound to a surface, optionally with a covariance. The
    /// start volume is the surface's volume.
    Bound(BoundTrackParameters),
}

/// How a propagation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Left the world through a portal.
    Exited,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationResult {
    pub termination: Termination,
    /// Last consistent state.
    pub state: PropagationState,
}

impl PropagationResult {
    #[must_use]
    pub fn is_exited(&self) -> bool {
        self.termination == Termination::Exited
    }

    #[must_use]
    pub fn params(&self) -> &FreeTrackParameters {
        &self.state.stepping.params
    }

    /// Bound parameters on the last surface reached, when a
    /// [`ParameterTransporter`](super::actor::ParameterTransporter) ran.
    #[must_use]
    pub fn bound(&self) -> Option<&BoundTrackParameters> {
        self.state.stepping.bound.as_ref()
    }

    #[must_use]
    pub fn total_path(&self) -> f64 {
        self.state.stepping.total_path
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.state.step_count
    }
}

/// Drives a navigator and a stepper in lock-step, running the actors and
/// the inspector after every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagator {
    pub stepper: Stepper,
    pub config: PropagationConfig,
}

impl Propagator {
    #[must_use]
    pub fn new(stepper: Stepper, config: PropagationConfig) -> Self {
        Self { stepper, config }
    }

    /// Propagates a track until it leaves the world or is aborted.
    ///
    /// Aborts are reported in the result's [`Termination`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the start volume or surface does not exist, the
    /// track is not finite or has no direction, or the store holds a
    /// dangling link.
    pub fn propagate<A: Actor, I: Inspector>(
        &self,
        store: &GeometryStore,
        initial: &InitialTrack,
        particle: ParticleHypothesis,
        actors: &mut A,
        inspector: &mut I,
    ) -> Result<PropagationResult> {
        let navigator = Navigator::new(self.config.navigation);
        let (mut state, start_surface) = self.initial_state(store, initial, particle)?;

        navigator.init(store, &mut state.navigation, &state.stepping.params, start_surface)?;
        run_actors(store, &mut state, actors)?;
        inspector.inspect(store, &state);

        loop {
            navigator.resolve(store, &mut state.navigation, &state.stepping.params)?;
            if state.navigation.is_terminal() {
                break;
            }
            if state.step_count >= self.config.max_steps {
                state.navigation.abort(AbortReason::StepLimitExceeded);
                break;
            }

            let h = self.step_size(&state);
            self.stepper.step(&mut state.stepping, &state.particle, h);
            state.stepping.step_limit = f64::INFINITY;
            state.step_count += 1;
            trace!(
                step = state.step_count,
                h,
                total_path = state.stepping.total_path,
                "stepped"
            );

            navigator.update(store, &mut state.navigation, &state.stepping.params, h)?;
            if state.navigation.is_terminal() {
                break;
            }
            run_actors(store, &mut state, actors)?;
            inspector.inspect(store, &state);
        }

        let termination = match state.navigation.status() {
            NavigationStatus::Exited => Termination::Exited,
            _ => Termination::Aborted(
                state
                    .navigation
                    .abort_reason()
                    .unwrap_or(AbortReason::NoValidCandidate),
            ),
        };
        debug!(
            ?termination,
            steps = state.step_count,
            total_path = state.stepping.total_path,
            "propagation finished"
        );
        Ok(PropagationResult { termination, state })
    }

    fn initial_state(
        &self,
        store: &GeometryStore,
        initial: &InitialTrack,
        particle: ParticleHypothesis,
    ) -> Result<(PropagationState, Option<usize>)> {
        let capacity = self.config.navigation.candidate_capacity;
        match *initial {
            InitialTrack::Free { params, volume } => {
                params.check_finite()?;
                store
                    .volume(volume)
                    .map_err(|_| PropagationError::UnknownVolume(volume))?;
                Ok((PropagationState::new(particle, params, volume, capacity), None))
            }
            InitialTrack::Bound(start) => {
                let surface = store
                    .surface(start.surface)
                    .map_err(|_| PropagationError::UnknownSurface(start.surface))?;
                let trf = store.transform(surface.transform)?;
                let frame = store.mask(surface.mask)?.frame();
                let params = frame.bound_to_free_vector(trf, &start.vector);
                params.check_finite()?;

                let mut state = PropagationState::new(particle, params, surface.volume, capacity);
                state.stepping.reset(frame.bound_to_free_jacobian(trf, &start.vector));
                state.stepping.bound = Some(start);
                Ok((state, Some(start.surface)))
            }
        }
    }

    /// Signed length of the next step: towards the next candidate, kept
    /// within the configured size range and the actors' step limit.
    fn step_size(&self, state: &PropagationState) -> f64 {
        let limits = &self.config.stepping;
        let mut h = state
            .navigation
            .target_distance()
            .unwrap_or(limits.max_step_size);
        if h.abs() < limits.min_step_size {
            h = limits.min_step_size.copysign(h);
        }
        h = h.clamp(-limits.max_step_size, limits.max_step_size);
        if h.abs() > state.stepping.step_limit {
            h = state.stepping.step_limit.copysign(h);
        }
        h
    }
}

fn run_actors<A: Actor>(store: &GeometryStore, state: &mut PropagationState, actors: &mut A) -> Result<()> {
    if let ActorVerdict::Abort { actor } = actors.act(store, state)? {
        state.navigation.abort(AbortReason::ActorAbort { actor });
    }
    Ok(())
}
