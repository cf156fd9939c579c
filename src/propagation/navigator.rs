//! Navigation through the volumes of a geometry store.
//!
//! The navigator keeps, per track, a list of candidate surface crossings in
//! the current volume, sorted by path length, and moves from one to the next
//! as the stepper advances the track:
//!
//! ```text
//! Uninitialized -> HasCandidates -> OnSurface      -> HasCandidates ...
//!                                -> BetweenVolumes -> HasCandidates | Exited
//! any state -> Aborted
//! ```

use tracing::{debug, trace};

use crate::error::{PropagationError, Result};
use crate::geometry::mask::IntersectionStatus;
use crate::geometry::store::GeometryStore;
use crate::geometry::volume::LEAVING_WORLD;
use crate::math::Ray;
use crate::track::FreeTrackParameters;

use super::config::NavigationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
    Uninitialized,
    /// Candidates in the current volume are known.
    HasCandidates,
    /// A sensitive or passive surface was reached.
    OnSurface,
    /// A portal was reached; the volume switch is pending.
    BetweenVolumes,
    /// A portal out of the world was crossed.
    Exited,
    Aborted,
}

/// Why a propagation stopped before leaving the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// No surface of the current volume can be reached.
    NoValidCandidate,
    StepLimitExceeded,
    /// An actor asked to stop.
    ActorAbort { actor: &'static str },
}

/// A pending surface crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Signed path length from the current position.
    pub path: f64,
    pub surface: usize,
    /// Status of the crossing when it was gathered. Only inside crossings
    /// become candidates.
    pub status: IntersectionStatus,
}

/// Per-track navigation data.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    volume: usize,
    status: NavigationStatus,
    candidates: Vec<Candidate>,
    visited: Vec<usize>,
    next: usize,
    current: Option<usize>,
    abort_reason: Option<AbortReason>,
}

impl NavigationState {
    #[must_use]
    pub fn new(volume: usize, capacity: usize) -> Self {
        Self {
            volume,
            status: NavigationStatus::Uninitialized,
            candidates: Vec::with_capacity(capacity),
            visited: Vec::with_capacity(capacity),
            next: 0,
            current: None,
            abort_reason: None,
        }
    }

    #[must_use]
    pub fn volume(&self) -> usize {
        self.volume
    }

    #[must_use]
    pub fn status(&self) -> NavigationStatus {
        self.status
    }

    /// Candidates not yet reached, nearest first.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.get(self.next..).unwrap_or(&[])
    }

    #[must_use]
    pub fn next_candidate(&self) -> Option<&Candidate> {
        self.candidates.get(self.next)
    }

    /// Distance to the next candidate.
    #[must_use]
    pub fn target_distance(&self) -> Option<f64> {
        self.next_candidate().map(|c| c.path)
    }

    /// Surface the track currently sits on.
    #[must_use]
    pub fn current_surface(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn is_on_surface(&self) -> bool {
        matches!(
            self.status,
            NavigationStatus::OnSurface | NavigationStatus::BetweenVolumes
        )
    }

    #[must_use]
    pub fn is_on_portal(&self) -> bool {
        self.status == NavigationStatus::BetweenVolumes
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, NavigationStatus::Exited | NavigationStatus::Aborted)
    }

    #[must_use]
    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.abort_reason
    }

    /// Stops the navigation. The first reason given is kept.
    pub fn abort(&mut self, reason: AbortReason) {
        if self.status != NavigationStatus::Aborted {
            debug!(volume = self.volume, ?reason, "navigation aborted");
            self.status = NavigationStatus::Aborted;
            self.abort_reason = Some(reason);
        }
    }
}

/// Stateless navigation logic; all per-track data lives in
/// [`NavigationState`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Navigator {
    pub config: NavigationConfig,
}

impl Navigator {
    #[must_use]
    pub fn new(config: NavigationConfig) -> Self {
        Self { config }
    }

    /// Gathers the first candidates. A track starting on `start_surface`
    /// ignores crossings at its start position; a free track also accepts
    /// crossings slightly behind it.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero direction or a dangling geometry link.
    pub fn init(
        &self,
        store: &GeometryStore,
        state: &mut NavigationState,
        params: &FreeTrackParameters,
        start_surface: Option<usize>,
    ) -> Result<()> {
        let min_path = if start_surface.is_some() {
            self.config.on_surface_tolerance
        } else {
            self.config.overstep_tolerance
        };
        self.gather(store, state, params, min_path)
    }

    /// Re-evaluates the next candidate after a step of length `step`.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero direction or a dangling geometry link.
    pub fn update(
        &self,
        store: &GeometryStore,
        state: &mut NavigationState,
        params: &FreeTrackParameters,
        step: f64,
    ) -> Result<()> {
        if state.status != NavigationStatus::HasCandidates {
            return Ok(());
        }
        for candidate in &mut state.candidates[state.next..] {
            candidate.path -= step;
        }

        let ray = Ray::new(params.pos(), params.dir()).ok_or(PropagationError::ZeroDirection)?;
        while let Some(&target) = state.candidates.get(state.next) {
            match self.reintersect(store, &target, &ray)? {
                Some(path) if path >= self.config.overstep_tolerance => {
                    state.candidates[state.next].path = path;
                    if path.abs() <= self.config.on_surface_tolerance {
                        state.current = Some(target.surface);
                        state.status = if store.surface(target.surface)?.is_portal() {
                            NavigationStatus::BetweenVolumes
                        } else {
                            NavigationStatus::OnSurface
                        };
                        debug!(surface = target.surface, status = ?state.status, "reached surface");
                    }
                    return Ok(());
                }
                _ => {
                    trace!(surface = target.surface, "dropping unreachable candidate");
                    state.next += 1;
                }
            }
        }
        self.gather(store, state, params, self.config.on_surface_tolerance)
    }

    /// Leaves a reached surface: moves on to the next candidate, switches
    /// volume behind a portal, or terminates when the world is left.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero direction or a dangling geometry link.
    pub fn resolve(&self, store: &GeometryStore, state: &mut NavigationState, params: &FreeTrackParameters) -> Result<()> {
        match state.status {
            NavigationStatus::OnSurface => {
                state.next += 1;
                state.current = None;
                if state.next < state.candidates.len() {
                    state.status = NavigationStatus::HasCandidates;
                    Ok(())
                } else {
                    self.gather(store, state, params, self.config.on_surface_tolerance)
                }
            }
            NavigationStatus::BetweenVolumes => {
                let Some(portal) = state.current else {
                    state.abort(AbortReason::NoValidCandidate);
                    return Ok(());
                };
                let link = store.mask(store.surface(portal)?.mask)?.volume_link();
                if link == LEAVING_WORLD {
                    debug!(portal, "left the world");
                    state.status = NavigationStatus::Exited;
                    return Ok(());
                }
                store.volume(link)?;
                debug!(from = state.volume, to = link, "switching volume");
                state.volume = link;
                self.gather(store, state, params, self.config.on_surface_tolerance)
            }
            _ => Ok(()),
        }
    }

    /// Intersects the surfaces of the current volume (or the acceleration
    /// grid's neighbourhood plus all portals) and keeps the reachable
    /// crossings at or beyond `min_path`, sorted by path and surface index.
    fn gather(
        &self,
        store: &GeometryStore,
        state: &mut NavigationState,
        params: &FreeTrackParameters,
        min_path: f64,
    ) -> Result<()> {
        state.candidates.clear();
        state.visited.clear();
        state.next = 0;
        state.current = None;

        let ray = Ray::new(params.pos(), params.dir()).ok_or(PropagationError::ZeroDirection)?;
        let volume = store.volume(state.volume)?;
        match volume.grid {
            None => {
                for &surface in volume.surfaces() {
                    self.add_candidates(store, surface, &ray, min_path, &mut state.candidates)?;
                }
            }
            Some(grid) => {
                for &surface in volume.surfaces() {
                    if store.surface(surface)?.is_portal() {
                        state.visited.push(surface);
                        self.add_candidates(store, surface, &ray, min_path, &mut state.candidates)?;
                    }
                }
                let mut result = Ok(());
                store.surface_grid(grid)?.visit_candidates(&ray, |surface| {
                    if result.is_err() || state.visited.contains(&surface) {
                        return;
                    }
                    state.visited.push(surface);
                    result = self.add_candidates(store, surface, &ray, min_path, &mut state.candidates);
                });
                result?;
            }
        }

        state
            .candidates
            .sort_unstable_by(|a, b| a.path.total_cmp(&b.path).then(a.surface.cmp(&b.surface)));

        debug!(
            volume = state.volume,
            candidates = state.candidates.len(),
            "gathered candidates"
        );
        if state.candidates.is_empty() {
            state.abort(AbortReason::NoValidCandidate);
        } else {
            state.status = NavigationStatus::HasCandidates;
        }
        Ok(())
    }

    fn add_candidates(
        &self,
        store: &GeometryStore,
        surface: usize,
        ray: &Ray,
        min_path: f64,
        out: &mut Vec<Candidate>,
    ) -> Result<()> {
        let sf = store.surface(surface)?;
        let mask = store.mask(sf.mask)?;
        let local = ray.to_local(store.transform(sf.transform)?);
        for hit in mask.intersect(&local, self.config.mask_tolerance) {
            if hit.is_inside() && hit.path >= min_path {
                out.push(Candidate {
                    path: hit.path,
                    surface,
                    status: hit.status,
                });
            }
        }
        Ok(())
    }

    /// Path to the target's surface from the current position, choosing the
    /// solution closest to the expected path.
    fn reintersect(&self, store: &GeometryStore, target: &Candidate, ray: &Ray) -> Result<Option<f64>> {
        let sf = store.surface(target.surface)?;
        let mask = store.mask(sf.mask)?;
        let local = ray.to_local(store.transform(sf.transform)?);
        Ok(mask
            .intersect(&local, self.config.mask_tolerance)
            .iter()
            .filter(|hit| hit.is_inside())
            .map(|hit| hit.path)
            .min_by(|a, b| (a - target.path).abs().total_cmp(&(b - target.path).abs())))
    }
}
