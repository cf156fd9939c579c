//! Read-only hooks called after every propagation step.

use crate::geometry::store::GeometryStore;
use crate::math::Point3;

use super::navigator::NavigationStatus;
use super::propagator::PropagationState;

pub trait Inspector {
    fn inspect(&mut self, store: &GeometryStore, state: &PropagationState);
}

impl Inspector for () {
    fn inspect(&mut self, _store: &GeometryStore, _state: &PropagationState) {}
}

impl<A: Inspector, B: Inspector> Inspector for (A, B) {
    fn inspect(&mut self, store: &GeometryStore, state: &PropagationState) {
        self.0.inspect(store, state);
        self.1.inspect(store, state);
    }
}

/// A surface or portal reached during a propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracedObject {
    pub surface: usize,
    pub volume: usize,
    /// Absolute path length at the crossing.
    pub path: f64,
    pub position: Point3,
    pub status: NavigationStatus,
}

/// Records every surface and portal the track reaches, in order.
#[derive(Debug, Clone, Default)]
pub struct ObjectTracer {
    pub objects: Vec<TracedObject>,
}

impl ObjectTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of the recorded surfaces.
    pub fn surfaces(&self) -> impl Iterator<Item = usize> + '_ {
        self.objects.iter().map(|o| o.surface)
    }
}

impl Inspector for ObjectTracer {
    fn inspect(&mut self, _store: &GeometryStore, state: &PropagationState) {
        let nav = &state.navigation;
        let Some(surface) = nav.current_surface() else {
            return;
        };
        if nav.is_on_surface() {
            self.objects.push(TracedObject {
                surface,
                volume: nav.volume(),
                path: state.stepping.total_path,
                position: state.stepping.params.pos(),
                status: nav.status(),
            });
        }
    }
}
