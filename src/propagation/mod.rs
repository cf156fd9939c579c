//! The navigation and propagation kernel.

pub mod actor;
pub mod config;
pub mod inspector;
pub mod navigator;
pub mod propagator;
pub mod stepper;

pub use actor::{
    Actor, ActorVerdict, InteractionSummary, MaterialInteractor, ParameterTransporter, PathLimitAborter, Resetter,
    SurfaceAborter,
};
pub use config::{NavigationConfig, PropagationConfig, SteppingConfig};
pub use inspector::{Inspector, ObjectTracer, TracedObject};
pub use navigator::{AbortReason, Candidate, NavigationState, NavigationStatus, Navigator};
pub use propagator::{InitialTrack, PropagationResult, PropagationState, Propagator, Termination};
pub use stepper::{Stepper, SteppingState};
