pub mod frame;
pub mod grid;
pub mod mask;
pub mod store;
pub mod surface;
pub mod volume;

pub use frame::LocalFrame;
pub use grid::{Axis, AxisBounds, Grid};
pub use mask::{IntersectionStatus, Mask, MaskKind, MaskLink};
pub use store::GeometryStore;
pub use surface::{Surface, SurfaceRole};
pub use volume::{GridFrame, SurfaceGrid, Volume, VolumeShape, LEAVING_WORLD};
