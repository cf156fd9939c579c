pub mod error;
pub mod geometry;
pub mod material;
pub mod math;
pub mod propagation;
pub mod track;

#[cfg(test)]
mod fixtures;

pub use error::{Result, TracknavError};
