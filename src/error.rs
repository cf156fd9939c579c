use thiserror::Error;

/// Top-level error type for the tracknav kernel.
#[derive(Debug, Error)]
pub enum TracknavError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

/// Errors raised while assembling or querying the geometry store.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{collection} link {index} is out of range (size {size})")]
    InvalidLink {
        collection: &'static str,
        index: usize,
        size: usize,
    },

    #[error("invalid bounds for {shape}: {reason}")]
    InvalidBounds {
        shape: &'static str,
        reason: &'static str,
    },

    #[error("invalid axis: {0}")]
    InvalidAxis(&'static str),

    #[error("grid has {actual} bin entries, axes require {expected}")]
    BinCountMismatch { expected: usize, actual: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to material descriptions.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("material parameter {parameter} = {value} is not physical")]
    NonPhysical { parameter: &'static str, value: f64 },
}

/// Errors raised when a propagation cannot be set up.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("start volume {0} does not exist")]
    UnknownVolume(usize),

    #[error("start surface {0} does not exist")]
    UnknownSurface(usize),

    #[error("track direction has zero length")]
    ZeroDirection,

    #[error("track parameter {0} is not finite")]
    NonFinite(&'static str),
}

/// Convenience type alias for results using [`TracknavError`].
pub type Result<T> = std::result::Result<T, TracknavError>;
