use thiserror::Error;

/// Top-level error type for the Tenon joinery kernel.
#[derive(Debug, Error)]
pub enum TenonError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Joinery(#[from] JoineryError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the model graph.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("model contains no members")]
    EmptyModel,

    #[error("a joint candidate already exists for this member pair")]
    DuplicateCandidate,

    #[error("joint candidate members must be distinct")]
    IdenticalMembers,
}

/// Errors raised by the rule resolver for misconfigurations that cannot
/// be attributed to a single candidate.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(
        "no max distance resolvable for candidate at distance {distance}: \
         set one on the rule or pass a resolver default"
    )]
    NoMaxDistance { distance: f64 },
}

/// Errors raised by concrete joints during construction, compatibility
/// checking, or the extension/feature phases.
#[derive(Debug, Error)]
pub enum JoineryError {
    #[error("{joint}: members cannot be joined: {reason}")]
    IncompatibleElements { joint: String, reason: String },

    #[error("{joint} does not support topology {topology}")]
    UnsupportedTopology { joint: String, topology: String },

    #[error("{joint} expects {expected} elements, got {got}")]
    WrongElementCount {
        joint: String,
        expected: String,
        got: usize,
    },

    #[error("reordered elements are not a permutation of the candidate members")]
    ElementsMismatch,

    #[error("{joint}: feature generation failed: {reason}")]
    FeatureFailed { joint: String, reason: String },
}

/// Convenience type alias for results using [`TenonError`].
pub type Result<T> = std::result::Result<T, TenonError>;
