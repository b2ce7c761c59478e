use crate::linalg::LinalgError;

/// Errors reported by [`DetManip`](crate::DetManip).
///
/// Every error is local to the call that returned it. A failed `try_*`
/// leaves no proposal pending; a failed `commit` discards the proposal and
/// leaves the engine as it was before the `try_*`, except for
/// [`DetError::PrecisionLoss`], which is reported after the update has been
/// applied and the state rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetError {
    /// Two argument lists that must have the same length do not.
    #[error("argument lengths differ: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// A row or column position is outside `0..bound`.
    #[error("index {index} out of range (must be < {bound})")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Operation called in the wrong protocol state.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    /// The proposed determinant ratio is exactly zero.
    #[error("update would make the matrix singular")]
    SingularUpdate,

    /// A multi-row operation was given the same row (or column) twice.
    #[error("row and column positions of a multi-row update must be distinct")]
    DistinctIndexViolation,

    /// A dense factorization found the matrix singular.
    #[error("matrix is singular")]
    Singular,

    /// The maintained inverse drifted past the configured error bound.
    #[error("inverse drifted: max deviation {deviation:e} exceeds {bound:e}")]
    PrecisionLoss { deviation: f64, bound: f64 },
}

impl From<LinalgError> for DetError {
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::Singular => DetError::Singular,
        }
    }
}
