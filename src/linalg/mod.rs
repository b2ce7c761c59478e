pub(crate) mod lu;

pub use lu::{lu_in_place, lu_solve};

/// Errors from the dense linear algebra primitives.
///
/// Returned by [`DynLu::new`](crate::dynmatrix::DynLu::new) and the
/// `inverse()` convenience method on [`DynMatrix`](crate::DynMatrix).
///
/// ```
/// use detmanip::DynMatrix;
/// use detmanip::linalg::LinalgError;
///
/// let singular = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(singular.lu().unwrap_err(), LinalgError::Singular);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinalgError {
    /// Matrix is singular (a pivot column is exactly zero).
    Singular,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular"),
        }
    }
}

impl std::error::Error for LinalgError {}
