use crate::linalg::lu::{lu_in_place, lu_solve};
use crate::linalg::LinalgError;
use crate::traits::LinalgScalar;

use super::DynMatrix;

// ── DynLu ───────────────────────────────────────────────────────────

/// LU decomposition of a dynamically-sized square matrix.
///
/// Stores the packed L/U factors and permutation vector. This is the dense
/// O(N^3) primitive behind construction, refill and regeneration of a
/// [`DetManip`](crate::DetManip).
///
/// # Example
///
/// ```
/// use detmanip::DynMatrix;
///
/// let a = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 5.0, 3.0]);
/// let lu = a.lu().unwrap();
///
/// assert!((lu.det() - 1.0).abs() < 1e-12);
///
/// let inv = lu.inverse();
/// assert!((inv[(0, 0)] - 3.0).abs() < 1e-12);
/// assert!((inv[(0, 1)] + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct DynLu<T> {
    lu: DynMatrix<T>,
    perm: Vec<usize>,
    even: bool,
}

impl<T: LinalgScalar> DynLu<T> {
    /// Decompose a matrix. Returns an error if the matrix is singular.
    pub fn new(a: &DynMatrix<T>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "LU decomposition requires a square matrix");
        let n = a.nrows();
        let mut lu = a.clone();
        let mut perm = vec![0usize; n];
        let even = lu_in_place(&mut lu, &mut perm)?;
        Ok(Self { lu, perm, even })
    }

    /// Compute the matrix inverse, one unit column at a time.
    pub fn inverse(&self) -> DynMatrix<T> {
        let n = self.lu.nrows();
        let mut inv = DynMatrix::zeros(n, n, T::zero());
        let mut e = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();
            lu_solve(&self.lu, &self.perm, &e, inv.col_mut(col));
        }

        inv
    }

    /// Compute the determinant.
    pub fn det(&self) -> T {
        let n = self.lu.nrows();
        let mut d = if self.even { T::one() } else { T::one().negate() };
        for i in 0..n {
            d = d * self.lu[(i, i)];
        }
        d
    }
}

// ── Convenience methods ─────────────────────────────────────────────

impl<T: LinalgScalar> DynMatrix<T> {
    /// LU decomposition with partial pivoting.
    pub fn lu(&self) -> Result<DynLu<T>, LinalgError> {
        DynLu::new(self)
    }

    /// Matrix inverse. Closed form for 1x1 and 2x2, LU otherwise.
    ///
    /// ```
    /// use detmanip::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 7.0, 2.0, 6.0]);
    /// let id = &a * &a.inverse().unwrap();
    /// assert!((id[(0, 0)] - 1.0).abs() < 1e-12);
    /// assert!(id[(0, 1)].abs() < 1e-12);
    /// ```
    pub fn inverse(&self) -> Result<DynMatrix<T>, LinalgError> {
        assert!(self.is_square(), "inverse requires a square matrix");
        match self.nrows {
            1 => {
                let a = self[(0, 0)];
                if a == T::zero() {
                    return Err(LinalgError::Singular);
                }
                Ok(DynMatrix::from_fn(1, 1, |_, _| T::one() / a))
            }
            2 => {
                let (a, b, c, d) = (self[(0, 0)], self[(0, 1)], self[(1, 0)], self[(1, 1)]);
                let det = a * d - b * c;
                if det == T::zero() {
                    return Err(LinalgError::Singular);
                }
                let inv_det = T::one() / det;
                Ok(DynMatrix::from_rows(
                    2,
                    2,
                    &[d * inv_det, b.negate() * inv_det, c.negate() * inv_det, a * inv_det],
                ))
            }
            _ => Ok(self.lu()?.inverse()),
        }
    }

    /// Determinant. Closed form up to 3x3, LU otherwise; a singular matrix
    /// gives exactly zero.
    ///
    /// ```
    /// use detmanip::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[3.0_f64, 8.0, 4.0, 6.0]);
    /// assert!((m.det() - (-14.0)).abs() < 1e-12);
    /// ```
    pub fn det(&self) -> T {
        assert!(self.is_square(), "determinant requires a square matrix");
        let m = |i: usize, j: usize| self[(i, j)];
        match self.nrows {
            0 => T::one(),
            1 => m(0, 0),
            2 => m(0, 0) * m(1, 1) - m(1, 0) * m(0, 1),
            // Rule of Sarrus
            3 => {
                m(0, 0) * m(1, 1) * m(2, 2) + m(0, 1) * m(1, 2) * m(2, 0) + m(0, 2) * m(1, 0) * m(2, 1)
                    - m(2, 0) * m(1, 1) * m(0, 2)
                    - m(2, 1) * m(1, 2) * m(0, 0)
                    - m(2, 2) * m(1, 0) * m(0, 1)
            }
            _ => match self.lu() {
                Ok(lu) => lu.det(),
                Err(LinalgError::Singular) => T::zero(),
            },
        }
    }
}
