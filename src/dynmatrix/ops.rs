use core::ops::Mul;

use crate::traits::{LinalgScalar, Scalar};

use super::DynMatrix;

// ── Matrix multiplication ───────────────────────────────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let m = self.nrows;
        let n = self.ncols;
        let p = rhs.ncols;
        let mut out = DynMatrix::zeros(m, p, T::zero());
        // out[:, j] += a[:, k] * b[k, j], walking contiguous columns.
        for j in 0..p {
            for k in 0..n {
                let b_kj = rhs[(k, j)];
                if b_kj == T::zero() {
                    continue;
                }
                let a_col = &self.data[k * m..k * m + m];
                let o_col = &mut out.data[j * m..j * m + m];
                for (o, &a) in o_col.iter_mut().zip(a_col) {
                    *o = *o + a * b_kj;
                }
            }
        }
        out
    }
}

impl<T: Scalar> Mul for DynMatrix<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        &self * &rhs
    }
}

// ── BLAS-2 style kernels ────────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// `out = A * v` (gemv).
    ///
    /// ```
    /// use detmanip::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// let mut out = [0.0; 2];
    /// a.mul_vec(&[1.0, 1.0], &mut out);
    /// assert_eq!(out, [3.0, 7.0]);
    /// ```
    pub fn mul_vec(&self, v: &[T], out: &mut [T]) {
        assert_eq!(v.len(), self.ncols, "vector length mismatch");
        assert_eq!(out.len(), self.nrows, "output length mismatch");
        for o in out.iter_mut() {
            *o = T::zero();
        }
        for (k, &v_k) in v.iter().enumerate() {
            if v_k == T::zero() {
                continue;
            }
            for (o, &a) in out.iter_mut().zip(self.col(k)) {
                *o = *o + a * v_k;
            }
        }
    }

    /// `out = Aᵀ * v`, i.e. the row vector `vᵀ A`.
    ///
    /// ```
    /// use detmanip::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// let mut out = [0.0; 2];
    /// a.tr_mul_vec(&[1.0, 1.0], &mut out);
    /// assert_eq!(out, [4.0, 6.0]);
    /// ```
    pub fn tr_mul_vec(&self, v: &[T], out: &mut [T]) {
        assert_eq!(v.len(), self.nrows, "vector length mismatch");
        assert_eq!(out.len(), self.ncols, "output length mismatch");
        for (j, o) in out.iter_mut().enumerate() {
            *o = dot(self.col(j), v);
        }
    }

    /// Rank-1 update `A += alpha * u * vᵀ` (ger).
    pub fn add_outer(&mut self, alpha: T, u: &[T], v: &[T]) {
        assert_eq!(u.len(), self.nrows, "left vector length mismatch");
        assert_eq!(v.len(), self.ncols, "right vector length mismatch");
        for (j, &v_j) in v.iter().enumerate() {
            let s = alpha * v_j;
            if s == T::zero() {
                continue;
            }
            for (a, &u_i) in self.col_mut(j).iter_mut().zip(u) {
                *a = *a + u_i * s;
            }
        }
    }

    /// Rank-k update `A += alpha * L * R`, with `L` of shape `n x k` and `R`
    /// of shape `k x m` (gemm with a thin inner dimension).
    pub fn add_low_rank(&mut self, alpha: T, left: &DynMatrix<T>, right: &DynMatrix<T>) {
        assert_eq!(left.nrows, self.nrows, "left factor row mismatch");
        assert_eq!(right.ncols, self.ncols, "right factor column mismatch");
        assert_eq!(left.ncols, right.nrows, "inner dimension mismatch");
        for l in 0..left.ncols {
            let u = left.col(l);
            for j in 0..self.ncols {
                let s = alpha * right[(l, j)];
                if s == T::zero() {
                    continue;
                }
                for (a, &u_i) in self.col_mut(j).iter_mut().zip(u) {
                    *a = *a + u_i * s;
                }
            }
        }
    }
}

impl<T: LinalgScalar> DynMatrix<T> {
    /// Largest element-wise distance `max |a_ij - b_ij|`.
    pub fn max_abs_diff(&self, other: &DynMatrix<T>) -> T::Real {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch",
        );
        self.data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| (a - b).modulus())
            .fold(<T::Real as num_traits::Zero>::zero(), |acc, m| if m > acc { m } else { acc })
    }

    /// Largest element-wise `max |a_ij + b_ij|`, the scale used for relative
    /// comparisons of two approximations of the same matrix.
    pub fn max_abs_sum(&self, other: &DynMatrix<T>) -> T::Real {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch",
        );
        self.data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| (a + b).modulus())
            .fold(<T::Real as num_traits::Zero>::zero(), |acc, m| if m > acc { m } else { acc })
    }
}

/// Unconjugated dot product `Σ a_i b_i`.
#[inline]
pub fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}
