use crate::traits::Scalar;

use super::DynMatrix;

// ── In-place resizing ───────────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// Reserve storage so that resizing up to `n x n` does not reallocate.
    pub fn reserve_square(&mut self, n: usize) {
        let needed = n * n;
        if needed > self.data.len() {
            self.data.reserve(needed - self.data.len());
        }
    }

    /// Number of elements the buffer can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Resize a square matrix to `n x n` in place, keeping the overlapping
    /// top-left block. New rows and columns are zero.
    ///
    /// ```
    /// use detmanip::DynMatrix;
    /// let mut m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// m.resize_square(3);
    /// assert_eq!(m[(1, 1)], 4.0);
    /// assert_eq!(m[(2, 2)], 0.0);
    /// m.resize_square(1);
    /// assert_eq!(m[(0, 0)], 1.0);
    /// ```
    pub fn resize_square(&mut self, n: usize) {
        assert!(self.is_square(), "resize_square requires a square matrix");
        let old = self.nrows;
        if n > old {
            self.data.resize(n * n, T::zero());
            // Destinations never precede their sources, so walking backwards
            // never clobbers an unread entry.
            for col in (0..old).rev() {
                for row in (0..old).rev() {
                    self.data[col * n + row] = self.data[col * old + row];
                }
                for row in old..n {
                    self.data[col * n + row] = T::zero();
                }
            }
            for x in self.data[old * n..].iter_mut() {
                *x = T::zero();
            }
        } else if n < old {
            for col in 0..n {
                for row in 0..n {
                    self.data[col * n + row] = self.data[col * old + row];
                }
            }
            self.data.truncate(n * n);
        }
        self.nrows = n;
        self.ncols = n;
    }

    /// Swap two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.ncols {
            let base = col * self.nrows;
            self.data.swap(base + a, base + b);
        }
    }

    /// Swap two columns.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let n = self.nrows;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.data.split_at_mut(hi * n);
        left[lo * n..lo * n + n].swap_with_slice(&mut right[..n]);
    }

    /// Copy of row `row`.
    pub fn row_to_vec(&self, row: usize) -> Vec<T> {
        (0..self.ncols).map(|j| self[(row, j)]).collect()
    }

    /// Copy of the `rows x cols` block starting at `(i, j)`.
    pub fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> Self {
        assert!(
            i + rows <= self.nrows && j + cols <= self.ncols,
            "block ({},{})+{}x{} out of bounds for {}x{} matrix",
            i,
            j,
            rows,
            cols,
            self.nrows,
            self.ncols,
        );
        Self::from_fn(rows, cols, |r, c| self[(i + r, j + c)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> DynMatrix<f64> {
        DynMatrix::from_fn(n, n, |i, j| (10 * i + j) as f64 + 1.0)
    }

    #[test]
    fn grow_keeps_top_left_and_zero_fills() {
        let mut m = numbered(3);
        m.resize_square(5);
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i < 3 && j < 3 { (10 * i + j) as f64 + 1.0 } else { 0.0 };
                assert_eq!(m[(i, j)], expected, "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn shrink_keeps_top_left() {
        let mut m = numbered(4);
        m.resize_square(2);
        assert_eq!(m.nrows(), 2);
        assert_eq!(m, numbered(2));
    }

    #[test]
    fn reserved_growth_does_not_reallocate() {
        let mut m = numbered(2);
        m.reserve_square(16);
        let cap = m.capacity();
        for n in 3..=16 {
            m.resize_square(n);
        }
        assert_eq!(m.capacity(), cap);
        assert_eq!(m[(1, 1)], 12.0);
    }

    #[test]
    fn grow_from_empty() {
        let mut m = DynMatrix::zeros(0, 0, 0.0_f64);
        m.resize_square(2);
        assert_eq!(m, DynMatrix::zeros(2, 2, 0.0));
    }

    #[test]
    fn swap_rows_and_cols() {
        let mut m = numbered(3);
        m.swap_rows(0, 2);
        assert_eq!(m.row_to_vec(0), vec![21.0, 22.0, 23.0]);
        m.swap_cols(2, 0);
        assert_eq!(m.row_to_vec(0), vec![23.0, 22.0, 21.0]);
        assert_eq!(m.col(0), &[23.0, 13.0, 3.0]);
    }

    #[test]
    fn block_extracts_submatrix() {
        let m = numbered(4);
        let b = m.block(1, 2, 2, 2);
        assert_eq!(b[(0, 0)], 13.0);
        assert_eq!(b[(1, 1)], 24.0);
    }
}
