use tracing::trace;

use crate::dynmatrix::{dot, DynMatrix};
use crate::traits::LinalgScalar;

use super::{argsort, check_distinct_sorted, check_index, check_len, parity, DetError, DetManip, Pending};

#[derive(Debug)]
pub(super) struct InsertWork<X, Y, T> {
    i: usize,
    j: usize,
    x: X,
    y: Y,
    /// `Minv * B`, indexed by column slot.
    mb: Vec<T>,
    /// New row `C`, indexed by column slot.
    c: Vec<T>,
    ksi: T,
    ratio: T,
}

#[derive(Debug)]
pub(super) struct InsertKWork<X, Y, T> {
    /// Target row positions, ascending; `xs[m]` goes to `rows[m]`.
    rows: Vec<usize>,
    cols: Vec<usize>,
    xs: Vec<X>,
    ys: Vec<Y>,
    /// `Minv * B`, N x k.
    mb: DynMatrix<T>,
    /// New rows `C`, k x N.
    c: DynMatrix<T>,
    /// Schur complement `D - C Minv B`, k x k.
    s: DynMatrix<T>,
    ratio: T,
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Propose inserting row point `x` at row `i` and column point `y` at
    /// column `j` (`0 <= i, j <= N`). Returns `det(new) / det(old)`.
    pub fn try_insert(&mut self, i: usize, j: usize, x: X, y: Y) -> Result<T, DetError> {
        self.ensure_clean()?;
        let n = self.n;
        check_index(i, n + 1)?;
        check_index(j, n + 1)?;

        let b: Vec<T> = self.x_slots.iter().map(|xs| (self.kernel)(xs, &y)).collect();
        let c: Vec<T> = self.y_slots.iter().map(|ys| (self.kernel)(&x, ys)).collect();
        let mut mb = vec![T::zero(); n];
        self.inv.mul_vec(&b, &mut mb);
        let ksi = (self.kernel)(&x, &y) - dot(&c, &mb);

        let ratio = ksi * parity::<T>(i + j);
        if ratio == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::Insert(InsertWork { i, j, x, y, mb, c, ksi, ratio }));
        Ok(ratio)
    }

    pub(super) fn complete_insert(&mut self, w: InsertWork<X, Y, T>) {
        let n = self.n;
        self.reserve(n + 1);

        let mut mc = vec![T::zero(); n];
        self.inv.tr_mul_vec(&w.c, &mut mc);
        let mut mb = w.mb;
        mb.push(T::one().negate());
        mc.push(T::one().negate());

        self.inv.resize_square(n + 1);
        self.inv.add_outer(T::one() / w.ksi, &mb, &mc);

        self.x_slots.push(w.x);
        self.y_slots.push(w.y);
        self.row_slot.insert(w.i, n);
        self.col_slot.insert(w.j, n);
        self.n = n + 1;
        self.det = self.det * w.ratio;
        trace!(i = w.i, j = w.j, n = self.n, "insert committed");
    }

    /// Propose inserting `k` rows and columns at once. `xs[m]` is placed at
    /// row `rows[m]` and `ys[m]` at column `cols[m]` of the enlarged matrix,
    /// so every position must be `< N + k` and positions must not repeat.
    ///
    /// `k = 0` is accepted and proposes a no-op with ratio 1.
    pub fn try_insert_k(&mut self, rows: &[usize], cols: &[usize], xs: &[X], ys: &[Y]) -> Result<T, DetError> {
        self.ensure_clean()?;
        let k = rows.len();
        check_len(k, cols.len())?;
        check_len(k, xs.len())?;
        check_len(k, ys.len())?;
        let n = self.n;
        for &p in rows.iter().chain(cols) {
            check_index(p, n + k)?;
        }

        let ri = argsort(rows);
        let ci = argsort(cols);
        let rows: Vec<usize> = ri.iter().map(|&m| rows[m]).collect();
        let cols: Vec<usize> = ci.iter().map(|&m| cols[m]).collect();
        check_distinct_sorted(&rows)?;
        check_distinct_sorted(&cols)?;
        let xs: Vec<X> = ri.iter().map(|&m| xs[m].clone()).collect();
        let ys: Vec<Y> = ci.iter().map(|&m| ys[m].clone()).collect();

        let b = DynMatrix::from_fn(n, k, |r, m| (self.kernel)(&self.x_slots[r], &ys[m]));
        let c = DynMatrix::from_fn(k, n, |m, col| (self.kernel)(&xs[m], &self.y_slots[col]));
        let mb = &self.inv * &b;
        let cmb = &c * &mb;
        let s = DynMatrix::from_fn(k, k, |m, l| (self.kernel)(&xs[m], &ys[l]) - cmb[(m, l)]);

        let shift: usize = rows.iter().chain(&cols).sum();
        let ratio = s.det() * parity::<T>(shift);
        if ratio == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::InsertK(InsertKWork { rows, cols, xs, ys, mb, c, s, ratio }));
        Ok(ratio)
    }

    pub(super) fn complete_insert_k(&mut self, w: InsertKWork<X, Y, T>) -> Result<(), DetError> {
        let n = self.n;
        let k = w.rows.len();
        if k == 0 {
            return Ok(());
        }
        let s_inv = w.s.inverse()?;
        self.reserve(n + k);

        // [[A, B], [C, D]]^-1 = [[Ainv, 0], [0, 0]] + [MB; -I] S^-1 [MC, -I]
        let mc = &w.c * &self.inv;
        let mc_ext = DynMatrix::from_fn(k, n + k, |m, r| {
            if r < n {
                mc[(m, r)]
            } else if r - n == m {
                T::one().negate()
            } else {
                T::zero()
            }
        });
        let mb_ext = DynMatrix::from_fn(n + k, k, |col, m| {
            if col < n {
                w.mb[(col, m)]
            } else if col - n == m {
                T::one().negate()
            } else {
                T::zero()
            }
        });
        let right = &s_inv * &mc_ext;

        self.inv.resize_square(n + k);
        self.inv.add_low_rank(T::one(), &mb_ext, &right);

        self.x_slots.extend(w.xs);
        self.y_slots.extend(w.ys);
        for (m, (&r, &c)) in w.rows.iter().zip(&w.cols).enumerate() {
            self.row_slot.insert(r, n + m);
            self.col_slot.insert(c, n + m);
        }
        self.n = n + k;
        self.det = self.det * w.ratio;
        trace!(k, n = self.n, "insert_k committed");
        Ok(())
    }

    /// Propose inserting two rows and columns: `x0` at row `i0`, `x1` at
    /// row `i1`, `y0` at column `j0`, `y1` at column `j1`, all positions
    /// referring to the enlarged matrix.
    #[allow(clippy::too_many_arguments)]
    pub fn try_insert2(
        &mut self,
        i0: usize,
        i1: usize,
        j0: usize,
        j1: usize,
        x0: X,
        x1: X,
        y0: Y,
        y1: Y,
    ) -> Result<T, DetError> {
        self.try_insert_k(&[i0, i1], &[j0, j1], &[x0, x1], &[y0, y1])
    }

    // ── Shortcuts ───────────────────────────────────────────────────

    /// `try_insert` followed by `commit`.
    pub fn insert(&mut self, i: usize, j: usize, x: X, y: Y) -> Result<T, DetError> {
        let ratio = self.try_insert(i, j, x, y)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Insert as the last row and column.
    pub fn insert_at_end(&mut self, x: X, y: Y) -> Result<T, DetError> {
        let n = self.n;
        self.insert(n, n, x, y)
    }

    /// `try_insert2` followed by `commit`.
    #[allow(clippy::too_many_arguments)]
    pub fn insert2(
        &mut self,
        i0: usize,
        i1: usize,
        j0: usize,
        j1: usize,
        x0: X,
        x1: X,
        y0: Y,
        y1: Y,
    ) -> Result<T, DetError> {
        let ratio = self.try_insert2(i0, i1, j0, j1, x0, x1, y0, y1)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Insert two rows and columns as the last two, in order.
    pub fn insert2_at_end(&mut self, x0: X, x1: X, y0: Y, y1: Y) -> Result<T, DetError> {
        let n = self.n;
        self.insert2(n, n + 1, n, n + 1, x0, x1, y0, y1)
    }
}
