use tracing::trace;

use crate::dynmatrix::{dot, DynMatrix};
use crate::traits::LinalgScalar;

use super::{check_index, DetError, DetManip, Pending};

#[derive(Debug)]
pub(super) struct ChangeRowWork<X, T> {
    i: usize,
    x: X,
    /// `wᵀ Minv` for the row delta `w`, indexed by row slot.
    mc: Vec<T>,
    ksi: T,
}

#[derive(Debug)]
pub(super) struct ChangeColWork<Y, T> {
    j: usize,
    y: Y,
    /// `Minv u` for the column delta `u`, indexed by column slot.
    mb: Vec<T>,
    ksi: T,
}

#[derive(Debug)]
pub(super) struct ChangeRowColWork<X, Y, T> {
    i: usize,
    j: usize,
    x: X,
    y: Y,
    p: Vec<T>,
    q: Vec<T>,
    /// Inverse of the 2 x 2 capacitance matrix.
    k_inv: DynMatrix<T>,
    ratio: T,
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Propose replacing the row point at row `i` by `x`.
    pub fn try_change_row(&mut self, i: usize, x: X) -> Result<T, DetError> {
        self.ensure_clean()?;
        check_index(i, self.n)?;
        let ireal = self.row_slot[i];
        let old = &self.x_slots[ireal];

        let w: Vec<T> = self
            .y_slots
            .iter()
            .map(|y| (self.kernel)(&x, y) - (self.kernel)(old, y))
            .collect();
        let mut mc = vec![T::zero(); self.n];
        self.inv.tr_mul_vec(&w, &mut mc);
        let ksi = T::one() + mc[ireal];
        if ksi == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::ChangeRow(ChangeRowWork { i, x, mc, ksi }));
        Ok(ksi)
    }

    pub(super) fn complete_change_row(&mut self, w: ChangeRowWork<X, T>) {
        let ireal = self.row_slot[w.i];
        let col = self.inv.col(ireal).to_vec();
        self.inv.add_outer(T::one().negate() / w.ksi, &col, &w.mc);
        self.x_slots[ireal] = w.x;
        self.det = self.det * w.ksi;
        trace!(i = w.i, "change_row committed");
    }

    /// Propose replacing the column point at column `j` by `y`.
    pub fn try_change_col(&mut self, j: usize, y: Y) -> Result<T, DetError> {
        self.ensure_clean()?;
        check_index(j, self.n)?;
        let jreal = self.col_slot[j];
        let old = &self.y_slots[jreal];

        let u: Vec<T> = self
            .x_slots
            .iter()
            .map(|x| (self.kernel)(x, &y) - (self.kernel)(x, old))
            .collect();
        let mut mb = vec![T::zero(); self.n];
        self.inv.mul_vec(&u, &mut mb);
        let ksi = T::one() + mb[jreal];
        if ksi == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::ChangeCol(ChangeColWork { j, y, mb, ksi }));
        Ok(ksi)
    }

    pub(super) fn complete_change_col(&mut self, w: ChangeColWork<Y, T>) {
        let jreal = self.col_slot[w.j];
        let row = self.inv.row_to_vec(jreal);
        self.inv.add_outer(T::one().negate() / w.ksi, &w.mb, &row);
        self.y_slots[jreal] = w.y;
        self.det = self.det * w.ksi;
        trace!(j = w.j, "change_col committed");
    }

    /// Propose replacing row point `i` by `x` and column point `j` by `y`
    /// together (rank-2 update).
    pub fn try_change_row_col(&mut self, i: usize, j: usize, x: X, y: Y) -> Result<T, DetError> {
        self.ensure_clean()?;
        check_index(i, self.n)?;
        check_index(j, self.n)?;
        let n = self.n;
        let r = self.row_slot[i];
        let c = self.col_slot[j];
        let x_old = &self.x_slots[r];
        let y_old = &self.y_slots[c];

        // M' = M + u e_cᵀ + e_r wᵀ, the crossing entry carried by u.
        let mut u: Vec<T> = self
            .x_slots
            .iter()
            .map(|xl| (self.kernel)(xl, &y) - (self.kernel)(xl, y_old))
            .collect();
        u[r] = (self.kernel)(&x, &y) - (self.kernel)(x_old, y_old);
        let mut w: Vec<T> = self
            .y_slots
            .iter()
            .map(|yl| (self.kernel)(&x, yl) - (self.kernel)(x_old, yl))
            .collect();
        w[c] = T::zero();

        let mut p = vec![T::zero(); n];
        self.inv.mul_vec(&u, &mut p);
        let mut q = vec![T::zero(); n];
        self.inv.tr_mul_vec(&w, &mut q);

        let cap = DynMatrix::from_rows(
            2,
            2,
            &[T::one() + p[c], self.inv[(c, r)], dot(&w, &p), T::one() + q[r]],
        );
        let ratio = cap.det();
        if ratio == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        let k_inv = cap.inverse().map_err(|_| DetError::SingularUpdate)?;
        self.pending = Some(Pending::ChangeRowCol(ChangeRowColWork { i, j, x, y, p, q, k_inv, ratio }));
        Ok(ratio)
    }

    pub(super) fn complete_change_row_col(&mut self, w: ChangeRowColWork<X, Y, T>) {
        let n = self.n;
        let r = self.row_slot[w.i];
        let c = self.col_slot[w.j];

        // Woodbury: Minv -= [p, Minv e_r] K^-1 [e_cᵀ Minv; q]
        let left = DynMatrix::from_fn(n, 2, |l, m| if m == 0 { w.p[l] } else { self.inv[(l, r)] });
        let right = DynMatrix::from_fn(2, n, |m, l| if m == 0 { self.inv[(c, l)] } else { w.q[l] });
        let right = &w.k_inv * &right;
        self.inv.add_low_rank(T::one().negate(), &left, &right);

        self.x_slots[r] = w.x;
        self.y_slots[c] = w.y;
        self.det = self.det * w.ratio;
        trace!(i = w.i, j = w.j, "change_row_col committed");
    }

    // ── Immediate forms ─────────────────────────────────────────────

    /// Replace the row point at row `i`. Returns the determinant ratio.
    pub fn change_row(&mut self, i: usize, x: X) -> Result<T, DetError> {
        let ratio = self.try_change_row(i, x)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Replace the column point at column `j`. Returns the determinant ratio.
    pub fn change_col(&mut self, j: usize, y: Y) -> Result<T, DetError> {
        let ratio = self.try_change_col(j, y)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Replace row point `i` and column point `j` in one rank-2 update.
    pub fn change_one_row_and_one_col(&mut self, i: usize, j: usize, x: X, y: Y) -> Result<T, DetError> {
        let ratio = self.try_change_row_col(i, j, x, y)?;
        self.commit()?;
        Ok(ratio)
    }
}
