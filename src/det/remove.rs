use tracing::trace;

use crate::dynmatrix::DynMatrix;
use crate::traits::LinalgScalar;

use super::{check_distinct_sorted, check_index, check_len, parity, DetError, DetManip, Pending};

#[derive(Debug)]
pub(super) struct RemoveWork<T> {
    i: usize,
    j: usize,
    ratio: T,
}

#[derive(Debug)]
pub(super) struct RemoveKWork<T> {
    rows: Vec<usize>,
    cols: Vec<usize>,
    /// `Minv(cols[a], rows[b])`, the block of the inverse that becomes the
    /// Schur pivot once the doomed slots sit at the end of storage.
    ksi: DynMatrix<T>,
    ratio: T,
}

/// Swaps that move the storage slots `doomed` (distinct, `< n`) to
/// `n - k .. n`, in the order given, plus the resulting relocation table
/// `moved_to[old slot] = new slot`.
fn swaps_to_tail(n: usize, doomed: &[usize]) -> (Vec<(usize, usize)>, Vec<usize>) {
    let k = doomed.len();
    let mut moved_to: Vec<usize> = (0..n).collect();
    let mut held_by: Vec<usize> = (0..n).collect();
    let mut swaps = Vec::with_capacity(k);
    for (m, &slot) in doomed.iter().enumerate() {
        let target = n - k + m;
        let cur = moved_to[slot];
        if cur == target {
            continue;
        }
        swaps.push((cur, target));
        let other = held_by[target];
        held_by.swap(cur, target);
        moved_to[slot] = target;
        moved_to[other] = cur;
    }
    (swaps, moved_to)
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Propose removing row `i` and column `j`. Returns `det(new) / det(old)`,
    /// read off the inverse without calling the kernel.
    pub fn try_remove(&mut self, i: usize, j: usize) -> Result<T, DetError> {
        self.ensure_clean()?;
        check_index(i, self.n)?;
        check_index(j, self.n)?;

        let ratio = self.inverse_matrix_entry(j, i) * parity::<T>(i + j);
        if ratio == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::Remove(RemoveWork { i, j, ratio }));
        Ok(ratio)
    }

    pub(super) fn complete_remove(&mut self, w: RemoveWork<T>) {
        let last = self.n - 1;
        let ireal = self.row_slot[w.i];
        let jreal = self.col_slot[w.j];
        self.move_to_tail(&[ireal], &[jreal]);

        // inv = [[P, q], [r, s]]  ->  P - q r / s
        let q = self.inv.col(last)[..last].to_vec();
        let mut r = self.inv.row_to_vec(last);
        r.truncate(last);
        let s = self.inv[(last, last)];
        self.inv.resize_square(last);
        self.inv.add_outer(T::one().negate() / s, &q, &r);

        self.drop_tail(last);
        self.det = self.det * w.ratio;
        trace!(i = w.i, j = w.j, n = self.n, "remove committed");
    }

    /// Propose removing rows `rows` and columns `cols` (same length, no
    /// repeats, all `< N`).
    pub fn try_remove_k(&mut self, rows: &[usize], cols: &[usize]) -> Result<T, DetError> {
        self.ensure_clean()?;
        let k = rows.len();
        check_len(k, cols.len())?;
        for &p in rows.iter().chain(cols) {
            check_index(p, self.n)?;
        }
        let mut rows = rows.to_vec();
        let mut cols = cols.to_vec();
        rows.sort_unstable();
        cols.sort_unstable();
        check_distinct_sorted(&rows)?;
        check_distinct_sorted(&cols)?;

        let ksi = DynMatrix::from_fn(k, k, |a, b| self.inverse_matrix_entry(cols[a], rows[b]));
        let shift: usize = rows.iter().chain(&cols).sum();
        let ratio = ksi.det() * parity::<T>(shift);
        if ratio == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        self.pending = Some(Pending::RemoveK(RemoveKWork { rows, cols, ksi, ratio }));
        Ok(ratio)
    }

    pub(super) fn complete_remove_k(&mut self, w: RemoveKWork<T>) -> Result<(), DetError> {
        let k = w.rows.len();
        if k == 0 {
            return Ok(());
        }
        let s_inv = w.ksi.inverse()?;
        let keep = self.n - k;
        let ireal: Vec<usize> = w.rows.iter().map(|&i| self.row_slot[i]).collect();
        let jreal: Vec<usize> = w.cols.iter().map(|&j| self.col_slot[j]).collect();
        self.move_to_tail(&ireal, &jreal);

        // inv = [[P, Q], [R, S]]  ->  P - Q S^-1 R
        let q = self.inv.block(0, keep, keep, k);
        let r = self.inv.block(keep, 0, k, keep);
        let right = &s_inv * &r;
        self.inv.resize_square(keep);
        self.inv.add_low_rank(T::one().negate(), &q, &right);

        self.drop_tail(keep);
        self.det = self.det * w.ratio;
        trace!(k, n = self.n, "remove_k committed");
        Ok(())
    }

    /// Relocate row slots `ireal` and column slots `jreal` to the end of
    /// storage, in order, keeping the inverse and the lookup tables in step.
    fn move_to_tail(&mut self, ireal: &[usize], jreal: &[usize]) {
        let n = self.n;

        let (swaps, moved_to) = swaps_to_tail(n, ireal);
        for &(a, b) in &swaps {
            self.inv.swap_cols(a, b);
            self.x_slots.swap(a, b);
        }
        for s in self.row_slot.iter_mut() {
            *s = moved_to[*s];
        }

        let (swaps, moved_to) = swaps_to_tail(n, jreal);
        for &(a, b) in &swaps {
            self.inv.swap_rows(a, b);
            self.y_slots.swap(a, b);
        }
        for s in self.col_slot.iter_mut() {
            *s = moved_to[*s];
        }
    }

    /// Forget every slot at or past `keep`. The inverse must already be
    /// `keep x keep`.
    fn drop_tail(&mut self, keep: usize) {
        self.row_slot.retain(|&s| s < keep);
        self.col_slot.retain(|&s| s < keep);
        self.x_slots.truncate(keep);
        self.y_slots.truncate(keep);
        self.n = keep;
    }

    /// Propose removing rows `i0`, `i1` and columns `j0`, `j1`.
    pub fn try_remove2(&mut self, i0: usize, i1: usize, j0: usize, j1: usize) -> Result<T, DetError> {
        self.try_remove_k(&[i0, i1], &[j0, j1])
    }

    // ── Shortcuts ───────────────────────────────────────────────────

    /// `try_remove` followed by `commit`.
    pub fn remove(&mut self, i: usize, j: usize) -> Result<T, DetError> {
        let ratio = self.try_remove(i, j)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Remove the last row and column.
    pub fn remove_at_end(&mut self) -> Result<T, DetError> {
        if self.n == 0 {
            return Err(DetError::IndexOutOfRange { index: 0, bound: 0 });
        }
        let last = self.n - 1;
        self.remove(last, last)
    }

    /// `try_remove2` followed by `commit`.
    pub fn remove2(&mut self, i0: usize, i1: usize, j0: usize, j1: usize) -> Result<T, DetError> {
        let ratio = self.try_remove2(i0, i1, j0, j1)?;
        self.commit()?;
        Ok(ratio)
    }

    /// Remove the last two rows and columns.
    pub fn remove2_at_end(&mut self) -> Result<T, DetError> {
        let n = self.n;
        if n < 2 {
            return Err(DetError::IndexOutOfRange { index: 1, bound: n });
        }
        self.remove2(n - 1, n - 2, n - 1, n - 2)
    }
}
