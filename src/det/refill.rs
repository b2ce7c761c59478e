use tracing::debug;

use crate::dynmatrix::{DynLu, DynMatrix};
use crate::traits::LinalgScalar;

use super::{check_len, DetError, DetManip, Pending};

#[derive(Debug)]
pub(super) struct RefillWork<X, Y, T> {
    xs: Vec<X>,
    ys: Vec<Y>,
    /// `None` for an empty refill.
    lu: Option<DynLu<T>>,
    det: T,
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Propose replacing every point at once (O(N^3)). Returns
    /// `det(new) / det(old)`; an empty refill gives `1 / det(old)`.
    pub fn try_refill(&mut self, xs: Vec<X>, ys: Vec<Y>) -> Result<T, DetError> {
        self.ensure_clean()?;
        check_len(xs.len(), ys.len())?;
        let n = xs.len();

        let (lu, det) = if n == 0 {
            (None, T::one())
        } else {
            let m = DynMatrix::from_fn(n, n, |i, j| (self.kernel)(&xs[i], &ys[j]));
            let lu = m.lu().map_err(|_| DetError::SingularUpdate)?;
            let det = lu.det();
            (Some(lu), det)
        };
        if det == T::zero() {
            return Err(DetError::SingularUpdate);
        }
        let ratio = det / self.det;
        self.pending = Some(Pending::Refill(RefillWork { xs, ys, lu, det }));
        Ok(ratio)
    }

    pub(super) fn complete_refill(&mut self, w: RefillWork<X, Y, T>) {
        let n = w.xs.len();
        self.reserve(n);
        let mut inv = match &w.lu {
            Some(lu) => lu.inverse(),
            None => DynMatrix::zeros(0, 0, T::zero()),
        };
        inv.reserve_square(self.capacity);
        self.inv = inv;
        self.x_slots = w.xs;
        self.y_slots = w.ys;
        self.row_slot = (0..n).collect();
        self.col_slot = (0..n).collect();
        self.n = n;
        self.det = w.det;
        self.ops_since_check = 0;
        debug!(n, "refill committed");
    }
}
