//! Incremental determinant and inverse maintenance.
//!
//! [`DetManip`] owns the row points `x`, the column points `y`, the inverse
//! of the matrix `M(i, j) = F(x[i], y[j])` and its signed determinant. Small
//! structural changes are proposed with a `try_*` call, which returns the
//! determinant ratio `det(new) / det(old)` in O(N^2) without touching the
//! state, and are then either [`commit`](DetManip::commit)ted or
//! [`reject`](DetManip::reject)ed.
//!
//! Rows and columns live in internal storage slots. Two lookup tables map
//! logical positions to slots, so inserting at position `i` appends storage
//! and records the position, and removing swaps the doomed slot to the end
//! of storage. The stored inverse is indexed `(column slot, row slot)`.

mod change;
mod error;
mod insert;
mod refill;
mod remove;
mod roll;
mod settings;

pub use error::DetError;
pub use roll::RollDirection;
pub use settings::DetManipSettings;

use tracing::{debug, error, warn};

use crate::dynmatrix::DynMatrix;
use crate::traits::LinalgScalar;

use change::{ChangeColWork, ChangeRowColWork, ChangeRowWork};
use insert::{InsertKWork, InsertWork};
use refill::RefillWork;
use remove::{RemoveKWork, RemoveWork};

/// Capacity reserved by an engine built from an empty point list.
const DEFAULT_CAPACITY: usize = 30;

/// The proposal left by the last `try_*` call, with everything `commit`
/// needs to finish it in O(N^2).
#[derive(Debug)]
enum Pending<X, Y, T> {
    Insert(InsertWork<X, Y, T>),
    InsertK(InsertKWork<X, Y, T>),
    Remove(RemoveWork<T>),
    RemoveK(RemoveKWork<T>),
    ChangeRow(ChangeRowWork<X, T>),
    ChangeCol(ChangeColWork<Y, T>),
    ChangeRowCol(ChangeRowColWork<X, Y, T>),
    Refill(RefillWork<X, Y, T>),
}

/// Determinant and inverse of a kernel matrix under fast low-rank updates.
///
/// `F` builds matrix entries from a row point `X` and a column point `Y`.
///
/// # Example
///
/// ```
/// use detmanip::DetManip;
///
/// let kernel = |x: &f64, y: &f64| -> f64 { if y >= x { 0.5 } else { -0.5 } };
/// let mut d = DetManip::new(kernel, vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
/// assert!((d.determinant() - 0.5).abs() < 1e-12);
///
/// // Propose removing row 0 / column 0 and accept it.
/// let ratio = d.try_remove(0, 0).unwrap();
/// d.commit().unwrap();
/// assert_eq!(d.size(), 2);
/// assert!((d.determinant() - 0.5 * ratio).abs() < 1e-12);
/// ```
pub struct DetManip<X, Y, T: LinalgScalar, F> {
    kernel: F,
    n: usize,
    capacity: usize,
    x_slots: Vec<X>,
    y_slots: Vec<Y>,
    /// Logical row position -> row slot.
    row_slot: Vec<usize>,
    /// Logical column position -> column slot.
    col_slot: Vec<usize>,
    /// Inverse of the slot-ordered matrix, indexed `(column slot, row slot)`.
    inv: DynMatrix<T>,
    det: T,
    pending: Option<Pending<X, Y, T>>,
    settings: DetManipSettings<T::Real>,
    ops_since_check: usize,
}

impl<X, Y, T, F> core::fmt::Debug for DetManip<X, Y, T, F>
where
    X: core::fmt::Debug,
    Y: core::fmt::Debug,
    T: LinalgScalar,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DetManip")
            .field("n", &self.n)
            .field("det", &self.det)
            .field("x_slots", &self.x_slots)
            .field("y_slots", &self.y_slots)
            .field("row_slot", &self.row_slot)
            .field("col_slot", &self.col_slot)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

/// `(-1)^k` as a scalar.
#[inline]
fn parity<T: LinalgScalar>(k: usize) -> T {
    if k % 2 == 0 {
        T::one()
    } else {
        T::one().negate()
    }
}

#[inline]
fn check_index(index: usize, bound: usize) -> Result<(), DetError> {
    if index < bound {
        Ok(())
    } else {
        Err(DetError::IndexOutOfRange { index, bound })
    }
}

#[inline]
fn check_len(expected: usize, got: usize) -> Result<(), DetError> {
    if expected == got {
        Ok(())
    } else {
        Err(DetError::SizeMismatch { expected, got })
    }
}

/// Indices that sort `v` (stable).
fn argsort(v: &[usize]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_by_key(|&l| v[l]);
    idx
}

/// Fails if a sorted index list repeats an entry.
fn check_distinct_sorted(sorted: &[usize]) -> Result<(), DetError> {
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        Err(DetError::DistinctIndexViolation)
    } else {
        Ok(())
    }
}

// ── Construction ────────────────────────────────────────────────────

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
    DetManipSettings<T::Real>: Default,
{
    /// Empty engine with storage reserved for `capacity` rows and columns.
    /// The kernel is not called.
    ///
    /// ```
    /// use detmanip::DetManip;
    /// let d = DetManip::with_capacity(|x: &f64, y: &f64| x - y, 16);
    /// assert_eq!(d.size(), 0);
    /// assert_eq!(d.determinant(), 1.0);
    /// ```
    pub fn with_capacity(kernel: F, capacity: usize) -> Self {
        Self::empty(kernel, capacity, DetManipSettings::default())
    }

    /// Engine filled with `xs` / `ys`, inverted directly (O(N^3)).
    ///
    /// Fails with [`DetError::SizeMismatch`] if the lists differ in length
    /// and with [`DetError::Singular`] if the initial matrix is singular.
    pub fn new(kernel: F, xs: Vec<X>, ys: Vec<Y>) -> Result<Self, DetError> {
        Self::with_settings(kernel, xs, ys, DetManipSettings::default())
    }
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Like [`new`](DetManip::new), with explicit settings.
    pub fn with_settings(
        kernel: F,
        xs: Vec<X>,
        ys: Vec<Y>,
        settings: DetManipSettings<T::Real>,
    ) -> Result<Self, DetError> {
        check_len(xs.len(), ys.len())?;
        let n = xs.len();
        let capacity = if n == 0 { DEFAULT_CAPACITY } else { n };
        let mut d = Self::empty(kernel, capacity, settings);
        if n == 0 {
            return Ok(d);
        }

        let m = DynMatrix::from_fn(n, n, |i, j| (d.kernel)(&xs[i], &ys[j]));
        let lu = m.lu()?;
        d.det = lu.det();
        d.inv = lu.inverse();
        d.inv.reserve_square(d.capacity);
        d.x_slots = xs;
        d.y_slots = ys;
        d.row_slot = (0..n).collect();
        d.col_slot = (0..n).collect();
        d.n = n;
        Ok(d)
    }

    fn empty(kernel: F, capacity: usize, settings: DetManipSettings<T::Real>) -> Self {
        let mut d = Self {
            kernel,
            n: 0,
            capacity: 0,
            x_slots: Vec::new(),
            y_slots: Vec::new(),
            row_slot: Vec::new(),
            col_slot: Vec::new(),
            inv: DynMatrix::zeros(0, 0, T::zero()),
            det: T::one(),
            pending: None,
            settings,
            ops_since_check: 0,
        };
        d.reserve(capacity);
        d
    }

    /// Reserve storage for at least `n` rows and columns. Growth doubles the
    /// requested size, like `Vec`.
    pub fn reserve(&mut self, n: usize) {
        if n <= self.capacity {
            return;
        }
        self.capacity = 2 * n;
        let extra = self.capacity - self.n;
        self.inv.reserve_square(self.capacity);
        self.x_slots.reserve(extra);
        self.y_slots.reserve(extra);
        self.row_slot.reserve(extra);
        self.col_slot.reserve(extra);
    }

    /// Reset to size 0 with determinant 1, dropping any pending proposal.
    pub fn clear(&mut self) {
        self.n = 0;
        self.det = T::one();
        self.pending = None;
        self.ops_since_check = 0;
        self.x_slots.clear();
        self.y_slots.clear();
        self.row_slot.clear();
        self.col_slot.clear();
        self.inv.resize_square(0);
    }

    // ── Read access ─────────────────────────────────────────────────

    /// Current size N of the matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Whether the matrix is 0x0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Signed determinant of the current matrix.
    #[inline]
    pub fn determinant(&self) -> T {
        self.det
    }

    /// Whether a proposal is waiting for `commit` or `reject`.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The kernel function.
    pub fn kernel(&self) -> &F {
        &self.kernel
    }

    pub fn settings(&self) -> &DetManipSettings<T::Real> {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DetManipSettings<T::Real>) {
        self.settings = settings;
    }

    /// Row point at logical position `i`. Panics if `i >= size()`.
    pub fn x(&self, i: usize) -> &X {
        &self.x_slots[self.row_slot[i]]
    }

    /// Column point at logical position `j`. Panics if `j >= size()`.
    pub fn y(&self, j: usize) -> &Y {
        &self.y_slots[self.col_slot[j]]
    }

    /// All row points in logical order.
    pub fn xs(&self) -> Vec<X> {
        self.row_slot.iter().map(|&s| self.x_slots[s].clone()).collect()
    }

    /// All column points in logical order.
    pub fn ys(&self) -> Vec<Y> {
        self.col_slot.iter().map(|&s| self.y_slots[s].clone()).collect()
    }

    /// `M^-1(i, j)` in logical order. Panics if out of range.
    #[inline]
    pub fn inverse_matrix_entry(&self, i: usize, j: usize) -> T {
        // (P_r A P_c)^-1 = P_c^-1 A^-1 P_r^-1: row i of the inverse is column
        // slot col_slot[i], column j is row slot row_slot[j].
        self.inv[(self.col_slot[i], self.row_slot[j])]
    }

    /// The inverse in logical order. Materializes a fresh N x N copy.
    pub fn inverse_matrix(&self) -> DynMatrix<T> {
        DynMatrix::from_fn(self.n, self.n, |i, j| self.inverse_matrix_entry(i, j))
    }

    /// The matrix in logical order, rebuilt through the kernel (N^2 calls).
    pub fn matrix(&self) -> DynMatrix<T> {
        DynMatrix::from_fn(self.n, self.n, |i, j| (self.kernel)(self.x(i), self.y(j)))
    }

    /// Whether the determinant is considered zero under
    /// [`DetManipSettings::singular_threshold`].
    pub fn is_singular(&self) -> bool {
        let m = self.det.modulus();
        match self.settings.singular_threshold {
            Some(threshold) => m < threshold,
            None => !num_traits::Float::is_normal(m),
        }
    }

    // ── Protocol ────────────────────────────────────────────────────

    fn ensure_clean(&self) -> Result<(), DetError> {
        if self.pending.is_some() {
            Err(DetError::ProtocolViolation("a proposal is already pending"))
        } else {
            Ok(())
        }
    }

    /// Apply the pending proposal.
    ///
    /// Runs the periodic drift check once
    /// [`DetManipSettings::ops_before_check`] commits have accumulated. If the
    /// updated matrix is below the singular threshold the check is skipped
    /// with a warning; the update stays applied and `Ok` is returned.
    pub fn commit(&mut self) -> Result<(), DetError> {
        let pending = self
            .pending
            .take()
            .ok_or(DetError::ProtocolViolation("commit without a pending proposal"))?;

        match pending {
            Pending::Insert(w) => self.complete_insert(w),
            Pending::InsertK(w) => self.complete_insert_k(w)?,
            Pending::Remove(w) => self.complete_remove(w),
            Pending::RemoveK(w) => self.complete_remove_k(w)?,
            Pending::ChangeRow(w) => self.complete_change_row(w),
            Pending::ChangeCol(w) => self.complete_change_col(w),
            Pending::ChangeRowCol(w) => self.complete_change_row_col(w),
            Pending::Refill(w) => self.complete_refill(w),
        }
        if self.n == 0 {
            self.det = T::one();
        }

        self.ops_since_check += 1;
        let every = self.settings.ops_before_check;
        if every > 0 && self.ops_since_check >= every {
            match self.check_inverse() {
                Err(DetError::Singular) => {
                    warn!(n = self.n, "drift check skipped: matrix below singular threshold");
                }
                other => {
                    other?;
                }
            }
        }
        Ok(())
    }

    /// Discard the pending proposal. Nothing observable changes.
    pub fn reject(&mut self) -> Result<(), DetError> {
        self.pending
            .take()
            .map(|_| ())
            .ok_or(DetError::ProtocolViolation("reject without a pending proposal"))
    }

    // ── Stabilizer ──────────────────────────────────────────────────

    /// Recompute the inverse and determinant from scratch (O(N^3)).
    ///
    /// Does not change the logical state; discards floating-point drift
    /// accumulated by fast updates.
    pub fn regenerate(&mut self) -> Result<(), DetError> {
        self.ensure_clean()?;
        let (inv, det) = self.fresh_inverse()?;
        self.install_logical_order(inv, det);
        self.ops_since_check = 0;
        Ok(())
    }

    /// Compare the maintained inverse with a freshly computed one, then
    /// install the fresh one. Returns the largest element deviation.
    ///
    /// Deviations above `precision_warning` (relative to
    /// `max |Minv + Minv_true|`) are logged; deviations above
    /// `precision_error` return [`DetError::PrecisionLoss`] after the fresh
    /// state has been installed.
    pub fn check_inverse(&mut self) -> Result<T::Real, DetError> {
        self.ensure_clean()?;
        self.ops_since_check = 0;
        let zero = <T::Real as num_traits::Zero>::zero();
        if self.n == 0 {
            return Ok(zero);
        }

        let (fresh, det) = self.fresh_inverse()?;
        let current = self.inverse_matrix();
        let deviation = current.max_abs_diff(&fresh);
        let scale = current.max_abs_sum(&fresh);
        self.install_logical_order(fresh, det);

        let to_f64 = |r: T::Real| num_traits::ToPrimitive::to_f64(&r).unwrap_or(f64::NAN);
        let warn_bound = self.settings.precision_warning * scale;
        let error_bound = self.settings.precision_error * scale;
        if !(deviation < error_bound) {
            error!(
                n = self.n,
                deviation = to_f64(deviation),
                bound = to_f64(error_bound),
                "inverse deviation above error threshold"
            );
            return Err(DetError::PrecisionLoss {
                deviation: to_f64(deviation),
                bound: to_f64(error_bound),
            });
        }
        if !(deviation < warn_bound) {
            warn!(
                n = self.n,
                deviation = to_f64(deviation),
                bound = to_f64(warn_bound),
                "inverse deviation above warning threshold"
            );
        }
        Ok(deviation)
    }

    /// Inverse (logical order) and determinant of the current matrix by LU.
    fn fresh_inverse(&self) -> Result<(DynMatrix<T>, T), DetError> {
        let lu = self.matrix().lu()?;
        let det = lu.det();
        let m = det.modulus();
        let singular = match self.settings.singular_threshold {
            Some(threshold) => m < threshold,
            None => !num_traits::Float::is_normal(m),
        };
        if singular {
            return Err(DetError::Singular);
        }
        Ok((lu.inverse(), det))
    }

    /// Store points in logical order and adopt `inv` / `det` for them.
    fn install_logical_order(&mut self, mut inv: DynMatrix<T>, det: T) {
        let n = self.n;
        self.x_slots = self.xs();
        self.y_slots = self.ys();
        for (i, (r, c)) in self.row_slot.iter_mut().zip(self.col_slot.iter_mut()).enumerate() {
            *r = i;
            *c = i;
        }
        inv.reserve_square(self.capacity);
        self.inv = inv;
        self.det = det;
        debug!(n, "state regenerated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn step(x: &f64, y: &f64) -> f64 {
        if y >= x {
            0.5
        } else {
            -0.5
        }
    }

    /// Totally positive: every minor with increasing points is nonzero.
    pub(crate) fn gauss(x: &f64, y: &f64) -> f64 {
        (-(x - y) * (x - y)).exp()
    }

    pub(crate) fn assert_consistent<F: Fn(&f64, &f64) -> f64>(d: &DetManip<f64, f64, f64, F>, tol: f64) {
        let m = d.matrix();
        let id = &m * &d.inverse_matrix();
        for i in 0..d.size() {
            for j in 0..d.size() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((id[(i, j)] - expected).abs() < tol, "M*Minv[({},{})] = {}", i, j, id[(i, j)]);
            }
        }
        assert!((d.determinant() - m.det()).abs() < tol, "det {} vs {}", d.determinant(), m.det());
    }

    #[test]
    fn construct_from_points() {
        let d = DetManip::new(step, vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(d.size(), 3);
        assert!((d.determinant() - 0.5).abs() < 1e-12);
        assert_consistent(&d, 1e-12);
    }

    #[test]
    fn construct_size_mismatch() {
        let err = DetManip::new(step, vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(err, DetError::SizeMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn construct_singular() {
        let err = DetManip::new(|x: &f64, _y: &f64| *x, vec![1.0, 2.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, DetError::Singular);
    }

    #[test]
    fn construct_empty_lists() {
        let d = DetManip::new(step, vec![], vec![]).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.determinant(), 1.0);
        assert_eq!(d.inverse_matrix().nrows(), 0);
    }

    #[test]
    fn with_capacity_does_not_call_kernel() {
        let d = DetManip::with_capacity(
            |_x: &f64, _y: &f64| -> f64 { panic!("kernel called") },
            8,
        );
        assert_eq!(d.size(), 0);
        assert!(d.inv.capacity() >= 16 * 16);
    }

    #[test]
    fn commit_and_reject_need_a_proposal() {
        let mut d = DetManip::with_capacity(step, 4);
        assert!(matches!(d.commit(), Err(DetError::ProtocolViolation(_))));
        assert!(matches!(d.reject(), Err(DetError::ProtocolViolation(_))));
    }

    #[test]
    fn second_try_is_a_protocol_violation() {
        let mut d = DetManip::with_capacity(step, 4);
        d.try_insert(0, 0, 1.0, 1.0).unwrap();
        assert!(matches!(d.try_insert(0, 0, 2.0, 2.0), Err(DetError::ProtocolViolation(_))));
        assert!(matches!(d.regenerate(), Err(DetError::ProtocolViolation(_))));
        d.reject().unwrap();
        assert!(!d.has_pending());
    }

    #[test]
    fn regenerate_normalizes_storage() {
        let mut d = DetManip::new(step, vec![1.0, 2.0, 3.0], vec![1.5, 2.5, 3.5]).unwrap();
        d.insert(1, 2, 2.7, 2.8).unwrap();
        d.swap_row(0, 3).unwrap();
        let det = d.determinant();
        let m = d.matrix();
        d.regenerate().unwrap();
        assert_eq!(d.row_slot, vec![0, 1, 2, 3]);
        assert_eq!(d.col_slot, vec![0, 1, 2, 3]);
        assert_eq!(d.matrix(), m);
        assert!((d.determinant() - det).abs() < 1e-12);
        assert_consistent(&d, 1e-12);
    }

    #[test]
    fn singular_threshold() {
        let mut d = DetManip::new(|x: &f64, y: &f64| x * y, vec![1e-3], vec![1e-3]).unwrap();
        assert!(!d.is_singular());
        d.set_settings(DetManipSettings {
            singular_threshold: Some(1e-3),
            ..DetManipSettings::default()
        });
        assert!(d.is_singular());
        assert_eq!(d.regenerate().unwrap_err(), DetError::Singular);
    }

    #[test]
    fn check_inverse_reports_deviation() {
        let mut d = DetManip::new(step, vec![1.0, 2.0, 3.0], vec![1.5, 2.5, 3.5]).unwrap();
        d.inv[(0, 0)] += 1e-10;
        let dev = d.check_inverse().unwrap();
        assert!(dev > 0.5e-10 && dev < 2e-10);
        // The fresh inverse has been installed.
        assert_eq!(d.check_inverse().unwrap(), 0.0);
    }

    #[test]
    fn check_inverse_flags_corruption() {
        let mut d = DetManip::new(step, vec![1.0, 2.0, 3.0], vec![1.5, 2.5, 3.5]).unwrap();
        d.inv[(1, 2)] += 1.0;
        assert!(matches!(d.check_inverse(), Err(DetError::PrecisionLoss { .. })));
        assert_consistent(&d, 1e-12);
    }

    #[test]
    fn periodic_check_runs_from_commit() {
        let settings = DetManipSettings {
            ops_before_check: 2,
            ..DetManipSettings::default()
        };
        let mut d = DetManip::with_settings(step, vec![1.0, 2.0], vec![1.5, 2.5], settings).unwrap();
        d.inv[(0, 1)] += 1.0;
        d.change_col(0, 1.2).unwrap();
        let err = d.change_col(0, 1.7);
        assert!(matches!(err, Err(DetError::PrecisionLoss { .. })));
        assert_consistent(&d, 1e-12);
    }

    #[test]
    fn periodic_check_keeps_near_singular_commit() {
        let settings = DetManipSettings {
            ops_before_check: 1,
            singular_threshold: Some(0.5),
            ..DetManipSettings::default()
        };
        let mut d = DetManip::with_settings(gauss, vec![0.0], vec![0.0], settings).unwrap();
        let r = d.try_insert(1, 1, 0.1, 0.1).unwrap();
        d.commit().unwrap();
        assert_eq!(d.size(), 2);
        assert_eq!(d.xs(), vec![0.0, 0.1]);
        assert!((d.determinant() - r).abs() < 1e-12);
        assert_consistent(&d, 1e-8);

        let r = d.insert_at_end(5.0, 5.0).unwrap();
        assert_eq!(d.size(), 3);
        assert!(r != 0.0);
    }

    #[test]
    fn regenerate_resets_check_counter() {
        let settings = DetManipSettings {
            ops_before_check: 2,
            ..DetManipSettings::default()
        };
        let mut d = DetManip::with_settings(step, vec![1.0, 2.0], vec![1.5, 2.5], settings).unwrap();
        d.change_col(0, 1.2).unwrap();
        assert_eq!(d.ops_since_check, 1);
        d.regenerate().unwrap();
        assert_eq!(d.ops_since_check, 0);
        d.inv[(0, 1)] += 1.0;
        // One commit after regenerate: no check yet, corruption survives.
        d.change_col(0, 1.7).unwrap();
        assert_eq!(d.ops_since_check, 1);
        assert!(matches!(d.check_inverse(), Err(DetError::PrecisionLoss { .. })));
    }

    #[test]
    fn clear_resets() {
        let mut d = DetManip::new(step, vec![1.0, 2.0], vec![1.5, 2.5]).unwrap();
        d.try_remove(0, 0).unwrap();
        d.clear();
        assert!(d.is_empty());
        assert!(!d.has_pending());
        assert_eq!(d.determinant(), 1.0);
        d.insert_at_end(1.0, 2.0).unwrap();
        assert_eq!(d.determinant(), 0.5);
    }
}
