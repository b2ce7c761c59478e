use tracing::trace;

use crate::traits::LinalgScalar;

use super::{check_index, parity, DetError, DetManip};

/// Cyclic shift applied by [`DetManip::roll_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollDirection {
    #[default]
    None,
    /// First row moves to the end.
    Up,
    /// Last row moves to the front.
    Down,
    /// First column moves to the end.
    Left,
    /// Last column moves to the front.
    Right,
}

impl<X, Y, T, F> DetManip<X, Y, T, F>
where
    X: Clone,
    Y: Clone,
    T: LinalgScalar,
    F: Fn(&X, &Y) -> T,
{
    /// Cyclically shift rows or columns by one. Only the lookup tables move.
    ///
    /// Returns the sign applied to the determinant, `(-1)^(N-1)` (1 for
    /// [`RollDirection::None`] and for N <= 1).
    ///
    /// ```
    /// use detmanip::{DetManip, RollDirection};
    ///
    /// let kernel = |x: &f64, y: &f64| (-(x - y) * (x - y)).exp();
    /// let mut d = DetManip::new(kernel, vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
    /// let det = d.determinant();
    /// assert_eq!(d.roll_matrix(RollDirection::Up).unwrap(), -1.0);
    /// assert_eq!(d.xs(), vec![1.0, 0.0]);
    /// assert_eq!(d.determinant(), -det);
    /// ```
    pub fn roll_matrix(&mut self, direction: RollDirection) -> Result<T, DetError> {
        self.ensure_clean()?;
        if self.n <= 1 || direction == RollDirection::None {
            return Ok(T::one());
        }
        match direction {
            RollDirection::Up => self.row_slot.rotate_left(1),
            RollDirection::Down => self.row_slot.rotate_right(1),
            RollDirection::Left => self.col_slot.rotate_left(1),
            RollDirection::Right => self.col_slot.rotate_right(1),
            RollDirection::None => {}
        }
        let sign = parity::<T>(self.n - 1);
        self.det = self.det * sign;
        trace!(?direction, n = self.n, "rolled");
        Ok(sign)
    }

    /// Exchange rows `i` and `j`.
    pub fn swap_row(&mut self, i: usize, j: usize) -> Result<(), DetError> {
        self.ensure_clean()?;
        check_index(i, self.n)?;
        check_index(j, self.n)?;
        if i != j {
            self.row_slot.swap(i, j);
            self.det = self.det.negate();
        }
        Ok(())
    }

    /// Exchange columns `i` and `j`.
    pub fn swap_col(&mut self, i: usize, j: usize) -> Result<(), DetError> {
        self.ensure_clean()?;
        check_index(i, self.n)?;
        check_index(j, self.n)?;
        if i != j {
            self.col_slot.swap(i, j);
            self.det = self.det.negate();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::det::tests::{assert_consistent, gauss};

    fn base(n: usize) -> DetManip<f64, f64, f64, fn(&f64, &f64) -> f64> {
        let xs: Vec<f64> = (0..n).map(|k| k as f64).collect();
        let ys: Vec<f64> = (0..n).map(|k| k as f64 + 0.5).collect();
        DetManip::new(gauss as fn(&f64, &f64) -> f64, xs, ys).unwrap()
    }

    #[test]
    fn roll_up_n_times_is_identity() {
        let mut d = base(4);
        let xs = d.xs();
        let det = d.determinant();
        for _ in 0..4 {
            assert_eq!(d.roll_matrix(RollDirection::Up).unwrap(), -1.0);
            assert_consistent(&d, 1e-10);
        }
        assert_eq!(d.xs(), xs);
        assert_eq!(d.determinant(), det);
    }

    #[test]
    fn roll_down_undoes_roll_up() {
        let mut d = base(3);
        let inv = d.inverse_matrix();
        assert_eq!(d.roll_matrix(RollDirection::Up).unwrap(), 1.0);
        assert_eq!(d.xs(), vec![1.0, 2.0, 0.0]);
        d.roll_matrix(RollDirection::Down).unwrap();
        assert_eq!(d.inverse_matrix(), inv);
    }

    #[test]
    fn roll_columns() {
        let mut d = base(4);
        let det = d.determinant();
        d.roll_matrix(RollDirection::Right).unwrap();
        assert_eq!(d.ys(), vec![3.5, 0.5, 1.5, 2.5]);
        assert_eq!(d.determinant(), -det);
        assert_consistent(&d, 1e-10);
        d.roll_matrix(RollDirection::Left).unwrap();
        assert_eq!(d.ys(), vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(d.determinant(), det);
    }

    #[test]
    fn roll_trivial_cases() {
        let mut d = base(1);
        assert_eq!(d.roll_matrix(RollDirection::Up).unwrap(), 1.0);
        let mut d = base(3);
        let xs = d.xs();
        assert_eq!(d.roll_matrix(RollDirection::None).unwrap(), 1.0);
        assert_eq!(d.xs(), xs);
    }

    #[test]
    fn roll_while_pending_is_rejected() {
        let mut d = base(3);
        d.try_remove(0, 0).unwrap();
        assert!(matches!(d.roll_matrix(RollDirection::Up), Err(DetError::ProtocolViolation(_))));
        assert!(matches!(d.swap_row(0, 1), Err(DetError::ProtocolViolation(_))));
    }

    #[test]
    fn swaps_negate_determinant() {
        let mut d = base(3);
        let det = d.determinant();
        d.swap_row(0, 2).unwrap();
        assert_eq!(d.xs(), vec![2.0, 1.0, 0.0]);
        assert_eq!(d.determinant(), -det);
        d.swap_col(1, 1).unwrap();
        assert_eq!(d.determinant(), -det);
        d.swap_col(0, 1).unwrap();
        assert_eq!(d.determinant(), det);
        assert_consistent(&d, 1e-10);
        assert_eq!(d.swap_row(0, 3).unwrap_err(), DetError::IndexOutOfRange { index: 3, bound: 3 });
    }
}
