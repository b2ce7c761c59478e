/// Numerical hygiene settings for a [`DetManip`](crate::DetManip).
///
/// ```
/// use detmanip::DetManipSettings;
///
/// let settings = DetManipSettings {
///     ops_before_check: 0,
///     ..DetManipSettings::<f64>::default()
/// };
/// assert_eq!(settings.precision_error, 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetManipSettings<R> {
    /// `|det|` below this counts as singular. `None` (default) means
    /// "not a normal float": zero, subnormal, infinite or NaN.
    pub singular_threshold: Option<R>,
    /// Number of commits between automatic comparisons of the maintained
    /// inverse with a fresh one (default: 100). `0` disables the check.
    pub ops_before_check: usize,
    /// Relative deviation that triggers a warning (default: 1e-8).
    pub precision_warning: R,
    /// Relative deviation that is reported as
    /// [`DetError::PrecisionLoss`](crate::DetError::PrecisionLoss)
    /// (default: 1e-5).
    pub precision_error: R,
}

impl Default for DetManipSettings<f64> {
    fn default() -> Self {
        Self {
            singular_threshold: None,
            ops_before_check: 100,
            precision_warning: 1e-8,
            precision_error: 1e-5,
        }
    }
}

impl Default for DetManipSettings<f32> {
    fn default() -> Self {
        Self {
            singular_threshold: None,
            ops_before_check: 100,
            precision_warning: 1e-4,
            precision_error: 1e-2,
        }
    }
}
