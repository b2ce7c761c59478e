//! # detmanip
//!
//! Incremental determinant and inverse maintenance for matrices built from a
//! kernel function, `M(i, j) = F(x[i], y[j])`. Written for continuous-time
//! quantum Monte Carlo samplers, which propose many small changes (add or
//! remove a row and column, replace a point) and need `det(new) / det(old)`
//! for each one in O(N^2) rather than O(N^3).
//!
//! ## Quick start
//!
//! ```
//! use detmanip::DetManip;
//!
//! let kernel = |x: &f64, y: &f64| (-(x - y) * (x - y)).exp();
//! let mut d = DetManip::new(kernel, vec![0.0, 1.0], vec![0.2, 1.1]).unwrap();
//!
//! // Propose adding a third row/column; accept it only if the ratio is large.
//! let ratio = d.try_insert(2, 2, 2.0, 2.4).unwrap();
//! if ratio.abs() > 0.1 {
//!     d.commit().unwrap();
//! } else {
//!     d.reject().unwrap();
//! }
//! assert_eq!(d.size(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`det`]: The [`DetManip`] engine: propose/commit/reject protocol for
//!   single and k-row insertions and removals, rank-1 row or column changes,
//!   a rank-2 row-and-column change, full refills, cyclic rolls and swaps.
//!   Configured with [`DetManipSettings`]; errors are [`DetError`].
//!
//! - [`dynmatrix`]: Heap-allocated column-major `DynMatrix<T>` with in-place
//!   square resizing, row/column swaps and the rank-k update kernels the
//!   engine is built on. `DynLu` wraps the LU factorization.
//!
//! - [`linalg`]: LU decomposition with partial pivoting as free functions on
//!   `&mut impl MatrixMut<T>`, used for construction and regeneration.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`]: real floats, used for tolerances and thresholds
//!   - [`LinalgScalar`]: real floats and complex numbers, the element type of the engine
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for algorithms
//!
//! ## Logging
//!
//! Committed operations are reported through [`tracing`] at `trace` level,
//! refills and regenerations at `debug`. The periodic drift check logs at
//! `warn` / `error`. No subscriber is installed by the library.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `complex` | no       | `Complex<f32>` / `Complex<f64>` kernels via `num-complex` |
//! | `all`     | no       | All features |

pub mod det;
pub mod dynmatrix;
pub mod linalg;
pub mod traits;

pub use det::{DetError, DetManip, DetManipSettings, RollDirection};
pub use dynmatrix::{DynLu, DynMatrix};
pub use traits::{FloatScalar, LinalgScalar, MatrixMut, MatrixRef, Scalar};

#[cfg(feature = "complex")]
pub use num_complex::Complex;
