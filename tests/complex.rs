#![cfg(feature = "complex")]

use detmanip::{DetManip, DynMatrix, LinalgScalar, RollDirection};
use num_complex::Complex;

type C = Complex<f64>;

const TOL: f64 = 1e-10;

fn c(re: f64, im: f64) -> C {
    Complex::new(re, im)
}

/// Plane-wave overlap with a Gaussian envelope.
fn wave(x: &f64, y: &f64) -> C {
    let d = x - y;
    let env = (-0.5 * d * d).exp();
    c(env * (1.3 * d).cos(), env * (1.3 * (x + 0.7 * y)).sin())
}

fn assert_complex_near(a: C, b: C, tol: f64, msg: &str) {
    assert!((a - b).norm() < tol, "{}: {:?} vs {:?}", msg, a, b);
}

fn assert_matches_oracle<F: Fn(&f64, &f64) -> C>(d: &DetManip<f64, f64, C, F>, msg: &str) {
    let m = d.matrix();
    let id = &m * &d.inverse_matrix();
    let eye = DynMatrix::eye(d.size(), c(0.0, 0.0));
    assert!(id.max_abs_diff(&eye) < TOL, "{}: M*Minv off identity by {}", msg, id.max_abs_diff(&eye));
    assert_complex_near(d.determinant(), m.det(), TOL * m.det().modulus().max(1.0), msg);
}

// ── Construction ─────────────────────────────────────────────────────

#[test]
fn complex_construct() {
    let d = DetManip::new(wave, vec![0.0, 1.0, 2.0], vec![0.3, 1.4, 2.2]).unwrap();
    assert_eq!(d.size(), 3);
    assert!(d.determinant().im != 0.0);
    assert_matches_oracle(&d, "construct");
}

#[test]
fn complex_single_entry_inverse() {
    let mut d = DetManip::with_capacity(|_x: &f64, _y: &f64| c(0.0, 2.0), 4);
    let r = d.insert_at_end(0.0, 0.0).unwrap();
    assert_complex_near(r, c(0.0, 2.0), TOL, "ratio");
    assert_complex_near(d.inverse_matrix_entry(0, 0), c(0.0, -0.5), TOL, "inverse");
}

// ── Updates ──────────────────────────────────────────────────────────

#[test]
fn complex_insert_remove() {
    let mut d = DetManip::new(wave, vec![0.0, 1.0, 2.0], vec![0.3, 1.4, 2.2]).unwrap();
    let det0 = d.determinant();
    let r = d.insert(1, 0, 0.6, 2.9).unwrap();
    assert_complex_near(d.determinant(), det0 * r, TOL, "det after insert");
    assert_matches_oracle(&d, "insert");

    let r = d.insert2(0, 4, 2, 3, 3.1, 1.7, 0.9, 3.6).unwrap();
    assert_eq!(d.size(), 6);
    assert_matches_oracle(&d, "insert2");
    let r2 = d.remove2(0, 4, 2, 3).unwrap();
    assert_complex_near(r * r2, c(1.0, 0.0), 1e-8, "insert2 then remove2");

    d.remove(1, 0).unwrap();
    assert_eq!(d.xs(), vec![0.0, 1.0, 2.0]);
    assert_complex_near(d.determinant(), det0, 1e-8, "round trip");
}

#[test]
fn complex_changes() {
    let mut d = DetManip::new(wave, vec![0.0, 1.0, 2.0, 3.0], vec![0.3, 1.4, 2.2, 3.5]).unwrap();
    d.change_row(2, 2.4).unwrap();
    assert_matches_oracle(&d, "change_row");
    d.change_col(0, -0.2).unwrap();
    assert_matches_oracle(&d, "change_col");
    d.change_one_row_and_one_col(3, 1, 2.8, 1.1).unwrap();
    assert_matches_oracle(&d, "change_one_row_and_one_col");
}

#[test]
fn complex_roll_and_regenerate() {
    let mut d = DetManip::new(wave, vec![0.0, 1.0, 2.0, 3.0], vec![0.3, 1.4, 2.2, 3.5]).unwrap();
    let det = d.determinant();
    let s = d.roll_matrix(RollDirection::Left).unwrap();
    assert_eq!(s, c(-1.0, 0.0));
    assert_complex_near(d.determinant(), -det, TOL, "rolled det");
    d.regenerate().unwrap();
    assert_matches_oracle(&d, "regenerate");
    assert!(d.check_inverse().unwrap() < TOL);
}
