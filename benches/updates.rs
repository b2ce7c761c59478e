use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use detmanip::{DetManip, RollDirection};

// ---------------------------------------------------------------------------
// Helpers: a well-conditioned kernel and evenly spread points
// ---------------------------------------------------------------------------

const BETA: f64 = 10.0;

fn green(x: &f64, y: &f64) -> f64 {
    let tau = x - y;
    let tau = if tau > 0.0 { tau } else { BETA + tau };
    let r = 0.1 + tau / BETA * 0.8;
    -2.0 * (std::f64::consts::PI / BETA) / (std::f64::consts::PI * r).sin()
}

fn points(n: usize, shift: f64) -> Vec<f64> {
    (0..n).map(|k| (k as f64 + shift) * BETA / n as f64).collect()
}

fn engine(n: usize) -> DetManip<f64, f64, f64, fn(&f64, &f64) -> f64> {
    DetManip::new(green as fn(&f64, &f64) -> f64, points(n, 0.25), points(n, 0.5)).unwrap()
}

const SIZES: [usize; 3] = [16, 64, 128];

// ---------------------------------------------------------------------------
// Fast updates
// ---------------------------------------------------------------------------

fn insert_remove(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert_remove");
    for n in SIZES {
        g.bench_with_input(BenchmarkId::new("fast", n), &n, |b, &n| {
            let mut d = engine(n);
            b.iter(|| {
                d.insert(n / 2, n / 3, 0.37, 0.81).unwrap();
                d.remove(n / 2, n / 3).unwrap();
            })
        });
    }
    g.finish();
}

fn try_reject(c: &mut Criterion) {
    let mut g = c.benchmark_group("try_insert_reject");
    for n in SIZES {
        g.bench_with_input(BenchmarkId::new("fast", n), &n, |b, &n| {
            let mut d = engine(n);
            b.iter(|| {
                let r = d.try_insert(n / 2, n / 3, 0.37, 0.81).unwrap();
                d.reject().unwrap();
                std::hint::black_box(r)
            })
        });
    }
    g.finish();
}

fn change_row_col(c: &mut Criterion) {
    let mut g = c.benchmark_group("change_row_col");
    for n in SIZES {
        g.bench_with_input(BenchmarkId::new("fast", n), &n, |b, &n| {
            let mut d = engine(n);
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let x = if flip { 0.37 } else { 0.25 * BETA / n as f64 };
                d.try_change_row_col(0, 0, x, 0.5 * BETA / n as f64).unwrap();
                d.commit().unwrap();
            })
        });
    }
    g.finish();
}

fn roll(c: &mut Criterion) {
    let mut g = c.benchmark_group("roll");
    for n in SIZES {
        g.bench_with_input(BenchmarkId::new("fast", n), &n, |b, &n| {
            let mut d = engine(n);
            b.iter(|| d.roll_matrix(RollDirection::Up).unwrap())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Full recomputation baseline
// ---------------------------------------------------------------------------

fn regenerate(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert_remove");
    for n in SIZES {
        g.bench_with_input(BenchmarkId::new("regenerate", n), &n, |b, &n| {
            let mut d = engine(n);
            b.iter(|| d.regenerate().unwrap())
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------

criterion_group!(benches, insert_remove, try_reject, change_row_col, roll, regenerate);
criterion_main!(benches);
