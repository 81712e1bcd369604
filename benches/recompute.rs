#[macro_use]
extern crate criterion;
extern crate newton_fractal;

use criterion::Criterion;
use newton_fractal::{FractalConfig, FractalImage, Polynomial};

fn cube_roots(c: &mut Criterion) {
    c.bench_function("recompute 200x200, 3 roots", |b| {
        let mut fractal = FractalImage::new(FractalConfig {
            width: 200,
            height: 200,
            ..FractalConfig::default()
        })
        .unwrap();
        b.iter(|| fractal.recompute().unwrap())
    });
}

fn many_roots(c: &mut Criterion) {
    c.bench_function("recompute 200x200, 12 roots", |b| {
        let mut fractal = FractalImage::new(FractalConfig {
            width: 200,
            height: 200,
            roots: Polynomial::roots_of_unity(12),
            ..FractalConfig::default()
        })
        .unwrap();
        b.iter(|| fractal.recompute().unwrap())
    });
}

criterion_group!(benches, cube_roots, many_roots);
criterion_main!(benches);
