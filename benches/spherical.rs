use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use twopower::spherical::{Dehnen, Hernquist, Nfw, Path, Quantity, TwoPowerSpherical};
use twopower::AxisymmetricPotential;

/// Single-point benchmarks
fn bench_spherical_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("single");

    let (radius, height) = (0.8, 0.3);

    let hernquist = Hernquist::new(1.0, 1.0);
    group.bench_function("Hernquist", |b| {
        b.iter(|| hernquist.potential(black_box(radius), black_box(height)))
    });

    group.bench_function("Hernquist_general", |b| {
        b.iter(|| {
            hernquist.evaluate(
                Quantity::Potential,
                black_box(radius),
                black_box(height),
                Path::General,
            )
        })
    });

    let nfw = Nfw::new(1.0, 1.0);
    group.bench_function("NFW", |b| {
        b.iter(|| nfw.potential(black_box(radius), black_box(height)))
    });

    let dehnen = Dehnen::new(1.0, 1.0, 1.5);
    group.bench_function("Dehnen", |b| {
        b.iter(|| dehnen.potential(black_box(radius), black_box(height)))
    });

    let integer = TwoPowerSpherical::new(1.0, 1.0, 0.0, 5.0);
    group.bench_function("integer_0_5", |b| {
        b.iter(|| integer.potential(black_box(radius), black_box(height)))
    });

    let general = TwoPowerSpherical::new(1.0, 1.0, 0.5, 3.7);
    group.bench_function("general", |b| {
        b.iter(|| general.potential(black_box(radius), black_box(height)))
    });
    group.bench_function("general_second_derivative", |b| {
        b.iter(|| general.radial_second_derivative(black_box(radius), black_box(height)))
    });

    group.finish();
}

/// Generate cylindrical radii for batch benchmarks
fn generate_radii(n: usize, scale_radius: f64) -> Vec<f64> {
    (0..n)
        .map(|i| scale_radius * (0.01 + 20.0 * (i as f64) / (n as f64)))
        .collect()
}

/// Batch benchmarks over a radial grid
fn bench_spherical_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");

    let n_points = 10000;
    let height = 0.1;
    let radii = generate_radii(n_points, 1.0);

    let profiles: Vec<(&str, Box<dyn AxisymmetricPotential>)> = vec![
        ("Hernquist", Box::new(Hernquist::new(1.0, 1.0))),
        ("NFW", Box::new(Nfw::new(1.0, 1.0))),
        ("Dehnen", Box::new(Dehnen::new(1.0, 1.0, 1.5))),
        (
            "general",
            Box::new(TwoPowerSpherical::new(1.0, 1.0, 0.5, 3.7)),
        ),
    ];

    for (name, profile) in &profiles {
        group.bench_with_input(BenchmarkId::new(*name, n_points), &radii, |b, radii| {
            b.iter(|| {
                radii
                    .iter()
                    .map(|&radius| profile.radial_force(radius, height))
                    .sum::<f64>()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spherical_single, bench_spherical_batch);
criterion_main!(benches);
