use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hexpi::{extract_hex_digits, CpuBackend};

fn bench_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_worker_scaling");
    group.sample_size(10);

    for workers in [1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let mut backend = CpuBackend::new(workers, 5_000);
                    black_box(extract_hex_digits(&mut backend, 200_000).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_digit_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("digit_depth");
    group.sample_size(10);

    for d in [1_000u64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(d), &d, |b, &d| {
            b.iter(|| {
                let mut backend = CpuBackend::new(4, 5_000);
                black_box(extract_hex_digits(&mut backend, d).unwrap())
            });
        });
    }

    group.finish();
}

#[cfg(feature = "cuda")]
fn bench_gpu_extraction(c: &mut Criterion) {
    use hexpi::{CudaBackend, GpuGeometry};

    let mut group = c.benchmark_group("gpu_extraction");
    group.sample_size(10);

    for d in [100_000u64, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(d), &d, |b, &d| {
            b.iter(|| {
                let mut backend = CudaBackend::new(0, GpuGeometry::default()).unwrap();
                black_box(extract_hex_digits(&mut backend, d).unwrap())
            });
        });
    }

    group.finish();
}

#[cfg(feature = "cuda")]
criterion_group!(
    benches,
    bench_worker_scaling,
    bench_digit_depth,
    bench_gpu_extraction
);

#[cfg(not(feature = "cuda"))]
criterion_group!(benches, bench_worker_scaling, bench_digit_depth);

criterion_main!(benches);
