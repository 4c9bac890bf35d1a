use hexpi::series::{left_term, right_tail, FracSum};
use hexpi::{reduce_series, CpuBackend};

// Chunked parallel reduction must agree with a single serial accumulation
// over the same range, no matter how the range is partitioned. Agreement
// is within a floating-point tolerance: the fold reorders additions, and
// f64 addition is not associative.

const TOLERANCE: f64 = 1e-9;

fn serial_reference(j: u32, d: u64) -> f64 {
    let mut sum = FracSum::default();
    for k in 0..d {
        sum.push(left_term(j, d, k));
    }
    sum.push(right_tail(j, d));
    sum.value()
}

#[test]
fn reduction_is_independent_of_partitioning() {
    let d = 50_000;
    let partitionings = [(1usize, 500u64), (2, 1_000), (4, 999), (7, 1_024), (3, 20_000)];

    for j in [1, 4, 5, 6] {
        let expected = serial_reference(j, d);
        for &(workers, chunk_len) in &partitionings {
            let mut backend = CpuBackend::new(workers, chunk_len);
            let got = reduce_series(&mut backend, j, d).expect("reduction failed");
            assert!(
                (got - expected).abs() < TOLERANCE,
                "j={j} workers={workers} chunk_len={chunk_len}: {got} vs serial {expected}"
            );
        }
    }
}

#[test]
fn wave_and_serial_paths_meet_at_the_seam() {
    // Pick sizes where the last wave does not quite fit, forcing a long
    // serial remainder after several full waves.
    let d = 10_007;
    for j in [1, 6] {
        let expected = serial_reference(j, d);
        let mut backend = CpuBackend::new(3, 1_000);
        let got = reduce_series(&mut backend, j, d).expect("reduction failed");
        assert!(
            (got - expected).abs() < TOLERANCE,
            "j={j}: {got} vs serial {expected}"
        );
    }
}

#[test]
fn single_worker_wave_matches_serial_closely() {
    // One worker per wave keeps the fold order identical to the serial
    // walk, so the partial-sum route should land within tight tolerance.
    let d = 20_000;
    let expected = serial_reference(1, d);
    let mut backend = CpuBackend::new(1, 4_000);
    let got = reduce_series(&mut backend, 1, d).expect("reduction failed");
    assert!((got - expected).abs() < TOLERANCE, "{got} vs {expected}");
}
