//! Wave-based parallel reduction of one series.

use tracing::debug;

use crate::backend::Backend;
use crate::error::EngineError;
use crate::series::{left_term, right_tail, FracSum};

/// Computes S_j(d) mod 1 for one of the four series constants.
///
/// The left range [0, d) is walked in waves. While a full wave still fits
/// strictly below d, the backend runs it and the per-worker partials are
/// folded into the running sum in reverse-dispatch order (last worker
/// first). Floating-point addition is not associative, so that order is
/// part of the result's definition: keep it fixed across backends or
/// bit-for-bit reproducibility is gone.
///
/// The remainder that no longer fills a wave is finished serially, then
/// the right-regime tail is summed and folded in.
pub fn reduce_series<B: Backend>(backend: &mut B, j: u32, d: u64) -> Result<f64, EngineError> {
    let span = backend.wave_span();
    let mut sum = FracSum::default();
    let mut waves = 0u64;
    let mut k = 0u64;

    while k < d {
        if k + span < d {
            let partials = backend.run_wave(j, d, k)?;
            for &partial in partials.iter().rev() {
                sum.push(partial);
            }
            waves += 1;
            k += span;
        } else {
            sum.push(left_term(j, d, k));
            k += 1;
        }
    }

    debug!(j, d, waves, "left regime reduced, folding tail");
    sum.push(right_tail(j, d));
    Ok(sum.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn empty_left_range_still_sums_tail() {
        // d = 0: the left loop runs zero iterations and the result is the
        // tail alone.
        let mut backend = CpuBackend::new(2, 100);
        let got = reduce_series(&mut backend, 1, 0).unwrap();
        let expected = right_tail(1, 0);
        assert_eq!(got, expected);
    }

    #[test]
    fn serial_remainder_path_matches_term_loop() {
        // d smaller than one wave span: every term goes through the serial
        // path.
        let (j, d) = (5, 1_000);
        let mut backend = CpuBackend::new(8, 1_000);
        let got = reduce_series(&mut backend, j, d).unwrap();

        let mut expected = FracSum::default();
        for k in 0..d {
            expected.push(left_term(j, d, k));
        }
        expected.push(right_tail(j, d));
        assert_eq!(got, expected.value());
    }
}
