//! Term evaluation for the four BBP series S_j(d), j in {1, 4, 5, 6}.
//!
//! Each series splits at k = d. Below the split ("left") the scaled term
//! 16^(d-k)/(8k+j) would overflow, so its numerator is computed modulo the
//! denominator. At and above the split ("right") the terms are proper
//! fractions that shrink by a factor of 16 per step and are summed
//! directly until they drop below [`TAIL_EPSILON`].

use crate::config::{TAIL_EPSILON, TAIL_SPAN};
use crate::modpow::pow16_mod;

/// Running sum kept in [0, 1) by subtracting the integer part after every
/// addition.
///
/// Only the fractional part of the series carries the digits, and dropping
/// the integer part at each step is what keeps f64 precision concentrated
/// where it matters. The reduction rule is exact, not cosmetic; do not
/// batch additions before reducing.
#[derive(Clone, Copy, Debug, Default)]
pub struct FracSum(f64);

impl FracSum {
    /// Adds a term and reduces the sum modulo 1.
    pub fn push(&mut self, term: f64) {
        self.0 += term;
        self.0 -= self.0.floor();
    }

    /// The accumulated fractional value.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// One left-regime term: (16^(d-k) mod (8k+j)) / (8k+j), for k <= d.
///
/// Always a proper fraction, so repeated accumulation under the modulo-1
/// rule never loses the fractional signal to overflow.
pub fn left_term(j: u32, d: u64, k: u64) -> f64 {
    debug_assert!(k <= d);
    let denominator = (8 * k + u64::from(j)) as f64;
    pow16_mod(d - k, denominator) / denominator
}

/// One right-regime term: 16^(d-k) / (8k+j), for k >= d.
///
/// The exponent is non-positive, so the power is at most 1 and direct
/// floating-point evaluation is safe.
pub fn right_term(j: u32, d: u64, k: u64) -> f64 {
    debug_assert!(k >= d);
    let denominator = (8 * k + u64::from(j)) as f64;
    16f64.powi(-((k - d) as i32)) / denominator
}

/// Serial sum of left-regime terms over `[k_start, k_start + len)`.
///
/// This is the per-worker unit of work on every backend; the CUDA kernel
/// is a transliteration of this loop.
pub fn left_chunk(j: u32, d: u64, k_start: u64, len: u64) -> f64 {
    let mut sum = FracSum::default();
    for k in k_start..k_start + len {
        sum.push(left_term(j, d, k));
    }
    sum.value()
}

/// Sums the convergent tail from k = d upward.
///
/// Stops at the first term below [`TAIL_EPSILON`]; [`TAIL_SPAN`] bounds the
/// loop in case the cutoff is ever loosened. Convergence is geometric, so
/// the tail costs a small constant number of terms regardless of d.
pub fn right_tail(j: u32, d: u64) -> f64 {
    let mut sum = FracSum::default();
    for k in d..=d + TAIL_SPAN {
        let term = right_term(j, d, k);
        if term < TAIL_EPSILON {
            break;
        }
        sum.push(term);
    }
    sum.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_terms_are_proper_fractions() {
        for j in [1, 4, 5, 6] {
            for k in [0u64, 1, 17, 999, 12_345] {
                let t = left_term(j, 20_000, k);
                assert!((0.0..1.0).contains(&t), "j={j} k={k} term={t}");
            }
        }
    }

    #[test]
    fn chunk_sum_matches_term_by_term_loop() {
        let (j, d) = (5, 10_000);
        let mut expected = FracSum::default();
        for k in 100..600 {
            expected.push(left_term(j, d, k));
        }
        assert_eq!(left_chunk(j, d, 100, 500), expected.value());
    }

    #[test]
    fn tail_terminates_quickly() {
        for j in [1, 4, 5, 6] {
            for d in [0u64, 1, 1_000, 10_000_000] {
                let mut iterations = 0;
                for k in d.. {
                    iterations += 1;
                    if right_term(j, d, k) < TAIL_EPSILON {
                        break;
                    }
                }
                assert!(iterations <= 200, "j={j} d={d} took {iterations} terms");
            }
        }
    }

    #[test]
    fn tail_matches_uncapped_reference() {
        for j in [1, 4, 5, 6] {
            for d in [0u64, 1, 42, 10_000] {
                let mut reference = FracSum::default();
                let mut k = d;
                loop {
                    let term = right_term(j, d, k);
                    if term < TAIL_EPSILON {
                        break;
                    }
                    reference.push(term);
                    k += 1;
                }
                let got = right_tail(j, d);
                assert!(
                    (got - reference.value()).abs() < 1e-12,
                    "j={j} d={d}: {got} vs {}",
                    reference.value()
                );
            }
        }
    }

    #[test]
    fn frac_sum_stays_in_unit_interval() {
        let mut sum = FracSum::default();
        for _ in 0..1_000 {
            sum.push(0.9375);
            let v = sum.value();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
