//! Modular exponentiation of 16 in double precision.
//!
//! The left regime of the series needs 16^(d-k) mod (8k+j) for exponents up
//! to the digit position itself. The power is never materialized; a
//! left-to-right binary ladder keeps every intermediate below the square of
//! the modulus, and the modulus stays within f64's exact-integer range.

use once_cell::sync::Lazy;

/// Powers of two, built once on first use and read-only afterwards.
///
/// Workers on every backend share this table, so it must be fully
/// initialized behind a one-time guard rather than grown per call.
static POW2: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut table = [0u64; 64];
    table[0] = 1;
    for i in 1..64 {
        table[i] = table[i - 1] << 1;
    }
    table
});

/// Largest power of two that is at most `n`. Requires `n >= 1`.
fn largest_pow2_at_most(n: u64) -> u64 {
    let mut idx = 0;
    while idx + 1 < POW2.len() && POW2[idx + 1] <= n {
        idx += 1;
    }
    POW2[idx]
}

/// Computes 16^n mod `modulus` without forming 16^n.
///
/// Left-to-right square-and-multiply, carried out entirely in f64. The
/// reduction is `r - floor(r / modulus) * modulus`, which is exact as long
/// as `modulus^2` stays below 2^53; beyond that the result degrades
/// silently along with the rest of the pipeline.
///
/// `modulus` must be greater than 1. `n == 0` returns 1.0 (16^0 mod k = 1
/// for every such modulus); the series loops only call this with n > 0,
/// but the boundary is defined here rather than left to chance.
pub fn pow16_mod(n: u64, modulus: f64) -> f64 {
    if n == 0 {
        return 1.0;
    }

    let mut remaining = n;
    let mut bit = largest_pow2_at_most(n);
    let mut r = 1.0_f64;

    while bit >= 1 {
        if remaining >= bit {
            r *= 16.0;
            r -= (r / modulus).floor() * modulus;
            remaining -= bit;
        }
        bit >>= 1;
        if bit >= 1 {
            r *= r;
            r -= (r / modulus).floor() * modulus;
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use num_traits::ToPrimitive;
    use proptest::prelude::*;

    fn exact_pow16_mod(n: u64, k: u64) -> u64 {
        BigUint::from(16u8)
            .modpow(&BigUint::from(n), &BigUint::from(k))
            .to_u64()
            .unwrap()
    }

    #[test]
    fn zero_exponent_is_identity() {
        assert_eq!(pow16_mod(0, 7.0), 1.0);
        assert_eq!(pow16_mod(0, 2.0), 1.0);
    }

    #[test]
    fn matches_big_integer_reference() {
        for &k in &[2u64, 3, 5, 7, 11, 97, 1_009, 65_537, 999_983] {
            for n in 0..=20u64 {
                let expected = exact_pow16_mod(n, k) as f64;
                let got = pow16_mod(n, k as f64);
                assert_eq!(got, expected, "16^{n} mod {k}");
            }
        }
    }

    #[test]
    fn table_survives_repeated_use() {
        // Same inputs, same outputs: the power table is read-only after
        // initialization and cannot leak state between calls.
        let first = pow16_mod(19, 999_983.0);
        for _ in 0..10 {
            assert_eq!(pow16_mod(19, 999_983.0), first);
        }
    }

    proptest! {
        #[test]
        fn agrees_with_reference_for_random_inputs(n in 0u64..=20, k in 2u64..=1_000_000) {
            let expected = exact_pow16_mod(n, k) as f64;
            prop_assert_eq!(pow16_mod(n, k as f64), expected);
        }
    }
}
