//! Tuning constants for the digit-extraction engine.
//!
//! These values are tuned, not derived. They are centralized here so the
//! CLI and tests can override the overridable ones and so the defaults are
//! documented in one place.

/// Default 1-based digit position when none is given on the command line.
///
/// Double precision carries the computation to about this depth before
/// rounding error starts to reach the extracted digits.
pub const DEFAULT_DIGIT_POSITION: u64 = 10_000_000;

/// Terms each CPU worker processes per wave.
///
/// Thread launch overhead dwarfs the cost of a single term, so workers are
/// only ever dispatched with a large contiguous range.
pub const CPU_CHUNK_LEN: u64 = 100_000;

/// Right-regime cutoff: summation stops once a term falls below this.
///
/// Sits below the effective resolution of an f64, so truncation here never
/// moves the extracted digits.
pub const TAIL_EPSILON: f64 = 1e-17;

/// Hard cap on right-regime terms. The epsilon cutoff fires first in
/// practice (well under 100 terms for any position).
pub const TAIL_SPAN: u64 = 100;

/// Number of hexadecimal digits produced per extraction: the digit at the
/// requested position plus the following eight.
pub const HEX_DIGITS: usize = 9;

/// Default CUDA launch geometry.
pub mod gpu {
    /// Grid width in blocks.
    pub const BLOCKS: u32 = 80;

    /// Threads per block.
    pub const THREADS_PER_BLOCK: u32 = 60;

    /// Terms each GPU lane processes per wave. Lanes are cheap compared to
    /// CPU threads, so this is much smaller than [`super::CPU_CHUNK_LEN`].
    pub const LANE_TERMS: u64 = 2_000;
}
