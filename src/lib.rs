//! # hexpi - Bailey-Borwein-Plouffe digit extraction for pi
//!
//! Computes a single hexadecimal digit of pi at an arbitrary position,
//! without computing any of the preceding digits, using the BBP formula.
//! The expensive left regime of each series is data-parallel and runs on
//! CPU threads by default or on CUDA compute lanes with the `cuda`
//! feature.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hexpi::{extract_hex_digits, CpuBackend};
//!
//! let mut backend = CpuBackend::with_defaults();
//! // 0-based position: 0 asks for the first hex digit after the point.
//! let digits = extract_hex_digits(&mut backend, 0)?;
//! assert!(digits.starts_with('2')); // pi = 3.243F6A88...
//! # Ok::<(), hexpi::EngineError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! extract_hex_digits          4*S1 - 2*S4 - S5 - S6, then hex conversion
//!         |
//! reduce_series  (x4)         wave loop, deterministic fold, tail
//!         |
//! Backend::run_wave           CPU threads   or   CUDA lanes (NVRTC)
//!         |
//! left_chunk / pow16_mod      per-worker modular-exponentiation loop
//! ```
//!
//! Every wave is a batch of mutually independent workers, each covering a
//! contiguous range of series terms and writing one partial sum into its
//! own result slot. Partial sums are folded into the running value in a
//! fixed reverse-dispatch order; floating-point addition is not
//! associative, so the fold order is part of the contract.
//!
//! ## Feature Flags
//!
//! - `cuda`: NVIDIA GPU backend. The kernel is compiled at runtime via
//!   NVRTC, so builds need no device toolchain.
//!
//! ## Precision
//!
//! The whole pipeline runs in f64. Positions up to about 10^7 are safe;
//! beyond that, rounding error drifts into the extracted digits silently
//! rather than failing loudly.

pub mod backend;
pub mod config;
mod error;
pub mod extract;
pub mod modpow;
pub mod reduce;
pub mod series;

pub use backend::{Backend, CpuBackend};
pub use error::EngineError;
pub use extract::{extract_hex_digits, to_hex};
pub use reduce::reduce_series;

#[cfg(feature = "cuda")]
pub use backend::{device_report, CudaBackend, DeviceReport, GpuGeometry};
