//! Execution backends.
//!
//! The reducer does not care whether a wave of workers is a set of CPU
//! threads or a grid of GPU lanes. A backend's whole obligation is: launch
//! `workers()` independent workers, hand worker `i` the contiguous range
//! starting at `k_start + i * chunk_len()`, block until every worker has
//! written its partial sum into its own slot of the results buffer, and
//! expose that buffer. Fold order is the reducer's concern.

mod cpu;

#[cfg(feature = "cuda")]
mod cuda;
#[cfg(feature = "cuda")]
mod kernel_source;
#[cfg(feature = "cuda")]
mod nvrtc;
#[cfg(feature = "cuda")]
mod params;

pub use cpu::{default_worker_count, CpuBackend};

#[cfg(feature = "cuda")]
pub use cuda::{device_report, CudaBackend, DeviceReport, GpuGeometry};

use crate::error::EngineError;

/// A substrate that can run one wave of independent left-regime workers.
pub trait Backend {
    /// Number of workers launched per wave.
    fn workers(&self) -> usize;

    /// Terms each worker covers.
    fn chunk_len(&self) -> u64;

    /// Terms covered by one full wave.
    fn wave_span(&self) -> u64 {
        self.workers() as u64 * self.chunk_len()
    }

    /// Runs one wave starting at `k_start` and blocks until every worker
    /// has finished. Slot `i` of the returned slice holds the partial sum
    /// for the range `[k_start + i * chunk_len(), + chunk_len())`.
    ///
    /// A backend that cannot field its workers fails the whole run; there
    /// is no partial wave and no retry.
    fn run_wave(&mut self, j: u32, d: u64, k_start: u64) -> Result<&[f64], EngineError>;
}
