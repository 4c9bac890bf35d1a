//! Native-thread backend.

use std::thread;

use tracing::trace;

use crate::backend::Backend;
use crate::config::CPU_CHUNK_LEN;
use crate::error::EngineError;
use crate::series::left_chunk;

/// Runs each wave as one scoped OS thread per worker.
///
/// Workers write only their own slot of the results vector, so the wave
/// needs no locks; the join at the end of the scope is the only barrier.
pub struct CpuBackend {
    workers: usize,
    chunk_len: u64,
    results: Vec<f64>,
}

impl CpuBackend {
    /// A backend with an explicit worker count and chunk length. Both are
    /// clamped to at least 1.
    pub fn new(workers: usize, chunk_len: u64) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            chunk_len: chunk_len.max(1),
            results: vec![0.0; workers],
        }
    }

    /// Hardware-concurrency workers with the default chunk length.
    pub fn with_defaults() -> Self {
        Self::new(default_worker_count(), CPU_CHUNK_LEN)
    }
}

/// Hardware-reported concurrency, falling back to 1 when the OS will not
/// say.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Backend for CpuBackend {
    fn workers(&self) -> usize {
        self.workers
    }

    fn chunk_len(&self) -> u64 {
        self.chunk_len
    }

    fn run_wave(&mut self, j: u32, d: u64, k_start: u64) -> Result<&[f64], EngineError> {
        let chunk = self.chunk_len;
        trace!(j, k_start, workers = self.workers, "dispatching CPU wave");

        thread::scope(|scope| -> Result<(), EngineError> {
            let mut handles = Vec::with_capacity(self.workers);
            for (i, slot) in self.results.iter_mut().enumerate() {
                let k0 = k_start + i as u64 * chunk;
                let handle = thread::Builder::new()
                    .name(format!("bbp-worker-{i}"))
                    .spawn_scoped(scope, move || {
                        *slot = left_chunk(j, d, k0, chunk);
                    })?;
                handles.push(handle);
            }
            for handle in handles {
                handle.join().map_err(|_| EngineError::WorkerPanic)?;
            }
            Ok(())
        })?;

        Ok(&self.results)
    }
}
