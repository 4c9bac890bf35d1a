use thiserror::Error;

/// Errors surfaced by the digit-extraction engine.
///
/// The numeric core itself cannot fail; every variant here comes from the
/// execution substrate (thread spawn, kernel compilation, driver calls).
/// All of them are fatal for the run, there is no retry path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// A worker thread panicked before writing its result slot.
    #[error("worker thread panicked")]
    WorkerPanic,

    /// NVRTC rejected the request before compilation started.
    #[cfg(feature = "cuda")]
    #[error("NVRTC error: {0}")]
    Nvrtc(String),

    /// The kernel failed to compile; the NVRTC build log is attached.
    #[cfg(feature = "cuda")]
    #[error("kernel compilation failed:\n{log}")]
    KernelCompile { log: String },

    /// A CUDA driver call returned a non-zero status.
    #[cfg(feature = "cuda")]
    #[error("CUDA driver error {code} in {op}")]
    Cuda { op: &'static str, code: i32 },

    /// NVML could not describe the requested device.
    #[cfg(feature = "cuda")]
    #[error("GPU device query failed: {0}")]
    DeviceQuery(String),
}
