//! CUDA backend: one GPU lane per worker.

use nvml_wrapper::Nvml;
use tracing::info;

use crate::backend::kernel_source::BBP_KERNEL_SOURCE;
use crate::backend::nvrtc::{CudaFunction, CudaModule, DeviceBuffer, RuntimeCompiler};
use crate::backend::params::KernelParams;
use crate::backend::Backend;
use crate::config::gpu;
use crate::error::EngineError;

/// Launch geometry for one wave. One lane is one worker, so a wave covers
/// `blocks * threads_per_block * lane_terms` series terms.
#[derive(Clone, Copy, Debug)]
pub struct GpuGeometry {
    pub blocks: u32,
    pub threads_per_block: u32,
    pub lane_terms: u64,
}

impl Default for GpuGeometry {
    fn default() -> Self {
        Self {
            blocks: gpu::BLOCKS,
            threads_per_block: gpu::THREADS_PER_BLOCK,
            lane_terms: gpu::LANE_TERMS,
        }
    }
}

/// Basic device facts reported to the user before a GPU run.
#[derive(Clone, Debug)]
pub struct DeviceReport {
    pub name: String,
    pub total_memory_mb: u64,
    pub compute_units: u32,
}

/// Queries the device through NVML. Failure here is a configuration
/// problem (no driver, no device) and aborts the run.
pub fn device_report(device_index: u32) -> Result<DeviceReport, EngineError> {
    let nvml = Nvml::init().map_err(|e| EngineError::DeviceQuery(e.to_string()))?;
    let device = nvml
        .device_by_index(device_index)
        .map_err(|e| EngineError::DeviceQuery(e.to_string()))?;

    let name = device
        .name()
        .map_err(|e| EngineError::DeviceQuery(e.to_string()))?;
    let memory = device
        .memory_info()
        .map_err(|e| EngineError::DeviceQuery(e.to_string()))?;
    let compute_units = device
        .num_cores()
        .map_err(|e| EngineError::DeviceQuery(e.to_string()))?;

    Ok(DeviceReport {
        name,
        total_memory_mb: memory.total / (1024 * 1024),
        compute_units,
    })
}

/// Runs each wave as one kernel launch over a fixed grid.
///
/// The kernel is compiled from source via NVRTC when the backend is
/// constructed, targeted at the device's own compute architecture. Lanes
/// write only their own slot of the device results buffer, which is copied
/// back whole after the launch synchronizes.
pub struct CudaBackend {
    // Keeps the driver context alive for the module and kernel handles.
    _compiler: RuntimeCompiler,
    _module: CudaModule,
    kernel: CudaFunction,
    geometry: GpuGeometry,
    device_results: DeviceBuffer,
    host_results: Vec<f64>,
}

impl CudaBackend {
    pub fn new(device_index: u32, geometry: GpuGeometry) -> Result<Self, EngineError> {
        let compiler = RuntimeCompiler::new(device_index as i32)?;
        let arch = compiler.compute_arch()?;
        info!(%arch, "compiling BBP kernel via NVRTC");

        let ptx = compiler.compile_to_ptx(BBP_KERNEL_SOURCE, "hexpi_kernels", &arch)?;
        let module = compiler.load_ptx_module(&ptx)?;
        let kernel = module.get_function("bbp_left_chunks")?;

        let lanes = (geometry.blocks * geometry.threads_per_block) as usize;
        let device_results = DeviceBuffer::new(lanes * std::mem::size_of::<f64>())?;

        Ok(Self {
            _compiler: compiler,
            _module: module,
            kernel,
            geometry,
            device_results,
            host_results: vec![0.0; lanes],
        })
    }
}

impl Backend for CudaBackend {
    fn workers(&self) -> usize {
        self.host_results.len()
    }

    fn chunk_len(&self) -> u64 {
        self.geometry.lane_terms
    }

    fn run_wave(&mut self, j: u32, d: u64, k_start: u64) -> Result<&[f64], EngineError> {
        let mut params = KernelParams::new();
        params.push_device_ptr(self.device_results.device_ptr());
        params.push_i64(self.geometry.lane_terms as i64);
        params.push_i32(j as i32);
        params.push_i64(d as i64);
        params.push_i64(k_start as i64);

        self.kernel.launch(
            (self.geometry.blocks, 1, 1),
            (self.geometry.threads_per_block, 1, 1),
            0,
            params.as_kernel_params(),
        )?;

        self.device_results.copy_to_host(&mut self.host_results)?;
        Ok(&self.host_results)
    }
}
