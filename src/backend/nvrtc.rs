//! NVRTC and CUDA Driver API bindings.
//!
//! The kernel ships as CUDA C source and is compiled to PTX at startup, so
//! no device toolchain is needed at build time. Only the driver library
//! and NVRTC have to be present at runtime.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;

use crate::error::EngineError;

#[link(name = "nvrtc")]
extern "C" {
    fn nvrtcCreateProgram(
        prog: *mut *mut c_void,
        src: *const c_char,
        name: *const c_char,
        num_headers: c_int,
        headers: *const *const c_char,
        include_names: *const *const c_char,
    ) -> c_int;
    fn nvrtcCompileProgram(
        prog: *mut c_void,
        num_options: c_int,
        options: *const *const c_char,
    ) -> c_int;
    fn nvrtcGetPTXSize(prog: *mut c_void, ptx_size: *mut usize) -> c_int;
    fn nvrtcGetPTX(prog: *mut c_void, ptx: *mut c_char) -> c_int;
    fn nvrtcDestroyProgram(prog: *mut *mut c_void) -> c_int;
    fn nvrtcGetErrorString(result: c_int) -> *const c_char;
    fn nvrtcGetProgramLog(prog: *mut c_void, log: *mut c_char) -> c_int;
    fn nvrtcGetProgramLogSize(prog: *mut c_void, log_size: *mut usize) -> c_int;
}

#[link(name = "cuda")]
extern "C" {
    fn cuInit(flags: c_int) -> c_int;
    fn cuDeviceGet(device: *mut c_int, ordinal: c_int) -> c_int;
    fn cuDeviceGetAttribute(value: *mut c_int, attrib: c_int, device: c_int) -> c_int;
    fn cuCtxCreate(ctx: *mut *mut c_void, flags: c_int, device: c_int) -> c_int;
    fn cuModuleLoadData(module: *mut *mut c_void, image: *const c_void) -> c_int;
    fn cuModuleGetFunction(
        func: *mut *mut c_void,
        module: *mut c_void,
        name: *const c_char,
    ) -> c_int;
    fn cuLaunchKernel(
        f: *mut c_void,
        grid_dim_x: c_int,
        grid_dim_y: c_int,
        grid_dim_z: c_int,
        block_dim_x: c_int,
        block_dim_y: c_int,
        block_dim_z: c_int,
        shared_mem_bytes: c_int,
        stream: *mut c_void,
        kernel_params: *mut *mut c_void,
        extra: *mut *mut c_void,
    ) -> c_int;
    fn cuCtxSynchronize() -> c_int;
    fn cuMemAlloc(dptr: *mut u64, bytesize: usize) -> c_int;
    fn cuMemFree(dptr: u64) -> c_int;
    fn cuMemcpyDtoH(dst: *mut c_void, src: u64, bytesize: usize) -> c_int;
}

const NVRTC_SUCCESS: c_int = 0;
const CUDA_SUCCESS: c_int = 0;

const CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR: c_int = 75;
const CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR: c_int = 76;

fn cuda_check(op: &'static str, code: c_int) -> Result<(), EngineError> {
    if code == CUDA_SUCCESS {
        Ok(())
    } else {
        Err(EngineError::Cuda { op, code })
    }
}

fn nvrtc_error(result: c_int) -> EngineError {
    let msg = unsafe { CStr::from_ptr(nvrtcGetErrorString(result)) }
        .to_string_lossy()
        .into_owned();
    EngineError::Nvrtc(msg)
}

fn c_string(text: &str) -> Result<CString, EngineError> {
    CString::new(text).map_err(|_| EngineError::Nvrtc("interior NUL in source".into()))
}

/// Owns the driver context for one device and compiles kernels against it.
pub struct RuntimeCompiler {
    #[allow(dead_code)]
    context: *mut c_void,
    device: c_int,
}

impl RuntimeCompiler {
    pub fn new(device_id: i32) -> Result<Self, EngineError> {
        unsafe {
            cuda_check("cuInit", cuInit(0))?;

            let mut device = 0;
            cuda_check("cuDeviceGet", cuDeviceGet(&mut device, device_id))?;

            let mut context = ptr::null_mut();
            cuda_check("cuCtxCreate", cuCtxCreate(&mut context, 0, device))?;

            Ok(Self { context, device })
        }
    }

    /// The device's compute architecture as an NVRTC `--gpu-architecture`
    /// value, e.g. `compute_89`.
    pub fn compute_arch(&self) -> Result<String, EngineError> {
        unsafe {
            let mut major = 0;
            let mut minor = 0;
            cuda_check(
                "cuDeviceGetAttribute",
                cuDeviceGetAttribute(
                    &mut major,
                    CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR,
                    self.device,
                ),
            )?;
            cuda_check(
                "cuDeviceGetAttribute",
                cuDeviceGetAttribute(
                    &mut minor,
                    CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
                    self.device,
                ),
            )?;
            Ok(format!("compute_{major}{minor}"))
        }
    }

    /// Compiles CUDA C source to PTX. A failed compile carries the full
    /// NVRTC build log.
    ///
    /// Fast-math is deliberately not enabled: the digit pipeline depends
    /// on IEEE double semantics matching the CPU path.
    pub fn compile_to_ptx(
        &self,
        source: &str,
        program_name: &str,
        arch: &str,
    ) -> Result<String, EngineError> {
        unsafe {
            let src = c_string(source)?;
            let name = c_string(program_name)?;

            let mut prog = ptr::null_mut();
            let result = nvrtcCreateProgram(
                &mut prog,
                src.as_ptr(),
                name.as_ptr(),
                0,
                ptr::null(),
                ptr::null(),
            );
            if result != NVRTC_SUCCESS {
                return Err(nvrtc_error(result));
            }

            let options = [c_string(&format!("--gpu-architecture={arch}"))?];
            let option_ptrs: Vec<*const c_char> = options.iter().map(|s| s.as_ptr()).collect();

            let result = nvrtcCompileProgram(prog, option_ptrs.len() as c_int, option_ptrs.as_ptr());

            let mut log_size = 0;
            nvrtcGetProgramLogSize(prog, &mut log_size);
            let mut log = vec![0u8; log_size];
            nvrtcGetProgramLog(prog, log.as_mut_ptr() as *mut c_char);

            if result != NVRTC_SUCCESS {
                nvrtcDestroyProgram(&mut prog);
                return Err(EngineError::KernelCompile {
                    log: String::from_utf8_lossy(&log).into_owned(),
                });
            }

            let mut ptx_size = 0;
            nvrtcGetPTXSize(prog, &mut ptx_size);
            let mut ptx = vec![0u8; ptx_size];
            nvrtcGetPTX(prog, ptx.as_mut_ptr() as *mut c_char);
            nvrtcDestroyProgram(&mut prog);

            if ptx_size > 0 && ptx[ptx_size - 1] == 0 {
                ptx.truncate(ptx_size - 1);
            }
            Ok(String::from_utf8_lossy(&ptx).into_owned())
        }
    }

    /// Loads compiled PTX into the context.
    pub fn load_ptx_module(&self, ptx: &str) -> Result<CudaModule, EngineError> {
        unsafe {
            let ptx = c_string(ptx)?;
            let mut module = ptr::null_mut();
            cuda_check(
                "cuModuleLoadData",
                cuModuleLoadData(&mut module, ptx.as_ptr() as *const c_void),
            )?;
            Ok(CudaModule { module })
        }
    }
}

/// A loaded PTX module. Must outlive any function handles taken from it.
pub struct CudaModule {
    module: *mut c_void,
}

impl CudaModule {
    pub fn get_function(&self, name: &str) -> Result<CudaFunction, EngineError> {
        unsafe {
            let name = c_string(name)?;
            let mut func = ptr::null_mut();
            cuda_check(
                "cuModuleGetFunction",
                cuModuleGetFunction(&mut func, self.module, name.as_ptr()),
            )?;
            Ok(CudaFunction { func })
        }
    }
}

/// A kernel entry point ready for launch.
pub struct CudaFunction {
    func: *mut c_void,
}

impl CudaFunction {
    /// Launches on the default stream and blocks until the grid completes.
    pub fn launch(
        &self,
        grid_dim: (u32, u32, u32),
        block_dim: (u32, u32, u32),
        shared_mem: u32,
        params: &[*mut c_void],
    ) -> Result<(), EngineError> {
        unsafe {
            cuda_check(
                "cuLaunchKernel",
                cuLaunchKernel(
                    self.func,
                    grid_dim.0 as c_int,
                    grid_dim.1 as c_int,
                    grid_dim.2 as c_int,
                    block_dim.0 as c_int,
                    block_dim.1 as c_int,
                    block_dim.2 as c_int,
                    shared_mem as c_int,
                    ptr::null_mut(),
                    params.as_ptr() as *mut *mut c_void,
                    ptr::null_mut(),
                ),
            )?;
            cuda_check("cuCtxSynchronize", cuCtxSynchronize())
        }
    }
}

/// Device-resident buffer allocated through the driver API.
pub struct DeviceBuffer {
    ptr: u64,
    bytes: usize,
}

impl DeviceBuffer {
    pub fn new(bytes: usize) -> Result<Self, EngineError> {
        unsafe {
            let mut ptr = 0u64;
            cuda_check("cuMemAlloc", cuMemAlloc(&mut ptr, bytes))?;
            Ok(Self { ptr, bytes })
        }
    }

    pub fn device_ptr(&self) -> u64 {
        self.ptr
    }

    /// Copies the whole buffer back as f64 values. `out` must cover the
    /// allocation exactly.
    pub fn copy_to_host(&self, out: &mut [f64]) -> Result<(), EngineError> {
        debug_assert_eq!(out.len() * std::mem::size_of::<f64>(), self.bytes);
        unsafe {
            cuda_check(
                "cuMemcpyDtoH",
                cuMemcpyDtoH(out.as_mut_ptr() as *mut c_void, self.ptr, self.bytes),
            )
        }
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        // Nothing useful to do with a failed free during teardown.
        unsafe {
            let _ = cuMemFree(self.ptr);
        }
    }
}
