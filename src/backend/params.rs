//! Kernel parameter marshalling for `cuLaunchKernel`.
//!
//! The driver expects an array of pointers, each pointing at the actual
//! argument value. Values are stored first and the pointer array is built
//! only when the launch asks for it, so pushing further arguments can
//! never invalidate pointers already handed out.

use std::ffi::c_void;

enum KernelArg {
    DevicePtr(u64),
    I32(i32),
    I64(i64),
}

#[derive(Default)]
pub struct KernelParams {
    args: Vec<KernelArg>,
    ptrs: Vec<*mut c_void>,
}

impl KernelParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device pointers are passed by value (the pointer itself is the
    /// argument).
    pub fn push_device_ptr(&mut self, device_ptr: u64) {
        self.args.push(KernelArg::DevicePtr(device_ptr));
    }

    pub fn push_i32(&mut self, value: i32) {
        self.args.push(KernelArg::I32(value));
    }

    pub fn push_i64(&mut self, value: i64) {
        self.args.push(KernelArg::I64(value));
    }

    /// The pointer array for `cuLaunchKernel`. The borrow keeps `self`
    /// alive and unmodified for the duration of the launch.
    pub fn as_kernel_params(&mut self) -> &[*mut c_void] {
        self.ptrs.clear();
        for arg in &self.args {
            let ptr = match arg {
                KernelArg::DevicePtr(v) => v as *const u64 as *mut c_void,
                KernelArg::I32(v) => v as *const i32 as *mut c_void,
                KernelArg::I64(v) => v as *const i64 as *mut c_void,
            };
            self.ptrs.push(ptr);
        }
        &self.ptrs
    }
}
