//! Device compiler and backend rules
//!
//! "Backend must be defined" checks only fire once `BACKENDS` is assigned.

use crate::names::{
    ALPAKA_ACC_GPU_CUDA_ENABLE, ALPAKA_ACC_GPU_HIP_ENABLE, CLANG, CLANG_CUDA, GCC, HIPCC, NVCC,
    OFF_VER,
};
use crate::row::{backend_undefined, check_backend_version, check_version};
use crate::version::Op;
use jobcov_gen::fields::{BACKENDS, DEVICE_COMPILER};
use jobcov_gen::{Combination, Filter};

/// `(maximum clang version, maximum CUDA SDK)` for clang as CUDA compiler
pub const CLANG_CUDA_MAX_SDK: &[(&str, &str)] = &[
    ("7", "9.2"),
    ("8", "10.0"),
    ("10", "10.1"),
    ("12", "11.0"),
    ("13", "11.2"),
    ("15", "11.5"),
];

/// Which backends each device compiler can build
///
/// - gcc and clang build neither CUDA nor HIP
/// - nvcc needs the CUDA backend at its own version and HIP off
/// - clang as CUDA compiler needs CUDA on, HIP off and a CUDA SDK it supports
/// - hipcc needs the HIP backend at its own version and CUDA off
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendVersionFilter;

impl BackendVersionFilter {
    /// Filter name used in diagnostics
    pub const NAME: &'static str = "backend_version";
    /// Fields that must be present for the rule to say anything
    pub const REQUIRED: &'static [&'static str] = &[DEVICE_COMPILER, BACKENDS];

    /// Rejection reason, `None` if admissible
    #[must_use]
    pub fn check(&self, c: &Combination<'_>) -> Option<String> {
        let device = c.parameter(DEVICE_COMPILER)?;
        let cuda_on = check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ne, OFF_VER);
        let hip_on = check_backend_version(c, ALPAKA_ACC_GPU_HIP_ENABLE, Op::Ne, OFF_VER);

        match device.name.as_str() {
            GCC | CLANG => {
                if cuda_on {
                    return Some(format!("{} cannot compile the CUDA backend", device.name));
                }
                if hip_on {
                    return Some(format!("{} cannot compile the HIP backend", device.name));
                }
            }
            NVCC => {
                if backend_undefined(c, ALPAKA_ACC_GPU_CUDA_ENABLE) {
                    return Some("nvcc needs the CUDA backend to be defined".to_string());
                }
                if check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ne, &device.version) {
                    return Some(format!(
                        "CUDA backend version must match nvcc {}",
                        device.version
                    ));
                }
                if hip_on {
                    return Some("CUDA and HIP backend cannot be enabled together".to_string());
                }
            }
            CLANG_CUDA => {
                if backend_undefined(c, ALPAKA_ACC_GPU_CUDA_ENABLE) {
                    return Some("clang++ needs the CUDA backend to be defined".to_string());
                }
                if check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Eq, OFF_VER) {
                    return Some("clang++ needs the CUDA backend to be enabled".to_string());
                }
                if hip_on {
                    return Some("CUDA and HIP backend cannot be enabled together".to_string());
                }
                for (clang, sdk) in CLANG_CUDA_MAX_SDK {
                    if check_version(c, DEVICE_COMPILER, Op::Le, clang)
                        && check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Gt, sdk)
                    {
                        return Some(format!(
                            "clang++ {} supports CUDA up to {sdk}",
                            device.version
                        ));
                    }
                }
            }
            HIPCC => {
                if backend_undefined(c, ALPAKA_ACC_GPU_HIP_ENABLE) {
                    return Some("hipcc needs the HIP backend to be defined".to_string());
                }
                if check_backend_version(c, ALPAKA_ACC_GPU_HIP_ENABLE, Op::Ne, &device.version) {
                    return Some(format!(
                        "HIP backend version must match hipcc {}",
                        device.version
                    ));
                }
                if cuda_on {
                    return Some("CUDA and HIP backend cannot be enabled together".to_string());
                }
            }
            _ => {}
        }
        None
    }
}

impl Filter for BackendVersionFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn inspected_fields(&self) -> Vec<&str> {
        Self::REQUIRED.to_vec()
    }

    fn evaluate(&self, combination: &Combination<'_>) -> bool {
        self.check(combination).is_none()
    }

    fn explain(&self, combination: &Combination<'_>) -> Option<String> {
        self.check(combination)
    }
}
