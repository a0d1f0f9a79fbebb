//! Software dependency rules
//!
//! Constraints that come from the CI containers and toolchains rather than
//! from the compilers themselves: which compilers an Ubuntu image ships,
//! which C++ standards a compiler understands, and known broken combinations.

use crate::names::{
    ALPAKA_ACC_GPU_CUDA_ENABLE, ALPAKA_ACC_GPU_HIP_ENABLE, CLANG, CLANG_CUDA, GCC, HIPCC, NVCC,
    OFF_VER,
};
use crate::row::{check_backend_version, check_name, check_version, is_present};
use crate::version::{Op, Version};
use jobcov_gen::fields::{BACKENDS, CMAKE, CXX_STANDARD, DEVICE_COMPILER, HOST_COMPILER, UBUNTU};
use jobcov_gen::{Combination, Filter};

/// `(first nvcc release, C++ standard)`: older nvcc releases do not support
/// that standard or newer
pub const NVCC_CXX_MIN: &[(&str, &str)] = &[("11.0", "17"), ("12.0", "20"), ("12.2", "23")];

/// Container and toolchain availability rules
///
/// The rule has no required fields: every check only looks at the fields it
/// needs and stays silent while they are unassigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareDependencyFilter;

impl SoftwareDependencyFilter {
    /// Filter name used in diagnostics
    pub const NAME: &'static str = "software_dependency";
    /// Fields that must be present for the rule to say anything
    pub const REQUIRED: &'static [&'static str] = &[];
    /// Fields any of the checks look at
    pub const INSPECTED: &'static [&'static str] =
        &[HOST_COMPILER, DEVICE_COMPILER, BACKENDS, UBUNTU, CMAKE, CXX_STANDARD];

    /// Rejection reason, `None` if admissible
    #[must_use]
    pub fn check(&self, c: &Combination<'_>) -> Option<String> {
        let host_is = |name: &str| check_name(c, HOST_COMPILER, Op::Eq, name);
        let host_version = |op: Op, version: &str| check_version(c, HOST_COMPILER, op, version);
        let device_is = |name: &str| check_name(c, DEVICE_COMPILER, Op::Eq, name);
        let ubuntu_is = |version: &str| check_version(c, UBUNTU, Op::Eq, version);
        let cuda_on = check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ne, OFF_VER);

        if ubuntu_is("20.04") && host_is(GCC) && host_version(Op::Le, "6") {
            return Some("gcc 6 and older is not available on Ubuntu 20.04".to_string());
        }

        if check_version(c, CXX_STANDARD, Op::Ge, "20") && host_is(GCC) && host_version(Op::Le, "9")
        {
            return Some("gcc 9 and older does not support C++20".to_string());
        }

        if device_is(NVCC) && is_present(c, CXX_STANDARD) {
            if let Some(reason) = nvcc_cxx_reason(c) {
                return Some(reason);
            }
        }

        let host_is_clang = host_is(CLANG) || host_is(CLANG_CUDA);

        if ubuntu_is("18.04")
            && host_is_clang
            && (host_version(Op::Eq, "11") || host_version(Op::Eq, "12"))
        {
            return Some("clang 11 and 12 are not available on Ubuntu 18.04".to_string());
        }

        if check_version(c, CXX_STANDARD, Op::Ge, "20") && host_is_clang && host_version(Op::Le, "9")
        {
            return Some("clang 9 and older does not support C++20".to_string());
        }

        if ubuntu_is("18.04")
            && cuda_on
            && check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ge, "11.0")
        {
            return Some("there are no Ubuntu 18.04 containers for CUDA 11.0 and newer".to_string());
        }

        if ubuntu_is("20.04")
            && cuda_on
            && check_backend_version(c, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Lt, "11.0")
        {
            return Some("there are no Ubuntu 20.04 containers for CUDA 10.2 and older".to_string());
        }

        if check_version(c, UBUNTU, Op::Ne, "20.04")
            && device_is(HIPCC)
            && check_backend_version(c, ALPAKA_ACC_GPU_HIP_ENABLE, Op::Ne, OFF_VER)
        {
            return Some("ROCm images are only available for Ubuntu 20.04".to_string());
        }

        if device_is(CLANG_CUDA) && check_version(c, CMAKE, Op::Lt, "3.19") {
            return Some(
                "CMake older than 3.19 mishandles CMAKE_CUDA_ARCHITECTURES with clang++".to_string(),
            );
        }

        if device_is(NVCC)
            && ["11.0", "11.1", "11.2", "11.3"]
                .iter()
                .any(|v| check_version(c, DEVICE_COMPILER, Op::Eq, v))
            && host_is(GCC)
            && host_version(Op::Eq, "10")
            && ubuntu_is("20.04")
        {
            return Some("nvcc 11.0 to 11.3 does not work with gcc 10 on Ubuntu 20.04".to_string());
        }

        None
    }
}

fn nvcc_cxx_reason(c: &Combination<'_>) -> Option<String> {
    let nvcc = Version::parse(&c.parameter(DEVICE_COMPILER)?.version).ok()?;
    NVCC_CXX_MIN.iter().find_map(|(since, cxx)| {
        let since = Version::parse(since).ok()?;
        if nvcc < since && check_version(c, CXX_STANDARD, Op::Ge, cxx) {
            Some(format!("nvcc {nvcc} does not support C++{cxx}, needs nvcc {since}"))
        } else {
            None
        }
    })
}

impl Filter for SoftwareDependencyFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn inspected_fields(&self) -> Vec<&str> {
        Self::INSPECTED.to_vec()
    }

    fn evaluate(&self, combination: &Combination<'_>) -> bool {
        self.check(combination).is_none()
    }

    fn explain(&self, combination: &Combination<'_>) -> Option<String> {
        self.check(combination)
    }
}
