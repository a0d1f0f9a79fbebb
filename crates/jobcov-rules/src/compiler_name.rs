//! Host and device compiler name rules

use crate::names::{CLANG, GCC, NVCC};
use crate::row::check_name;
use crate::version::Op;
use jobcov_gen::fields::{DEVICE_COMPILER, HOST_COMPILER};
use jobcov_gen::{Combination, Filter};

/// Which host/device compiler names may be combined
///
/// - nvcc is never a host compiler
/// - host and device compiler are the same, unless the device compiler is nvcc
/// - nvcc only accepts gcc and clang as host compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerNameFilter;

impl CompilerNameFilter {
    /// Filter name used in diagnostics
    pub const NAME: &'static str = "compiler_name";
    /// Fields that must be present for the rule to say anything
    pub const REQUIRED: &'static [&'static str] = &[HOST_COMPILER, DEVICE_COMPILER];

    /// Rejection reason, `None` if admissible
    #[must_use]
    pub fn check(&self, c: &Combination<'_>) -> Option<String> {
        if check_name(c, HOST_COMPILER, Op::Eq, NVCC) {
            return Some("nvcc is not allowed as host compiler".to_string());
        }

        if let (Some(host), Some(device)) = (c.parameter(HOST_COMPILER), c.parameter(DEVICE_COMPILER)) {
            if device.name != NVCC && host.name != device.name {
                return Some(format!(
                    "host and device compiler must be the same (except for nvcc), got {} and {}",
                    host.name, device.name
                ));
            }
        }

        if c.contains(HOST_COMPILER)
            && check_name(c, DEVICE_COMPILER, Op::Eq, NVCC)
            && !(check_name(c, HOST_COMPILER, Op::Eq, GCC)
                || check_name(c, HOST_COMPILER, Op::Eq, CLANG))
        {
            return Some("only clang and gcc are allowed as nvcc host compilers".to_string());
        }

        None
    }
}

impl Filter for CompilerNameFilter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{CLANG_CUDA, HIPCC, ICPX};
    use crate::test_support::{complete, row};

    fn admits(host: (&str, &str), device: (&str, &str)) -> bool {
        let matrix = row(&[(HOST_COMPILER, host), (DEVICE_COMPILER, device)]);
        CompilerNameFilter.evaluate(&complete(&matrix))
    }

    #[test]
    fn test_same_host_device_compiler() {
        for name in [GCC, CLANG, HIPCC, CLANG_CUDA, ICPX] {
            assert!(admits((name, "0"), (name, "0")), "{name}");
        }
        for (host, device) in [(GCC, CLANG), (GCC, HIPCC), (HIPCC, CLANG), (ICPX, GCC), (GCC, ICPX)] {
            assert!(!admits((host, "0"), (device, "0")), "{host} {device}");
        }
    }

    #[test]
    fn test_nvcc_host_compilers() {
        assert!(admits((GCC, "0"), (NVCC, "0")));
        assert!(admits((CLANG, "0"), (NVCC, "0")));
        for host in [NVCC, CLANG_CUDA, HIPCC, ICPX] {
            assert!(!admits((host, "0"), (NVCC, "0")), "{host}");
        }
        assert!(!admits((NVCC, "0"), (GCC, "0")));
    }

    #[test]
    fn test_partial_combinations() {
        let matrix = row(&[(HOST_COMPILER, (NVCC, "11.4")), (DEVICE_COMPILER, (NVCC, "11.4"))]);
        let host_only = Combination::from_picks(&matrix, &[Some(0), None]).unwrap();
        assert!(!CompilerNameFilter.evaluate(&host_only));

        let device_only = Combination::from_picks(&matrix, &[None, Some(0)]).unwrap();
        assert!(CompilerNameFilter.evaluate(&device_only));
    }

    #[test]
    fn test_explain_gives_reason() {
        let matrix = row(&[(HOST_COMPILER, (GCC, "12")), (DEVICE_COMPILER, (CLANG, "16"))]);
        let reason = CompilerNameFilter.explain(&complete(&matrix)).unwrap();
        assert!(reason.contains("must be the same"));
        assert!(reason.contains("gcc and clang"));
    }
}
