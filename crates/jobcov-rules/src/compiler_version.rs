//! Host and device compiler version rules
//!
//! The nvcc tables list, newest CUDA SDK first, the highest host compiler
//! version each SDK release supports. An SDK newer than the first entry is not
//! restricted, so a fresh CUDA release is never silently disabled.

use crate::names::{CLANG, CLANG_CUDA, GCC, NVCC};
use crate::row::{check_name, check_version};
use crate::version::{Op, Version};
use jobcov_gen::fields::{DEVICE_COMPILER, HOST_COMPILER};
use jobcov_gen::{Combination, Filter};

/// `(minimum CUDA SDK, maximum gcc)` pairs
pub const NVCC_GCC_MAX: &[(&str, &str)] = &[
    ("12.1", "12"),
    ("12.0", "12"),
    ("11.4", "11"),
    ("11.1", "10"),
    ("11.0", "9"),
    ("10.1", "8"),
    ("10.0", "7"),
];

/// `(minimum CUDA SDK, maximum clang)` pairs
pub const NVCC_CLANG_MAX: &[(&str, &str)] = &[
    ("12.1", "15"),
    ("12.0", "14"),
    ("11.6", "13"),
    ("11.4", "12"),
    ("11.2", "11"),
    ("11.1", "10"),
    ("11.0", "9"),
    ("10.1", "8"),
    ("10.0", "6"),
];

/// Highest supported host compiler version for an nvcc version, `None` if
/// the table does not restrict it
#[must_use]
pub fn max_host_version(table: &[(&str, &str)], nvcc: &Version) -> Option<Version> {
    let newest = Version::parse(table.first()?.0).ok()?;
    if *nvcc > newest {
        return None;
    }
    table.iter().find_map(|(sdk, max)| {
        let sdk = Version::parse(sdk).ok()?;
        if *nvcc >= sdk {
            Version::parse(max).ok()
        } else {
            None
        }
    })
}

/// Which host/device compiler versions may be combined
///
/// - the same compiler on host and device needs the same version (nvcc excepted)
/// - nvcc bounds the gcc and clang host versions; CUDA 11.4+ needs gcc 6 or newer
/// - clang is no nvcc host compiler for CUDA 11.3 to 11.5
/// - clang older than 14 is no CUDA compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerVersionFilter;

impl CompilerVersionFilter {
    /// Filter name used in diagnostics
    pub const NAME: &'static str = "compiler_version";
    /// Fields that must be present for the rule to say anything
    pub const REQUIRED: &'static [&'static str] = &[HOST_COMPILER, DEVICE_COMPILER];

    /// Rejection reason, `None` if admissible
    #[must_use]
    pub fn check(&self, c: &Combination<'_>) -> Option<String> {
        let host = c.parameter(HOST_COMPILER);
        let device = c.parameter(DEVICE_COMPILER);

        if let (Some(host), Some(device)) = (host, device) {
            if device.name != NVCC && host.version != device.version {
                return Some(format!(
                    "host and device compiler versions differ: {host} vs {device}"
                ));
            }
        }

        if let (Some(host), Some(device)) = (host, device) {
            if device.name == NVCC {
                if let Some(reason) = nvcc_host_reason(&host.name, &host.version, &device.version) {
                    return Some(reason);
                }
            }
        }

        if check_name(c, DEVICE_COMPILER, Op::Eq, CLANG_CUDA)
            && check_version(c, DEVICE_COMPILER, Op::Lt, "14")
        {
            return Some("clang older than 14 is not supported as CUDA compiler".to_string());
        }

        None
    }
}

fn nvcc_host_reason(host_name: &str, host_version: &str, nvcc_version: &str) -> Option<String> {
    let (Ok(host), Ok(nvcc)) = (Version::parse(host_version), Version::parse(nvcc_version)) else {
        return None;
    };
    let table = match host_name {
        GCC => NVCC_GCC_MAX,
        CLANG => {
            let first_broken = Version::parse("11.3").ok()?;
            let last_broken = Version::parse("11.5").ok()?;
            if nvcc >= first_broken && nvcc <= last_broken {
                return Some(format!(
                    "clang is disabled as host compiler for nvcc {nvcc} (11.3 to 11.5)"
                ));
            }
            NVCC_CLANG_MAX
        }
        _ => return None,
    };

    if let Some(max) = max_host_version(table, &nvcc) {
        if host > max {
            return Some(format!(
                "nvcc {nvcc} supports {host_name} up to {max}, got {host}"
            ));
        }
    }

    if host_name == GCC {
        let since = Version::parse("11.4").ok()?;
        let min_gcc = Version::parse("6").ok()?;
        if nvcc <= Version::parse(NVCC_GCC_MAX[0].0).ok()? && nvcc >= since && host < min_gcc {
            return Some(format!("nvcc {nvcc} needs gcc 6 or newer, got {host}"));
        }
    }
    None
}

impl Filter for CompilerVersionFilter {
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
