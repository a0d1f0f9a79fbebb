//! Officially supported software versions
//!
//! Not every version listed here has a rule attached. The table answers
//! "is this a version the rule set was written against", so combinations
//! outside it can be flagged with a warning instead of being rejected.

use crate::error::{Error, Result};
use crate::names::{
    ALPAKA_ACC_GPU_CUDA_ENABLE, ALPAKA_ACC_GPU_HIP_ENABLE, BACKEND_NAMES, BOOST, CLANG, CLANG_CUDA,
    CMAKE, CXX, GCC, HIPCC, ICPX, NVCC, OFF_VER, ON_VER, UBUNTU,
};
use crate::version::Version;

const GCC_VERSIONS: &[&str] = &["6", "7", "8", "9", "10", "11", "12", "13"];
const CLANG_VERSIONS: &[&str] = &[
    "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
];
const NVCC_VERSIONS: &[&str] = &[
    "10.0", "10.1", "10.2", "11.0", "11.1", "11.2", "11.3", "11.4", "11.5", "11.6", "11.7", "11.8",
    "12.0", "12.1", "12.2", "12.3",
];
const HIPCC_VERSIONS: &[&str] = &["5.0", "5.1", "5.2", "5.3", "5.4", "5.5", "5.6", "5.7", "6.0"];
const ICPX_VERSIONS: &[&str] = &["2023.1.0", "2023.2.0"];
const UBUNTU_VERSIONS: &[&str] = &["18.04", "20.04"];
const CMAKE_VERSIONS: &[&str] = &[
    "3.18", "3.19", "3.20", "3.21", "3.22", "3.23", "3.24", "3.25", "3.26",
];
const BOOST_VERSIONS: &[&str] = &[
    "1.74.0", "1.75.0", "1.76.0", "1.77.0", "1.78.0", "1.79.0", "1.80.0", "1.81.0", "1.82.0",
];
const CXX_VERSIONS: &[&str] = &["17", "20"];

/// Software names with an entry in the version table, backends excluded
pub const KNOWN_SOFTWARE: [&str; 10] =
    [GCC, CLANG, NVCC, CLANG_CUDA, HIPCC, ICPX, UBUNTU, CMAKE, BOOST, CXX];

/// Every name [`supported_versions`] accepts
#[must_use]
pub fn known_software() -> Vec<&'static str> {
    KNOWN_SOFTWARE.iter().chain(BACKEND_NAMES.iter()).copied().collect()
}

/// Supported versions of a software or backend
///
/// clang as CUDA compiler shares clang's versions. The CUDA and HIP backends
/// accept off plus the nvcc and hipcc versions; every other backend is on/off.
///
/// # Errors
///
/// Returns [`Error::UnknownSoftware`] for names outside [`known_software`].
pub fn supported_versions(software: &str) -> Result<Vec<&'static str>> {
    let table: &[&str] = match software {
        GCC => GCC_VERSIONS,
        CLANG | CLANG_CUDA => CLANG_VERSIONS,
        NVCC => NVCC_VERSIONS,
        HIPCC => HIPCC_VERSIONS,
        ICPX => ICPX_VERSIONS,
        UBUNTU => UBUNTU_VERSIONS,
        CMAKE => CMAKE_VERSIONS,
        BOOST => BOOST_VERSIONS,
        CXX => CXX_VERSIONS,
        ALPAKA_ACC_GPU_CUDA_ENABLE => {
            return Ok(std::iter::once(OFF_VER).chain(NVCC_VERSIONS.iter().copied()).collect());
        }
        ALPAKA_ACC_GPU_HIP_ENABLE => {
            return Ok(std::iter::once(OFF_VER).chain(HIPCC_VERSIONS.iter().copied()).collect());
        }
        backend if BACKEND_NAMES.contains(&backend) => return Ok(vec![ON_VER, OFF_VER]),
        _ => return Err(Error::UnknownSoftware(software.to_string())),
    };
    Ok(table.to_vec())
}

/// True if `version` equals one of the supported versions of `software`
///
/// Versions compare numerically, so `11` matches `11.0`. An unparsable
/// version is never supported.
///
/// # Errors
///
/// Returns [`Error::UnknownSoftware`] for names outside [`known_software`].
pub fn is_supported_version(software: &str, version: &str) -> Result<bool> {
    let supported = supported_versions(software)?;
    let Ok(version) = Version::parse(version) else {
        return Ok(false);
    };
    Ok(supported
        .iter()
        .filter_map(|v| Version::parse(v).ok())
        .any(|v| v == version))
}
