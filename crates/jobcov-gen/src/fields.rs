//! Shared field identifiers
//!
//! The engine is generic over field names. These constants name the axes the
//! alpaka rule set and the CLI know about; only [`BACKENDS`] changes how the
//! matrix is validated.

/// Compiler used for host code
pub const HOST_COMPILER: &str = "HOST_COMPILER";
/// Compiler used for device code
pub const DEVICE_COMPILER: &str = "DEVICE_COMPILER";
/// Reserved field whose values are backend groups
pub const BACKENDS: &str = "BACKENDS";
/// CMake version
pub const CMAKE: &str = "CMAKE";
/// Boost version
pub const BOOST: &str = "BOOST";
/// alpaka version
pub const ALPAKA: &str = "ALPAKA";
/// Ubuntu release of the CI container
pub const UBUNTU: &str = "UBUNTU";
/// C++ language standard
pub const CXX_STANDARD: &str = "CXX_STANDARD";

/// Fields a complete alpaka job is expected to carry
pub const SPECIAL_FIELDS: [&str; 3] = [HOST_COMPILER, DEVICE_COMPILER, BACKENDS];
