//! Software and backend names used by the alpaka rules

/// GNU C++ compiler
pub const GCC: &str = "gcc";
/// Clang as host (C++) compiler
pub const CLANG: &str = "clang";
/// NVIDIA CUDA compiler
pub const NVCC: &str = "nvcc";
/// Clang as CUDA compiler
pub const CLANG_CUDA: &str = "clang++";
/// AMD HIP compiler
pub const HIPCC: &str = "hipcc";
/// Intel oneAPI DPC++/C++ compiler
pub const ICPX: &str = "icpx";

/// Ubuntu release
pub const UBUNTU: &str = "ubuntu";
/// CMake
pub const CMAKE: &str = "cmake";
/// Boost
pub const BOOST: &str = "boost";
/// C++ language standard
pub const CXX: &str = "cxx";

/// Serial CPU backend
pub const ALPAKA_ACC_CPU_B_SEQ_T_SEQ_ENABLE: &str = "alpaka_ACC_CPU_B_SEQ_T_SEQ_ENABLE";
/// std::thread CPU backend
pub const ALPAKA_ACC_CPU_B_SEQ_T_THREADS_ENABLE: &str = "alpaka_ACC_CPU_B_SEQ_T_THREADS_ENABLE";
/// TBB block CPU backend
pub const ALPAKA_ACC_CPU_B_TBB_T_SEQ_ENABLE: &str = "alpaka_ACC_CPU_B_TBB_T_SEQ_ENABLE";
/// OpenMP 2 block CPU backend
pub const ALPAKA_ACC_CPU_B_OMP2_T_SEQ_ENABLE: &str = "alpaka_ACC_CPU_B_OMP2_T_SEQ_ENABLE";
/// OpenMP 2 thread CPU backend
pub const ALPAKA_ACC_CPU_B_SEQ_T_OMP2_ENABLE: &str = "alpaka_ACC_CPU_B_SEQ_T_OMP2_ENABLE";
/// CUDA backend; its version is the CUDA SDK version
pub const ALPAKA_ACC_GPU_CUDA_ENABLE: &str = "alpaka_ACC_GPU_CUDA_ENABLE";
/// HIP backend; its version is the ROCm version
pub const ALPAKA_ACC_GPU_HIP_ENABLE: &str = "alpaka_ACC_GPU_HIP_ENABLE";
/// SYCL backend
pub const ALPAKA_ACC_SYCL_ENABLE: &str = "alpaka_ACC_SYCL_ENABLE";

/// Every backend flag the rules know about
pub const BACKEND_NAMES: [&str; 8] = [
    ALPAKA_ACC_CPU_B_SEQ_T_SEQ_ENABLE,
    ALPAKA_ACC_CPU_B_SEQ_T_THREADS_ENABLE,
    ALPAKA_ACC_CPU_B_TBB_T_SEQ_ENABLE,
    ALPAKA_ACC_CPU_B_OMP2_T_SEQ_ENABLE,
    ALPAKA_ACC_CPU_B_SEQ_T_OMP2_ENABLE,
    ALPAKA_ACC_GPU_CUDA_ENABLE,
    ALPAKA_ACC_GPU_HIP_ENABLE,
    ALPAKA_ACC_SYCL_ENABLE,
];

/// Compilers accepted as host or device compiler
pub const KNOWN_COMPILERS: [&str; 6] = [GCC, CLANG, NVCC, CLANG_CUDA, HIPCC, ICPX];

/// Version of an enabled on/off backend
pub const ON_VER: &str = "1.0.0";
/// Version of a disabled backend
pub const OFF_VER: &str = "0.0.0";
