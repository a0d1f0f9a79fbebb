//! Row check helpers
//!
//! Presence-aware predicates over a (possibly partial) combination. Every check
//! is `false` when the field or backend it looks at is absent, so rules built
//! from them only fire on values that are actually assigned.

use crate::version::{Op, compare_versions};
use jobcov_gen::Combination;
use jobcov_gen::fields::BACKENDS;

/// True if the field is assigned
#[must_use]
pub fn is_present(combination: &Combination<'_>, field: &str) -> bool {
    combination.contains(field)
}

/// Compare the name of a field's value; `false` if the field is absent
///
/// Names compare as plain strings, so only `==` and `!=` are meaningful.
#[must_use]
pub fn check_name(combination: &Combination<'_>, field: &str, op: Op, name: &str) -> bool {
    combination
        .parameter(field)
        .is_some_and(|value| op.compare(value.name.as_str(), name))
}

/// Compare the version of a field's value; `false` if absent or unparsable
#[must_use]
pub fn check_version(combination: &Combination<'_>, field: &str, op: Op, version: &str) -> bool {
    combination
        .parameter(field)
        .is_some_and(|value| compare_versions(&value.version, op, version))
}

/// True if `BACKENDS` is absent or its group does not carry `backend`
#[must_use]
pub fn backend_absent(combination: &Combination<'_>, backend: &str) -> bool {
    combination
        .backends()
        .is_none_or(|group| group.get(backend).is_none())
}

/// True if `BACKENDS` is present but its group does not carry `backend`
#[must_use]
pub fn backend_undefined(combination: &Combination<'_>, backend: &str) -> bool {
    combination.contains(BACKENDS) && backend_absent(combination, backend)
}

/// Compare the version of a backend flag; `false` if the backend is absent
#[must_use]
pub fn check_backend_version(
    combination: &Combination<'_>,
    backend: &str,
    op: Op,
    version: &str,
) -> bool {
    combination
        .backends()
        .and_then(|group| group.get(backend))
        .is_some_and(|flag| compare_versions(&flag.version, op, version))
}

/// Version string of a field's value
#[must_use]
pub fn version_of<'m>(combination: &Combination<'m>, field: &str) -> Option<&'m str> {
    combination
        .parameter(field)
        .map(|value| value.version.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{ALPAKA_ACC_GPU_CUDA_ENABLE, ALPAKA_ACC_GPU_HIP_ENABLE, GCC, OFF_VER};
    use jobcov_gen::ParameterMatrix;
    use jobcov_gen::fields::{DEVICE_COMPILER, HOST_COMPILER};

    fn matrix() -> ParameterMatrix {
        ParameterMatrix::builder()
            .parameter(HOST_COMPILER, &[("gcc", "10"), ("clang", "14")])
            .backends(&[
                &[(ALPAKA_ACC_GPU_CUDA_ENABLE, "11.4")],
                &[(ALPAKA_ACC_GPU_HIP_ENABLE, "0.0.0")],
            ])
            .parameter(DEVICE_COMPILER, &[("nvcc", "latest")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_checks_are_false_when_absent() {
        let matrix = matrix();
        let empty = Combination::new(&matrix);
        assert!(!is_present(&empty, HOST_COMPILER));
        assert!(!check_name(&empty, HOST_COMPILER, Op::Eq, GCC));
        assert!(!check_name(&empty, HOST_COMPILER, Op::Ne, GCC));
        assert!(!check_version(&empty, HOST_COMPILER, Op::Ne, "1"));
        assert!(!check_backend_version(&empty, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ne, OFF_VER));
        assert!(backend_absent(&empty, ALPAKA_ACC_GPU_CUDA_ENABLE));
        assert!(!backend_undefined(&empty, ALPAKA_ACC_GPU_CUDA_ENABLE));
    }

    #[test]
    fn test_name_and_version_checks() {
        let matrix = matrix();
        let combination = Combination::from_picks(&matrix, &[Some(0), None, None]).unwrap();
        assert!(check_name(&combination, HOST_COMPILER, Op::Eq, GCC));
        assert!(check_name(&combination, HOST_COMPILER, Op::Ne, "clang"));
        assert!(check_version(&combination, HOST_COMPILER, Op::Ge, "10"));
        assert!(check_version(&combination, HOST_COMPILER, Op::Eq, "10.0"));
        assert!(!check_version(&combination, HOST_COMPILER, Op::Lt, "10"));
        assert_eq!(version_of(&combination, HOST_COMPILER), Some("10"));
    }

    #[test]
    fn test_unparsable_version_is_false() {
        let matrix = matrix();
        let combination = Combination::from_picks(&matrix, &[None, None, Some(0)]).unwrap();
        assert!(!check_version(&combination, DEVICE_COMPILER, Op::Eq, "11.4"));
        assert!(!check_version(&combination, DEVICE_COMPILER, Op::Ne, "11.4"));
    }

    #[test]
    fn test_backend_checks() {
        let matrix = matrix();
        let cuda = Combination::from_picks(&matrix, &[None, Some(0), None]).unwrap();
        assert!(!backend_absent(&cuda, ALPAKA_ACC_GPU_CUDA_ENABLE));
        assert!(backend_absent(&cuda, ALPAKA_ACC_GPU_HIP_ENABLE));
        assert!(backend_undefined(&cuda, ALPAKA_ACC_GPU_HIP_ENABLE));
        assert!(check_backend_version(&cuda, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Eq, "11.4.0"));
        assert!(check_backend_version(&cuda, ALPAKA_ACC_GPU_CUDA_ENABLE, Op::Ne, OFF_VER));
        assert!(!check_backend_version(&cuda, ALPAKA_ACC_GPU_HIP_ENABLE, Op::Eq, OFF_VER));

        let hip = Combination::from_picks(&matrix, &[None, Some(1), None]).unwrap();
        assert!(check_backend_version(&hip, ALPAKA_ACC_GPU_HIP_ENABLE, Op::Eq, "0"));
    }
}
