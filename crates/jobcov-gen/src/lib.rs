//! jobcov job matrix generator
//!
//! Builds sparse CI job matrices for multi-parameter software configurations.
//! Every admissible combination of values across any `pair_size` fields is
//! covered by at least one job, and no job is rejected by the filter chain.
//!
//! # Pipeline
//!
//! ```text
//! ParameterMatrix -> FilterChain -> Enumerator -> TupleRegistry -> JobGenerator -> Vec<Job>
//! ```
//!
//! The construction is greedy and deterministic: the same matrix, chain and
//! pair size always produce the same job list.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod batch;
pub mod combination;
pub mod coverage;
pub mod enumerate;
pub mod error;
pub mod fields;
pub mod filter;
pub mod joblist;
pub mod parameter;
pub mod proptest_impl;
pub mod registry;
pub mod thinner;

pub use batch::{RunResult, RunSpec, generate_batch};
pub use combination::{Combination, Job};
pub use coverage::{CoverageReport, InvalidJob, MissingTuple, verify_coverage, verify_jobs};
pub use enumerate::{CompleteCombinations, Enumerator};
pub use error::{Error, Result};
pub use filter::{ChainPosition, Filter, FilterChain, FnFilter, ForbidPair, Rejection};
pub use joblist::{filter_jobs, reorder_jobs, search_and_move_job};
pub use parameter::{BackendGroup, Field, MatrixBuilder, ParameterMatrix, ParameterValue, Value};
pub use registry::{RequiredTuple, TupleId, TupleRegistry};
pub use thinner::{DEFAULT_PAIR_SIZE, JobGenerator, generate_jobs};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_through_reexports() {
        let matrix = ParameterMatrix::builder()
            .parameter(fields::HOST_COMPILER, &[("gcc", "12"), ("clang", "16")])
            .parameter(fields::DEVICE_COMPILER, &[("gcc", "12"), ("clang", "16")])
            .parameter(fields::CMAKE, &[("cmake", "3.22"), ("cmake", "3.26")])
            .build()
            .unwrap();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new(
                "same-compiler",
                &[fields::HOST_COMPILER, fields::DEVICE_COMPILER],
                |c| match (
                    c.parameter(fields::HOST_COMPILER),
                    c.parameter(fields::DEVICE_COMPILER),
                ) {
                    (Some(host), Some(device)) => host == device,
                    _ => true,
                },
            ),
        );
        let jobs = generate_jobs(&matrix, &chain, DEFAULT_PAIR_SIZE).unwrap();
        assert_eq!(jobs.len(), 4);
        assert!(verify_jobs(&jobs, &matrix, &chain, 2).unwrap().is_complete());
    }
}
