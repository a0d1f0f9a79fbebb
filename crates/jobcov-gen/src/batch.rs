//! Batch runs
//!
//! Independent generator runs share nothing mutable, so a batch of them is
//! spread over the rayon pool. Results come back in input order.

use crate::combination::Job;
use crate::error::Result;
use crate::filter::FilterChain;
use crate::parameter::ParameterMatrix;
use crate::thinner::JobGenerator;
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

/// One run of a batch
#[derive(Debug, Clone, Copy)]
pub struct RunSpec<'a> {
    /// Matrix to cover
    pub matrix: &'a ParameterMatrix,
    /// Validity rules
    pub chain: &'a FilterChain,
    /// Tuple size
    pub pair_size: usize,
}

impl<'a> RunSpec<'a> {
    /// Create a run
    #[must_use]
    pub fn new(matrix: &'a ParameterMatrix, chain: &'a FilterChain, pair_size: usize) -> Self {
        Self {
            matrix,
            chain,
            pair_size,
        }
    }
}

/// Result of one run
#[derive(Debug)]
pub struct RunResult {
    /// Pair size of the run
    pub pair_size: usize,
    /// Job list or the run's error
    pub jobs: Result<Vec<Job>>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Generate job lists for several runs in parallel
#[must_use]
pub fn generate_batch(runs: &[RunSpec<'_>]) -> Vec<RunResult> {
    let start = Instant::now();
    let results: Vec<RunResult> = runs
        .par_iter()
        .map(|run| {
            let run_start = Instant::now();
            let jobs = JobGenerator::new(run.matrix, run.chain)
                .with_pair_size(run.pair_size)
                .generate();
            RunResult {
                pair_size: run.pair_size,
                jobs,
                duration_ms: u64::try_from(run_start.elapsed().as_millis()).unwrap_or(u64::MAX),
            }
        })
        .collect();
    debug!(
        runs = runs.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    results
}
