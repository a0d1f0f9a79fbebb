//! Coverage verification
//!
//! Independent check of a job list against a registry: every required tuple
//! must be satisfied by some job, and every job must be complete and admissible.

use crate::combination::Job;
use crate::error::Result;
use crate::filter::FilterChain;
use crate::parameter::ParameterMatrix;
use crate::registry::{TupleId, TupleRegistry};
use serde::Serialize;
use std::fmt;

/// A required tuple no job satisfies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingTuple {
    /// Registry id
    pub id: TupleId,
    /// Human-readable assignments, e.g. `A=a 1, C=c 2`
    pub tuple: String,
}

/// A job that fails the structural or filter checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidJob {
    /// Position in the job list
    pub index: usize,
    /// Display name of the job
    pub job: String,
    /// Why the job is invalid
    pub reason: String,
}

/// Outcome of a coverage check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Number of required tuples checked
    pub required: usize,
    /// Number of jobs checked
    pub jobs: usize,
    /// Required tuples left uncovered
    pub missing: Vec<MissingTuple>,
    /// Incomplete, foreign or inadmissible jobs
    pub invalid: Vec<InvalidJob>,
}

impl CoverageReport {
    /// True if nothing is missing and every job is valid
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    /// Covered share of the required tuples (1.0 when nothing is required)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.required == 0 {
            return 1.0;
        }
        (self.required - self.missing.len()) as f64 / self.required as f64
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} jobs cover {}/{} required tuples",
            self.jobs,
            self.required - self.missing.len(),
            self.required
        )?;
        if !self.invalid.is_empty() {
            write!(f, ", {} invalid jobs", self.invalid.len())?;
        }
        Ok(())
    }
}

/// Required tuples of `registry` not satisfied by any job
#[must_use]
pub fn verify_coverage(jobs: &[Job], registry: &TupleRegistry<'_>) -> CoverageReport {
    let missing = registry
        .iter()
        .filter(|tuple| !jobs.iter().any(|job| tuple.is_satisfied_by_job(job)))
        .map(|tuple| MissingTuple {
            id: tuple.id(),
            tuple: tuple.to_string(),
        })
        .collect();
    CoverageReport {
        required: registry.len(),
        jobs: jobs.len(),
        missing,
        invalid: Vec::new(),
    }
}

/// Full check of a job list: builds its own registry, then checks coverage
/// and re-evaluates every job against the chain
///
/// # Errors
///
/// Returns the registry errors of [`TupleRegistry::build`].
pub fn verify_jobs(
    jobs: &[Job],
    matrix: &ParameterMatrix,
    chain: &FilterChain,
    pair_size: usize,
) -> Result<CoverageReport> {
    let registry = TupleRegistry::build(matrix, chain, pair_size)?;
    let mut report = verify_coverage(jobs, &registry);
    for (index, job) in jobs.iter().enumerate() {
        let reason = match job.combination(matrix) {
            Err(err) => Some(err.to_string()),
            Ok(combination) if !combination.is_complete() => {
                Some("job does not assign every field".to_string())
            }
            Ok(combination) => chain
                .explain(&combination)
                .map(|rejection| format!("{}: {}", rejection.filter, rejection.reason)),
        };
        if let Some(reason) = reason {
            report.invalid.push(InvalidJob {
                index,
                job: job.display_name(),
                reason,
            });
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::Combination;
    use crate::filter::{ChainPosition, ForbidPair};
    use crate::parameter::Value;
    use crate::thinner::generate_jobs;

    fn abc() -> ParameterMatrix {
        ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2")])
            .parameter("B", &[("b", "1"), ("b", "2")])
            .parameter("C", &[("c", "1"), ("c", "2")])
            .build()
            .unwrap()
    }

    fn job(matrix: &ParameterMatrix, picks: [usize; 3]) -> Job {
        Combination::from_picks(matrix, &picks.map(Some))
            .unwrap()
            .to_job()
            .unwrap()
    }

    #[test]
    fn test_generated_jobs_verify() {
        let matrix = abc();
        let chain = FilterChain::new();
        let jobs = generate_jobs(&matrix, &chain, 2).unwrap();
        let report = verify_jobs(&jobs, &matrix, &chain, 2).unwrap();
        assert!(report.is_complete(), "{report}");
        assert!((report.ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_tuples_are_listed() {
        let matrix = abc();
        let registry = TupleRegistry::build(&matrix, &FilterChain::new(), 2).unwrap();
        let jobs = vec![job(&matrix, [0, 0, 0])];
        let report = verify_coverage(&jobs, &registry);
        assert_eq!(report.required, 12);
        assert_eq!(report.missing.len(), 9);
        assert_eq!(report.missing[0].tuple, "A=a 1, B=b 2");
        assert_eq!(report.to_string(), "1 jobs cover 3/12 required tuples");
    }

    #[test]
    fn test_inadmissible_job_is_reported() {
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            ForbidPair::new(
                ("A", Value::parameter("a", "1")),
                ("C", Value::parameter("c", "1")),
            ),
        );
        let jobs = vec![job(&matrix, [0, 0, 0]), job(&matrix, [1, 1, 1])];
        let report = verify_jobs(&jobs, &matrix, &chain, 2).unwrap();
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].index, 0);
        assert!(report.invalid[0].reason.starts_with("forbid(A=a 1, C=c 1)"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_empty_registry_is_fully_covered() {
        let report = CoverageReport::default();
        assert!(report.is_complete());
        assert!((report.ratio() - 1.0).abs() < f64::EPSILON);
    }
}
