//! Pairwise thinner
//!
//! Greedy covering-array construction. Each round takes the first uncovered
//! required tuple, pins its values and completes the remaining fields one by one
//! with the admissible value that closes the most uncovered tuples. When the
//! greedy completion dead-ends, the first admissible combination of the
//! enumerator restricted to the tuple is used instead.

use crate::combination::{Combination, Job};
use crate::enumerate::Enumerator;
use crate::error::{Error, Result};
use crate::filter::FilterChain;
use crate::parameter::ParameterMatrix;
use crate::registry::TupleRegistry;
use tracing::{debug, trace};

/// Default tuple size (all-pairs)
pub const DEFAULT_PAIR_SIZE: usize = 2;

/// Job list generator for one (matrix, chain, pair size) triple
#[derive(Debug, Clone)]
pub struct JobGenerator<'a> {
    matrix: &'a ParameterMatrix,
    chain: &'a FilterChain,
    pair_size: usize,
}

impl<'a> JobGenerator<'a> {
    /// Create a generator with [`DEFAULT_PAIR_SIZE`]
    #[must_use]
    pub fn new(matrix: &'a ParameterMatrix, chain: &'a FilterChain) -> Self {
        Self {
            matrix,
            chain,
            pair_size: DEFAULT_PAIR_SIZE,
        }
    }

    /// Set the tuple size to cover
    #[must_use]
    pub fn with_pair_size(mut self, pair_size: usize) -> Self {
        self.pair_size = pair_size;
        self
    }

    /// Configured pair size
    #[must_use]
    pub fn pair_size(&self) -> usize {
        self.pair_size
    }

    /// Generate the job list
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPairSize`] for a zero pair size and
    /// [`Error::Unsatisfiable`] when the chain rejects every complete combination
    /// of a non-empty matrix.
    pub fn generate(&self) -> Result<Vec<Job>> {
        self.generate_with_registry().map(|(jobs, _)| jobs)
    }

    /// Generate the job list and return the registry it covers
    ///
    /// # Errors
    ///
    /// See [`JobGenerator::generate`].
    pub fn generate_with_registry(&self) -> Result<(Vec<Job>, TupleRegistry<'a>)> {
        let registry = TupleRegistry::build(self.matrix, self.chain, self.pair_size)?;
        if self.matrix.is_empty() {
            return Ok((Vec::new(), registry));
        }
        if registry.universe_size() == 0 {
            return Err(self.unsatisfiable());
        }

        let mut covered = vec![false; registry.len()];
        let mut jobs = Vec::new();
        let mut cursor = 0;
        while cursor < registry.len() {
            if covered[cursor] {
                cursor += 1;
                continue;
            }
            let Some((fields, values)) = registry.positions(cursor) else {
                break;
            };
            let mut target = vec![None; self.matrix.len()];
            for (&field, &value) in fields.iter().zip(values) {
                target[field] = Some(value);
            }

            let combination = match self.greedy_fill(&target, &registry, &covered) {
                Some(combination) => combination,
                None => {
                    trace!(tuple = cursor, "greedy fill dead-ended, using first completion");
                    Enumerator::new(self.matrix, self.chain)
                        .pinned(&target)
                        .first()
                        .ok_or_else(|| self.unsatisfiable())?
                }
            };

            let mut newly_covered = 0;
            for id in registry.covered_by(combination.picks()) {
                if !covered[id] {
                    covered[id] = true;
                    newly_covered += 1;
                }
            }
            let job = combination.to_job().ok_or_else(|| self.unsatisfiable())?;
            trace!(job = %job.display_name(), newly_covered, "selected job");
            jobs.push(job);
        }

        debug!(
            jobs = jobs.len(),
            required = registry.len(),
            pair_size = registry.tuple_size(),
            "job list complete"
        );
        Ok((jobs, registry))
    }

    fn unsatisfiable(&self) -> Error {
        Error::Unsatisfiable {
            field_count: self.matrix.len(),
            blocking_field: Enumerator::new(self.matrix, self.chain)
                .blocking_field()
                .map(str::to_string),
        }
    }

    /// Complete `target` field by field, `None` on a dead end
    fn greedy_fill(
        &self,
        target: &[Option<usize>],
        registry: &TupleRegistry<'_>,
        covered: &[bool],
    ) -> Option<Combination<'a>> {
        let mut combination = Combination::from_picks(self.matrix, target).ok()?;
        if !self.chain.evaluate(&combination) {
            return None;
        }
        for (field, pin) in target.iter().enumerate() {
            if pin.is_some() {
                continue;
            }
            let mut best: Option<(usize, usize)> = None;
            for value in 0..self.matrix.fields()[field].values.len() {
                combination.assign(field, value);
                if !self.chain.evaluate(&combination) {
                    continue;
                }
                let gain = closing_gain(&combination, field, registry, covered);
                // strict comparison keeps the earliest value on ties
                if best.is_none_or(|(score, _)| gain > score) {
                    best = Some((gain, value));
                }
            }
            let (_, value) = best?;
            combination.assign(field, value);
        }
        Some(combination)
    }
}

/// Uncovered tuples through `field` whose fields are now all assigned
fn closing_gain(
    combination: &Combination<'_>,
    field: usize,
    registry: &TupleRegistry<'_>,
    covered: &[bool],
) -> usize {
    let picks = combination.picks();
    let mut key = Vec::with_capacity(registry.tuple_size());
    registry
        .groups_with(field)
        .iter()
        .filter(|&&group| {
            key.clear();
            for &f in registry.group_fields(group) {
                match picks[f] {
                    Some(value) => key.push(value),
                    None => return false,
                }
            }
            registry
                .lookup(group, &key)
                .is_some_and(|id| !covered[id])
        })
        .count()
}

/// Generate a job list covering every admissible `pair_size`-tuple
///
/// # Errors
///
/// See [`JobGenerator::generate`].
pub fn generate_jobs(
    matrix: &ParameterMatrix,
    chain: &FilterChain,
    pair_size: usize,
) -> Result<Vec<Job>> {
    JobGenerator::new(matrix, chain)
        .with_pair_size(pair_size)
        .generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ChainPosition, FnFilter, ForbidPair};
    use crate::parameter::Value;

    fn abc() -> ParameterMatrix {
        ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2")])
            .parameter("B", &[("b", "1"), ("b", "2")])
            .parameter("C", &[("c", "1"), ("c", "2")])
            .build()
            .unwrap()
    }

    fn forbid_a1_c1() -> FilterChain {
        FilterChain::new().with(
            ChainPosition::Core,
            ForbidPair::new(
                ("A", Value::parameter("a", "1")),
                ("C", Value::parameter("c", "1")),
            ),
        )
    }

    fn covers_all(jobs: &[Job], registry: &TupleRegistry<'_>) -> bool {
        registry
            .iter()
            .all(|tuple| jobs.iter().any(|job| tuple.is_satisfied_by_job(job)))
    }

    #[test]
    fn test_three_binary_fields_pairwise() {
        let matrix = abc();
        let chain = FilterChain::new();
        let (jobs, registry) = JobGenerator::new(&matrix, &chain)
            .generate_with_registry()
            .unwrap();
        assert_eq!(registry.len(), 12);
        assert!(covers_all(&jobs, &registry));
        assert!(jobs.len() >= 4);
        assert!(jobs.len() < 8);
        assert!(jobs.iter().all(|job| job.len() == 3));
    }

    #[test]
    fn test_first_job_starts_with_first_values() {
        let matrix = abc();
        let chain = FilterChain::new();
        let jobs = generate_jobs(&matrix, &chain, 2).unwrap();
        assert_eq!(jobs[0].display_name(), "a 1 | b 1 | c 1");
    }

    #[test]
    fn test_filtered_pair_never_appears() {
        let matrix = abc();
        let chain = forbid_a1_c1();
        let (jobs, registry) = JobGenerator::new(&matrix, &chain)
            .with_pair_size(2)
            .generate_with_registry()
            .unwrap();
        assert_eq!(registry.len(), 11);
        assert!(covers_all(&jobs, &registry));
        let a1 = Value::parameter("a", "1");
        let c1 = Value::parameter("c", "1");
        assert!(
            !jobs
                .iter()
                .any(|job| job.matches("A", &a1) && job.matches("C", &c1))
        );
        for job in &jobs {
            assert!(chain.evaluate(&job.combination(&matrix).unwrap()));
        }
    }

    #[test]
    fn test_full_pair_size_is_exhaustive() {
        let matrix = abc();
        let chain = forbid_a1_c1();
        let jobs = generate_jobs(&matrix, &chain, 3).unwrap();
        let universe: Vec<Job> = Enumerator::new(&matrix, &chain)
            .iter()
            .filter_map(|c| c.to_job())
            .collect();
        assert_eq!(jobs, universe);
        assert_eq!(generate_jobs(&matrix, &chain, 9).unwrap(), universe);
    }

    #[test]
    fn test_single_field_one_job_per_value() {
        let matrix = ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2"), ("a", "3")])
            .build()
            .unwrap();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("no-a2", &["A"], |c| {
                c.parameter("A").is_none_or(|a| a.version != "2")
            }),
        );
        let jobs = generate_jobs(&matrix, &chain, 2).unwrap();
        let names: Vec<String> = jobs.iter().map(Job::display_name).collect();
        assert_eq!(names, vec!["a 1", "a 3"]);
    }

    #[test]
    fn test_value_rejected_everywhere_never_appears() {
        let matrix = abc();
        // b2 can never be completed: it forbids both values of C
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("b2-excludes-c", &["B", "C"], |c| {
                !(c.parameter("B").is_some_and(|b| b.version == "2") && c.contains("C"))
            }),
        );
        let jobs = generate_jobs(&matrix, &chain, 2).unwrap();
        let b2 = Value::parameter("b", "2");
        assert!(!jobs.is_empty());
        assert!(!jobs.iter().any(|job| job.matches("B", &b2)));
    }

    #[test]
    fn test_empty_matrix_yields_no_jobs() {
        let matrix = ParameterMatrix::default();
        let jobs = generate_jobs(&matrix, &FilterChain::new(), 2).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_unsatisfiable_is_an_error() {
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Final,
            FnFilter::new("no-c", &["C"], |c| !c.contains("C")),
        );
        let err = generate_jobs(&matrix, &chain, 2).unwrap_err();
        match err {
            Error::Unsatisfiable {
                field_count,
                blocking_field,
            } => {
                assert_eq!(field_count, 3);
                assert_eq!(blocking_field.as_deref(), Some("C"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_pair_size_is_an_error() {
        let matrix = abc();
        let err = generate_jobs(&matrix, &FilterChain::new(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidPairSize(0)));
        let empty = ParameterMatrix::default();
        assert!(generate_jobs(&empty, &FilterChain::new(), 0).is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let matrix = ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2"), ("a", "3")])
            .parameter("B", &[("b", "1"), ("b", "2")])
            .parameter("C", &[("c", "1"), ("c", "2"), ("c", "3")])
            .parameter("D", &[("d", "1"), ("d", "2")])
            .build()
            .unwrap();
        let chain = forbid_a1_c1();
        let first = generate_jobs(&matrix, &chain, 2).unwrap();
        let second = generate_jobs(&matrix, &chain, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_higher_pair_size_covers_lower() {
        let matrix = ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2"), ("a", "3")])
            .parameter("B", &[("b", "1"), ("b", "2")])
            .parameter("C", &[("c", "1"), ("c", "2"), ("c", "3")])
            .parameter("D", &[("d", "1"), ("d", "2")])
            .build()
            .unwrap();
        let chain = forbid_a1_c1();
        let pairs = TupleRegistry::build(&matrix, &chain, 2).unwrap();
        let triples = generate_jobs(&matrix, &chain, 3).unwrap();
        assert!(covers_all(&triples, &pairs));
    }

    #[test]
    fn test_dead_end_falls_back_to_enumeration() {
        // for A=a1 the tie on B goes to b1, after which no value of C is admissible
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("a1-b1-excludes-c", &["A", "B", "C"], |c| {
                let a1 = c.parameter("A").is_some_and(|a| a.version == "1");
                let b1 = c.parameter("B").is_some_and(|b| b.version == "1");
                !(a1 && b1 && c.contains("C"))
            }),
        );
        let (jobs, registry) = JobGenerator::new(&matrix, &chain)
            .with_pair_size(1)
            .generate_with_registry()
            .unwrap();
        assert!(covers_all(&jobs, &registry));
        assert_eq!(jobs[0].display_name(), "a 1 | b 2 | c 1");
        for job in &jobs {
            assert!(chain.evaluate(&job.combination(&matrix).unwrap()));
        }
    }
}
