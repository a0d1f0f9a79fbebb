//! Required-tuple registry
//!
//! For tuple size `k` every choice of `k` distinct fields is a *field tuple*;
//! every admissible assignment of values to a field tuple is a
//! [`RequiredTuple`] the job list has to cover. A value tuple is admissible when
//! its partial combination passes the filter chain and at least one admissible
//! complete combination contains it.

use crate::combination::{Combination, Job};
use crate::enumerate::Enumerator;
use crate::error::{Error, Result};
use crate::filter::FilterChain;
use crate::parameter::{ParameterMatrix, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Dense identifier of a required tuple; ids follow coverage order
pub type TupleId = usize;

#[derive(Debug, Clone)]
struct FieldTuple {
    fields: Vec<usize>,
    values: Vec<Vec<usize>>,
    lookup: HashMap<Vec<usize>, TupleId>,
    first_id: TupleId,
}

/// All coverage obligations of one run
#[derive(Debug, Clone)]
pub struct TupleRegistry<'m> {
    matrix: &'m ParameterMatrix,
    tuple_size: usize,
    groups: Vec<FieldTuple>,
    by_field: Vec<Vec<usize>>,
    len: usize,
    universe_size: usize,
    unreachable: usize,
}

/// Lexicographic `k`-subsets of `0..n`
pub(crate) fn field_tuples(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k > n {
        return out;
    }
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        out.push(current.clone());
        // rightmost slot that can still move
        let Some(slot) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return out;
        };
        current[slot] += 1;
        for i in slot + 1..k {
            current[i] = current[i - 1] + 1;
        }
    }
}

/// Odometer over value positions, first field most significant
fn value_tuples(cardinalities: &[usize]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if cardinalities.contains(&0) {
        return out;
    }
    let mut current = vec![0; cardinalities.len()];
    loop {
        out.push(current.clone());
        let Some(slot) = (0..current.len())
            .rev()
            .find(|&i| current[i] + 1 < cardinalities[i])
        else {
            return out;
        };
        current[slot] += 1;
        for value in &mut current[slot + 1..] {
            *value = 0;
        }
    }
}

impl<'m> TupleRegistry<'m> {
    /// Compute the coverage obligations for `pair_size`
    ///
    /// `pair_size` larger than the field count is clamped to the field count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPairSize`] for `pair_size == 0`.
    pub fn build(matrix: &'m ParameterMatrix, chain: &FilterChain, pair_size: usize) -> Result<Self> {
        if pair_size == 0 {
            return Err(Error::InvalidPairSize(pair_size));
        }
        let tuple_size = pair_size.min(matrix.len());
        // an empty matrix has nothing to cover, not one empty tuple
        let subsets = if matrix.is_empty() {
            Vec::new()
        } else {
            field_tuples(matrix.len(), tuple_size)
        };

        // value tuples that occur in the universe, per field tuple
        let mut reachable: Vec<HashSet<Vec<usize>>> = vec![HashSet::new(); subsets.len()];
        let mut universe_size = 0usize;
        let mut key = Vec::with_capacity(tuple_size);
        for combination in Enumerator::new(matrix, chain).iter() {
            universe_size += 1;
            let picks = combination.picks();
            for (fields, seen) in subsets.iter().zip(&mut reachable) {
                key.clear();
                key.extend(fields.iter().filter_map(|&f| picks[f]));
                if !seen.contains(key.as_slice()) {
                    seen.insert(key.clone());
                }
            }
        }

        let mut groups = Vec::with_capacity(subsets.len());
        let mut by_field = vec![Vec::new(); matrix.len()];
        let mut next_id = 0;
        let mut unreachable = 0;
        for (group_index, (fields, seen)) in subsets.into_iter().zip(reachable).enumerate() {
            let cardinalities: Vec<usize> = fields
                .iter()
                .map(|&f| matrix.fields()[f].values.len())
                .collect();
            let mut values = Vec::new();
            let mut lookup = HashMap::new();
            let first_id = next_id;
            for tuple in value_tuples(&cardinalities) {
                let mut partial = Combination::new(matrix);
                for (&field, &value) in fields.iter().zip(&tuple) {
                    partial.assign(field, value);
                }
                if !chain.evaluate(&partial) {
                    continue;
                }
                if !seen.contains(&tuple) {
                    unreachable += 1;
                    continue;
                }
                lookup.insert(tuple.clone(), next_id);
                values.push(tuple);
                next_id += 1;
            }
            for &field in &fields {
                by_field[field].push(group_index);
            }
            groups.push(FieldTuple {
                fields,
                values,
                lookup,
                first_id,
            });
        }

        if unreachable > 0 {
            warn!(
                unreachable,
                "value tuples pass the filter chain but have no admissible completion; not required"
            );
        }
        debug!(
            tuple_size,
            field_tuples = groups.len(),
            required = next_id,
            universe = universe_size,
            "built required-tuple registry"
        );

        Ok(Self {
            matrix,
            tuple_size,
            groups,
            by_field,
            len: next_id,
            universe_size,
            unreachable,
        })
    }

    /// Effective tuple size (clamped pair size)
    #[must_use]
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    /// Number of required tuples
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has to be covered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of admissible complete combinations seen while building
    #[must_use]
    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    /// Value tuples that passed the chain but could not be completed
    #[must_use]
    pub fn unreachable(&self) -> usize {
        self.unreachable
    }

    /// Matrix the registry was built for
    #[must_use]
    pub fn matrix(&self) -> &'m ParameterMatrix {
        self.matrix
    }

    /// Field tuples in coverage order
    pub fn field_tuples(&self) -> impl Iterator<Item = Vec<&'m str>> + '_ {
        let matrix = self.matrix;
        self.groups.iter().map(move |group| {
            group
                .fields
                .iter()
                .map(|&f| matrix.fields()[f].name.as_str())
                .collect()
        })
    }

    /// Required tuple by id
    #[must_use]
    pub fn get(&self, id: TupleId) -> Option<RequiredTuple<'_>> {
        if id >= self.len {
            return None;
        }
        let group = self
            .groups
            .partition_point(|group| group.first_id + group.values.len() <= id);
        let group_ref = self.groups.get(group)?;
        Some(RequiredTuple {
            id,
            matrix: self.matrix,
            fields: &group_ref.fields,
            values: &group_ref.values[id - group_ref.first_id],
        })
    }

    /// All required tuples in coverage order
    pub fn iter(&self) -> impl Iterator<Item = RequiredTuple<'_>> {
        self.groups.iter().flat_map(move |group| {
            group
                .values
                .iter()
                .enumerate()
                .map(move |(offset, values)| RequiredTuple {
                    id: group.first_id + offset,
                    matrix: self.matrix,
                    fields: &group.fields,
                    values,
                })
        })
    }

    /// Id of the tuple `values` for field tuple `group`
    pub(crate) fn lookup(&self, group: usize, values: &[usize]) -> Option<TupleId> {
        self.groups[group].lookup.get(values).copied()
    }

    /// Field positions of a field tuple
    pub(crate) fn group_fields(&self, group: usize) -> &[usize] {
        &self.groups[group].fields
    }

    /// Field tuples containing a field
    pub(crate) fn groups_with(&self, field: usize) -> &[usize] {
        &self.by_field[field]
    }

    /// Field and value positions of a tuple
    pub(crate) fn positions(&self, id: TupleId) -> Option<(&[usize], &[usize])> {
        let tuple = self.get(id)?;
        Some((tuple.fields, tuple.values))
    }

    /// Ids of every required tuple contained in a complete assignment
    #[must_use]
    pub fn covered_by(&self, picks: &[Option<usize>]) -> Vec<TupleId> {
        let mut key = Vec::with_capacity(self.tuple_size);
        self.groups
            .iter()
            .filter_map(|group| {
                key.clear();
                for &field in &group.fields {
                    key.push((*picks.get(field)?)?);
                }
                group.lookup.get(key.as_slice()).copied()
            })
            .collect()
    }
}

/// One coverage obligation
#[derive(Debug, Clone, Copy)]
pub struct RequiredTuple<'r> {
    id: TupleId,
    matrix: &'r ParameterMatrix,
    fields: &'r [usize],
    values: &'r [usize],
}

impl<'r> RequiredTuple<'r> {
    /// Position in coverage order
    #[must_use]
    pub fn id(&self) -> TupleId {
        self.id
    }

    /// Field identifiers of the tuple
    #[must_use]
    pub fn fields(&self) -> Vec<&'r str> {
        self.fields
            .iter()
            .map(|&f| self.matrix.fields()[f].name.as_str())
            .collect()
    }

    /// `(field, value)` pairs of the tuple
    pub fn assignments(&self) -> impl Iterator<Item = (&'r str, &'r Value)> + 'r {
        let matrix = self.matrix;
        self.fields.iter().zip(self.values).map(move |(&f, &v)| {
            let field = &matrix.fields()[f];
            (field.name.as_str(), &field.values[v])
        })
    }

    /// True if the combination assigns exactly these values to these fields
    #[must_use]
    pub fn is_satisfied_by(&self, combination: &Combination<'_>) -> bool {
        self.fields
            .iter()
            .zip(self.values)
            .all(|(&f, &v)| combination.picks().get(f).copied().flatten() == Some(v))
    }

    /// True if the job assigns exactly these values to these fields
    #[must_use]
    pub fn is_satisfied_by_job(&self, job: &Job) -> bool {
        self.assignments()
            .all(|(field, value)| job.matches(field, value))
    }
}

impl fmt::Display for RequiredTuple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.assignments().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ChainPosition, ForbidPair};

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

    #[test]
    fn test_field_tuples_choose_k() {
        assert_eq!(
            field_tuples(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(field_tuples(3, 3), vec![vec![0, 1, 2]]);
        assert_eq!(field_tuples(3, 0), vec![Vec::<usize>::new()]);
        assert!(field_tuples(2, 3).is_empty());
    }

    #[test]
    fn test_value_tuples_odometer() {
        assert_eq!(
            value_tuples(&[2, 3]),
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
        assert_eq!(value_tuples(&[]), vec![Vec::<usize>::new()]);
        assert!(value_tuples(&[2, 0]).is_empty());
    }

    #[test]
    fn test_pairwise_registry_without_filters() {
        let matrix = abc();
        let registry = TupleRegistry::build(&matrix, &FilterChain::new(), 2).unwrap();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.tuple_size(), 2);
        assert_eq!(registry.universe_size(), 8);

        let tuples: Vec<Vec<&str>> = registry.field_tuples().collect();
        assert_eq!(tuples, vec![vec!["A", "B"], vec!["A", "C"], vec!["B", "C"]]);

        let first = registry.get(0).unwrap();
        assert_eq!(first.to_string(), "A=a 1, B=b 1");
        let last = registry.get(11).unwrap();
        assert_eq!(last.to_string(), "B=b 2, C=c 2");
        assert!(registry.get(12).is_none());

        let ids: Vec<TupleId> = registry.iter().map(|t| t.id()).collect();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_filtered_pair_is_not_required() {
        let matrix = abc();
        let registry = TupleRegistry::build(&matrix, &forbid_a1_c1(), 2).unwrap();
        assert_eq!(registry.len(), 11);
        assert!(
            !registry
                .iter()
                .any(|t| t.to_string() == "A=a 1, C=c 1")
        );
    }

    #[test]
    fn test_pair_size_is_clamped() {
        let matrix = abc();
        let registry = TupleRegistry::build(&matrix, &forbid_a1_c1(), 7).unwrap();
        assert_eq!(registry.tuple_size(), 3);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_zero_pair_size_is_rejected() {
        let matrix = abc();
        let err = TupleRegistry::build(&matrix, &FilterChain::new(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidPairSize(0)));
    }

    #[test]
    fn test_unreachable_tuples_are_dropped() {
        // a1 forbids c1 and b1 forbids c2: (a1, b1) passes on its own but has no completion
        let matrix = abc();
        let chain = forbid_a1_c1().with(
            ChainPosition::Core,
            ForbidPair::new(
                ("B", Value::parameter("b", "1")),
                ("C", Value::parameter("c", "2")),
            ),
        );
        let registry = TupleRegistry::build(&matrix, &chain, 2).unwrap();
        assert_eq!(registry.unreachable(), 1);
        assert!(
            !registry
                .iter()
                .any(|t| t.to_string() == "A=a 1, B=b 1")
        );
    }

    #[test]
    fn test_covered_by_and_satisfaction() {
        let matrix = abc();
        let registry = TupleRegistry::build(&matrix, &FilterChain::new(), 2).unwrap();
        let picks = [Some(0), Some(1), Some(1)];
        let covered = registry.covered_by(&picks);
        assert_eq!(covered.len(), 3);

        let combination = Combination::from_picks(&matrix, &picks).unwrap();
        let job = combination.to_job().unwrap();
        for id in covered {
            let tuple = registry.get(id).unwrap();
            assert!(tuple.is_satisfied_by(&combination));
            assert!(tuple.is_satisfied_by_job(&job));
        }
        assert!(!registry.get(0).unwrap().is_satisfied_by_job(&job));
    }

    #[test]
    fn test_single_field_registry() {
        let matrix = ParameterMatrix::builder()
            .parameter("A", &[("a", "1"), ("a", "2"), ("a", "3")])
            .build()
            .unwrap();
        let registry = TupleRegistry::build(&matrix, &FilterChain::new(), 1).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.groups_with(0), &[0]);
        assert_eq!(registry.group_fields(0), &[0]);
        assert_eq!(registry.lookup(0, &[2]), Some(2));
        assert_eq!(registry.positions(1), Some((&[0usize][..], &[1usize][..])));
    }

    #[test]
    fn test_empty_matrix_requires_nothing() {
        let matrix = ParameterMatrix::default();
        let registry = TupleRegistry::build(&matrix, &FilterChain::new(), 2).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.tuple_size(), 0);
        assert_eq!(registry.universe_size(), 1);
    }
}
