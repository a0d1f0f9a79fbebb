//! Combination enumerator
//!
//! Depth-first branch-and-bound over the fields in matrix order. A branch is cut
//! as soon as the partial combination built so far fails the filter chain, so
//! the raw product of all field cardinalities is never materialized.

use crate::combination::Combination;
use crate::filter::FilterChain;
use crate::parameter::ParameterMatrix;

/// Restartable source of admissible complete combinations
#[derive(Debug, Clone)]
pub struct Enumerator<'a> {
    matrix: &'a ParameterMatrix,
    chain: &'a FilterChain,
    pins: Vec<Option<usize>>,
    unsatisfiable: bool,
}

impl<'a> Enumerator<'a> {
    /// Enumerate every admissible complete combination of `matrix`
    #[must_use]
    pub fn new(matrix: &'a ParameterMatrix, chain: &'a FilterChain) -> Self {
        Self {
            matrix,
            chain,
            pins: vec![None; matrix.len()],
            unsatisfiable: false,
        }
    }

    /// Restrict the enumeration to combinations that agree with `pins`
    ///
    /// Slots beyond the field count are ignored. A pin past the end of its
    /// field's values matches nothing, so the enumeration is empty.
    #[must_use]
    pub fn pinned(mut self, pins: &[Option<usize>]) -> Self {
        let fields = self.matrix.fields();
        for ((slot, pin), field) in self.pins.iter_mut().zip(pins).zip(fields) {
            if pin.is_some_and(|value| value >= field.values.len()) {
                self.unsatisfiable = true;
            }
            *slot = *pin;
        }
        self
    }

    /// Fresh iteration from the first combination
    #[must_use]
    pub fn iter(&self) -> CompleteCombinations<'a> {
        let mut combination = Combination::new(self.matrix);
        if !self.unsatisfiable {
            for (field, pin) in self.pins.iter().enumerate() {
                if let Some(value) = *pin {
                    combination.assign(field, value);
                }
            }
        }
        CompleteCombinations {
            chain: self.chain,
            cursor: self.pins.iter().map(|pin| pin.unwrap_or(0)).collect(),
            ends: self
                .matrix
                .fields()
                .iter()
                .zip(&self.pins)
                .map(|(field, pin)| pin.map_or(field.values.len(), |v| v + 1))
                .collect(),
            pins: self.pins.clone(),
            combination,
            depth: 0,
            state: if self.unsatisfiable {
                State::Done
            } else {
                State::Fresh
            },
        }
    }

    /// First admissible combination, if any
    #[must_use]
    pub fn first(&self) -> Option<Combination<'a>> {
        self.iter().next()
    }

    /// True if no admissible complete combination exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    /// First field none of whose values passes the chain on its own
    #[must_use]
    pub fn blocking_field(&self) -> Option<&'a str> {
        let matrix = self.matrix;
        matrix.fields().iter().enumerate().find_map(|(i, field)| {
            let mut combination = Combination::new(matrix);
            let admissible = (0..field.values.len()).any(|v| {
                combination.assign(i, v);
                self.chain.evaluate(&combination)
            });
            (!admissible).then_some(field.name.as_str())
        })
    }
}

impl<'a> IntoIterator for &Enumerator<'a> {
    type Item = Combination<'a>;
    type IntoIter = CompleteCombinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Lazy iterator returned by [`Enumerator::iter`]
#[derive(Debug, Clone)]
pub struct CompleteCombinations<'a> {
    chain: &'a FilterChain,
    pins: Vec<Option<usize>>,
    cursor: Vec<usize>,
    ends: Vec<usize>,
    combination: Combination<'a>,
    depth: usize,
    state: State,
}

impl<'a> Iterator for CompleteCombinations<'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let field_count = self.cursor.len();
        match self.state {
            State::Done => return None,
            State::Fresh if field_count == 0 => {
                self.state = State::Done;
                return Some(self.combination.clone());
            }
            State::Fresh => self.state = State::Running,
            State::Running => {}
        }

        loop {
            let depth = self.depth;
            if self.cursor[depth] >= self.ends[depth] {
                // exhausted: restore the slot and backtrack
                self.cursor[depth] = self.pins[depth].unwrap_or(0);
                match self.pins[depth] {
                    Some(pin) => self.combination.assign(depth, pin),
                    None => self.combination.unassign(depth),
                }
                if depth == 0 {
                    self.state = State::Done;
                    return None;
                }
                self.depth -= 1;
                continue;
            }

            let value = self.cursor[depth];
            self.cursor[depth] += 1;
            self.combination.assign(depth, value);
            if !self.chain.evaluate(&self.combination) {
                continue;
            }
            if depth + 1 == field_count {
                return Some(self.combination.clone());
            }
            self.depth += 1;
        }
    }
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

    fn picks(combination: &Combination<'_>) -> Vec<usize> {
        combination.picks().iter().map(|p| p.unwrap()).collect()
    }

    #[test]
    fn test_unfiltered_enumeration_is_full_product_in_order() {
        let matrix = abc();
        let chain = FilterChain::new();
        let all: Vec<Vec<usize>> = Enumerator::new(&matrix, &chain)
            .iter()
            .map(|c| picks(&c))
            .collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], vec![0, 0, 0]);
        assert_eq!(all[1], vec![0, 0, 1]);
        assert_eq!(all[7], vec![1, 1, 1]);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_filter_prunes_combinations() {
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            ForbidPair::new(
                ("A", Value::parameter("a", "1")),
                ("C", Value::parameter("c", "1")),
            ),
        );
        let enumerator = Enumerator::new(&matrix, &chain);
        let all: Vec<Vec<usize>> = enumerator.iter().map(|c| picks(&c)).collect();
        assert_eq!(all.len(), 6);
        assert!(!all.iter().any(|p| p[0] == 0 && p[2] == 0));
        assert!(all.iter().all(|p| chain.evaluate(
            &Combination::from_picks(&matrix, &[Some(p[0]), Some(p[1]), Some(p[2])]).unwrap()
        )));
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let matrix = abc();
        let chain = FilterChain::new();
        let enumerator = Enumerator::new(&matrix, &chain);
        let first: Vec<_> = enumerator.iter().collect();
        let second: Vec<_> = (&enumerator).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_matrix_yields_one_empty_combination() {
        let matrix = ParameterMatrix::default();
        let chain = FilterChain::new();
        let all: Vec<_> = Enumerator::new(&matrix, &chain).iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].assigned(), 0);
    }

    #[test]
    fn test_all_pruned_yields_nothing() {
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("no-b2", &["B"], |c| {
                c.parameter("B").is_none_or(|b| b.version != "2")
            }),
        );
        let enumerator = Enumerator::new(&matrix, &chain);
        assert_eq!(enumerator.iter().count(), 4);

        let reject_all = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("no-b", &["B"], |c| !c.contains("B")),
        );
        let enumerator = Enumerator::new(&matrix, &reject_all);
        assert!(enumerator.is_empty());
        assert_eq!(enumerator.blocking_field(), Some("B"));
    }

    #[test]
    fn test_pruning_happens_on_prefix() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let matrix = abc();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            FnFilter::new("no-a1", &["A"], move |c| {
                counted.fetch_add(1, Ordering::Relaxed);
                c.parameter("A").is_none_or(|a| a.version != "1")
            }),
        );
        let count = Enumerator::new(&matrix, &chain).iter().count();
        assert_eq!(count, 4);
        // a1 is rejected once at depth 0; a2 subtree costs 2 + 4 evaluations
        assert_eq!(calls.load(Ordering::Relaxed), 1 + 1 + 2 + 4);
    }

    #[test]
    fn test_pinned_enumeration() {
        let matrix = abc();
        let chain = FilterChain::new();
        let enumerator = Enumerator::new(&matrix, &chain).pinned(&[None, Some(1), Some(0)]);
        let all: Vec<Vec<usize>> = enumerator.iter().map(|c| picks(&c)).collect();
        assert_eq!(all, vec![vec![0, 1, 0], vec![1, 1, 0]]);
    }

    #[test]
    fn test_pinned_out_of_range_yields_nothing() {
        let matrix = abc();
        let chain = FilterChain::new();
        let enumerator = Enumerator::new(&matrix, &chain).pinned(&[None, Some(2), None]);
        assert!(enumerator.is_empty());
        assert_eq!(enumerator.iter().count(), 0);
    }

    #[test]
    fn test_pinned_to_rejected_value_yields_nothing() {
        let matrix = abc();
        let chain = FilterChain::new().with(
            ChainPosition::Core,
            ForbidPair::new(
                ("A", Value::parameter("a", "1")),
                ("C", Value::parameter("c", "1")),
            ),
        );
        let enumerator = Enumerator::new(&matrix, &chain).pinned(&[Some(0), None, Some(0)]);
        assert!(enumerator.is_empty());
    }
}
