//! Filter chain
//!
//! Filters are blacklist predicates over partial combinations: a filter returns
//! `false` only when the fields it inspects are present and break one of its
//! rules. The chain ANDs them in a fixed order with four extension points.

use crate::combination::Combination;
use crate::parameter::{ParameterMatrix, Value};
use std::fmt;
use std::sync::Arc;

/// A validity rule over (possibly partial) combinations
pub trait Filter: Send + Sync + fmt::Debug {
    /// Stable name used in diagnostics
    fn name(&self) -> &str;

    /// Field identifiers the filter looks at
    fn inspected_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// `true` if the combination is admissible so far
    fn evaluate(&self, combination: &Combination<'_>) -> bool;

    /// Reason for a rejection, `None` if the combination is admissible
    fn explain(&self, combination: &Combination<'_>) -> Option<String> {
        if self.evaluate(combination) {
            None
        } else {
            Some(format!("rejected by {}", self.name()))
        }
    }
}

/// Filter backed by a closure, for project-specific one-off rules
pub struct FnFilter<F> {
    name: String,
    fields: Vec<String>,
    predicate: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&Combination<'_>) -> bool + Send + Sync,
{
    /// Wrap a predicate that inspects `fields`
    pub fn new(name: impl Into<String>, fields: &[&str], predicate: F) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            predicate,
        }
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&Combination<'_>) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn inspected_fields(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    fn evaluate(&self, combination: &Combination<'_>) -> bool {
        (self.predicate)(combination)
    }
}

/// Blacklist of one value pair: rejects combinations holding both `(field_a, value_a)`
/// and `(field_b, value_b)`. Values are matched by name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbidPair {
    name: String,
    first: (String, Value),
    second: (String, Value),
}

impl ForbidPair {
    /// Forbid `first` and `second` appearing together
    #[must_use]
    pub fn new(first: (&str, Value), second: (&str, Value)) -> Self {
        Self {
            name: format!("forbid({}={}, {}={})", first.0, first.1, second.0, second.1),
            first: (first.0.to_string(), first.1),
            second: (second.0.to_string(), second.1),
        }
    }
}

impl Filter for ForbidPair {
    fn name(&self) -> &str {
        &self.name
    }

    fn inspected_fields(&self) -> Vec<&str> {
        vec![self.first.0.as_str(), self.second.0.as_str()]
    }

    fn evaluate(&self, combination: &Combination<'_>) -> bool {
        !(combination.get(&self.first.0) == Some(&self.first.1)
            && combination.get(&self.second.0) == Some(&self.second.1))
    }
}

/// Extension points of a [`FilterChain`], in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainPosition {
    /// Runs before the built-in rules
    PreCore,
    /// Built-in rule set
    Core,
    /// Runs after the built-in rules
    PostCore,
    /// Always runs last; global sanity rules
    Final,
}

impl ChainPosition {
    /// All positions in evaluation order
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::PreCore, Self::Core, Self::PostCore, Self::Final]
    }

    const fn slot(self) -> usize {
        match self {
            Self::PreCore => 0,
            Self::Core => 1,
            Self::PostCore => 2,
            Self::Final => 3,
        }
    }
}

impl fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreCore => write!(f, "pre-core"),
            Self::Core => write!(f, "core"),
            Self::PostCore => write!(f, "post-core"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// Rejection reported by [`FilterChain::explain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Name of the first filter that rejected
    pub filter: String,
    /// Its reason
    pub reason: String,
}

/// Ordered AND of filters
///
/// Cloning is cheap; filters are shared behind `Arc` and the chain is `Send + Sync`,
/// so independent runs may use the same chain from several threads.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    stages: [Vec<Arc<dyn Filter>>; 4],
}

impl FilterChain {
    /// Empty chain (admits everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter at an extension point
    pub fn insert(&mut self, position: ChainPosition, filter: impl Filter + 'static) {
        self.stages[position.slot()].push(Arc::new(filter));
    }

    /// Append a shared filter at an extension point
    pub fn insert_shared(&mut self, position: ChainPosition, filter: Arc<dyn Filter>) {
        self.stages[position.slot()].push(filter);
    }

    /// Builder form of [`FilterChain::insert`]
    #[must_use]
    pub fn with(mut self, position: ChainPosition, filter: impl Filter + 'static) -> Self {
        self.insert(position, filter);
        self
    }

    /// Filters in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        self.stages.iter().flatten().map(|filter| &**filter)
    }

    /// Filters registered at one position
    pub fn at(&self, position: ChainPosition) -> impl Iterator<Item = &dyn Filter> {
        self.stages[position.slot()].iter().map(|filter| &**filter)
    }

    /// Total number of filters
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.iter().map(Vec::len).sum()
    }

    /// True if no filter is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if every filter admits the combination. Stops at the first `false`.
    #[must_use]
    pub fn evaluate(&self, combination: &Combination<'_>) -> bool {
        self.iter().all(|filter| filter.evaluate(combination))
    }

    /// First rejecting filter and its reason, `None` if admissible
    #[must_use]
    pub fn explain(&self, combination: &Combination<'_>) -> Option<Rejection> {
        self.iter().find_map(|filter| {
            filter.explain(combination).map(|reason| Rejection {
                filter: filter.name().to_string(),
                reason,
            })
        })
    }

    /// `(filter, field)` pairs whose declared field is missing from the matrix
    #[must_use]
    pub fn undeclared_fields(&self, matrix: &ParameterMatrix) -> Vec<(String, String)> {
        self.iter()
            .flat_map(|filter| {
                filter
                    .inspected_fields()
                    .into_iter()
                    .filter(|field| !matrix.contains(field))
                    .map(|field| (filter.name().to_string(), field.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
