//! Built-in alpaka rule set

use crate::backend_version::BackendVersionFilter;
use crate::compiler_name::CompilerNameFilter;
use crate::compiler_version::CompilerVersionFilter;
use crate::software_dependency::SoftwareDependencyFilter;
use jobcov_gen::fields::SPECIAL_FIELDS;
use jobcov_gen::{ChainPosition, Filter, FilterChain, ParameterMatrix};
use std::sync::Arc;
use tracing::{debug, warn};

/// A built-in rule and the fields it needs before it can say anything
#[derive(Debug, Clone)]
pub struct BuiltinRule {
    /// The rule
    pub filter: Arc<dyn Filter>,
    /// Fields that must be assigned for a single-combination check to run it
    pub required: &'static [&'static str],
}

impl BuiltinRule {
    /// Rule name
    #[must_use]
    pub fn name(&self) -> &str {
        self.filter.name()
    }
}

/// The four alpaka rules in evaluation order
#[must_use]
pub fn builtin_rules() -> Vec<BuiltinRule> {
    vec![
        BuiltinRule {
            filter: Arc::new(CompilerNameFilter),
            required: CompilerNameFilter::REQUIRED,
        },
        BuiltinRule {
            filter: Arc::new(CompilerVersionFilter),
            required: CompilerVersionFilter::REQUIRED,
        },
        BuiltinRule {
            filter: Arc::new(BackendVersionFilter),
            required: BackendVersionFilter::REQUIRED,
        },
        BuiltinRule {
            filter: Arc::new(SoftwareDependencyFilter),
            required: SoftwareDependencyFilter::REQUIRED,
        },
    ]
}

/// Chain holding the built-in rules at [`ChainPosition::Core`]
///
/// Project-specific filters go in at the other positions:
///
/// ```
/// use jobcov_gen::{ChainPosition, FnFilter};
/// use jobcov_rules::alpaka_filter_chain;
///
/// let chain = alpaka_filter_chain().with(
///     ChainPosition::PostCore,
///     FnFilter::new("no-boost-1.74", &["BOOST"], |c| {
///         c.parameter("BOOST").is_none_or(|boost| boost.version != "1.74.0")
///     }),
/// );
/// assert_eq!(chain.len(), 5);
/// ```
#[must_use]
pub fn alpaka_filter_chain() -> FilterChain {
    let mut chain = FilterChain::new();
    for rule in builtin_rules() {
        chain.insert_shared(ChainPosition::Core, rule.filter);
    }
    debug!(filters = chain.len(), "built alpaka filter chain");
    chain
}

/// Warnings for special fields the matrix does not define
///
/// Missing fields are legal; the rules that need them simply never fire.
#[must_use]
pub fn missing_special_fields(matrix: &ParameterMatrix) -> Vec<String> {
    SPECIAL_FIELDS
        .iter()
        .filter(|field| !matrix.contains(field))
        .map(|field| {
            warn!(field, "special field is not defined in the parameter matrix");
            format!("{field} is not defined, rules depending on it are disabled")
        })
        .collect()
}
