//! jobcov alpaka rule set
//!
//! Filters that encode which compilers, backends and support software can be
//! combined in an alpaka CI job, plus the tooling around them:
//!
//! - [`version`]: release version parsing and comparison operators
//! - [`row`]: presence-aware checks over partial combinations
//! - four rules, chained by [`alpaka_filter_chain`]
//! - [`supported`]: officially supported software versions
//! - [`validate`]: rule-by-rule validation of a single combination
//!
//! Every rule is a blacklist over partial combinations. A check only fires
//! when all fields it looks at are assigned, so the rules can prune the
//! search while the generator is still filling in fields.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend_version;
pub mod chain;
pub mod compiler_name;
pub mod compiler_version;
pub mod error;
pub mod names;
pub mod row;
pub mod software_dependency;
pub mod supported;
pub mod validate;
pub mod version;

#[cfg(test)]
mod test_support;

pub use backend_version::BackendVersionFilter;
pub use chain::{BuiltinRule, alpaka_filter_chain, builtin_rules, missing_special_fields};
pub use compiler_name::CompilerNameFilter;
pub use compiler_version::CompilerVersionFilter;
pub use error::{Error, Result};
pub use software_dependency::SoftwareDependencyFilter;
pub use supported::{is_supported_version, known_software, supported_versions};
pub use validate::{
    RuleOutcome, RuleReport, ValidationReport, parse_backend_arg, parse_compiler_arg,
    validate_assignments, validate_combination,
};
pub use version::{Op, Phase, Version, compare_versions};
