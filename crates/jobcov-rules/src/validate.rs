//! Single-combination validation
//!
//! Runs the built-in rules one by one against a hand-written combination and
//! reports, per rule, whether it was skipped, passed or rejected. A rule is
//! skipped when a field it requires is not given; a skipped rule makes the
//! combination count as not validated.

use crate::chain::builtin_rules;
use crate::error::{Error, Result};
use crate::names::{BACKEND_NAMES, KNOWN_COMPILERS, ON_VER};
use crate::supported::is_supported_version;
use crate::version::Version;
use jobcov_gen::{Combination, Field, ParameterMatrix, ParameterValue, Value};
use std::fmt;
use tracing::debug;

/// What a single rule made of a combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Required fields are missing, the rule did not run
    Skipped {
        /// Missing field identifiers
        missing: Vec<String>,
    },
    /// The rule admits the combination
    Passed,
    /// The rule rejects the combination
    Rejected {
        /// Why
        reason: String,
    },
}

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    /// Rule name
    pub rule: String,
    /// What happened
    pub outcome: RuleOutcome,
}

impl fmt::Display for RuleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RuleOutcome::Skipped { missing } => {
                write!(f, "skipped {}(), missing parameters -> {}", self.rule, missing.join(" "))
            }
            RuleOutcome::Passed => write!(f, "{}() returns True", self.rule),
            RuleOutcome::Rejected { reason } => {
                write!(f, "{}() returns False\n  {reason}", self.rule)
            }
        }
    }
}

/// Per-rule outcomes plus unsupported-version warnings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// One entry per built-in rule, in chain order
    pub rules: Vec<RuleReport>,
    /// Versions outside the supported table; informational only
    pub unsupported: Vec<String>,
}

impl ValidationReport {
    /// True if every rule ran and passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rules
            .iter()
            .all(|report| report.outcome == RuleOutcome::Passed)
    }

    /// Reports of rejecting rules
    pub fn rejections(&self) -> impl Iterator<Item = &RuleReport> {
        self.rules
            .iter()
            .filter(|report| matches!(report.outcome, RuleOutcome::Rejected { .. }))
    }
}

/// Run every built-in rule against `combination`
#[must_use]
pub fn validate_combination(combination: &Combination<'_>) -> ValidationReport {
    let rules = builtin_rules()
        .into_iter()
        .map(|rule| {
            let missing: Vec<String> = rule
                .required
                .iter()
                .filter(|field| !combination.contains(field))
                .map(|field| (*field).to_string())
                .collect();
            let outcome = if !missing.is_empty() {
                RuleOutcome::Skipped { missing }
            } else if let Some(reason) = rule.filter.explain(combination) {
                RuleOutcome::Rejected { reason }
            } else {
                RuleOutcome::Passed
            };
            debug!(rule = rule.name(), ?outcome, "rule checked");
            RuleReport {
                rule: rule.name().to_string(),
                outcome,
            }
        })
        .collect();

    ValidationReport {
        rules,
        unsupported: unsupported_versions(combination),
    }
}

/// Validate a list of `(field, value)` assignments
///
/// # Errors
///
/// Returns [`Error::Matrix`] if a field is given twice or a backend group is
/// empty.
pub fn validate_assignments(assignments: &[(&str, Value)]) -> Result<ValidationReport> {
    let matrix = single_row_matrix(assignments)?;
    let picks = vec![Some(0); matrix.len()];
    let combination = Combination::from_picks(&matrix, &picks)?;
    Ok(validate_combination(&combination))
}

/// Matrix with exactly one value per field
///
/// # Errors
///
/// Returns [`Error::Matrix`] if the fields do not form a valid matrix.
pub fn single_row_matrix(assignments: &[(&str, Value)]) -> Result<ParameterMatrix> {
    let fields = assignments
        .iter()
        .map(|(field, value)| Field::new(*field, vec![value.clone()]))
        .collect();
    Ok(ParameterMatrix::new(fields)?)
}

/// Warnings for assigned versions that are not officially supported
#[must_use]
pub fn unsupported_versions(combination: &Combination<'_>) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut check = |value: &ParameterValue| match is_supported_version(&value.name, &value.version)
    {
        Ok(true) => {}
        Ok(false) => warnings.push(format!(
            "{} {} is not officially supported",
            value.name, value.version
        )),
        Err(err) => warnings.push(err.to_string()),
    };
    for (_, value) in combination.iter() {
        match value {
            Value::Parameter(parameter) => check(parameter),
            Value::Backends(group) => group.flags().iter().for_each(&mut check),
        }
    }
    warnings
}

/// Parse a `name@version` compiler argument such as `gcc@10`
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `@` is missing, the compiler is
/// unknown or the version does not parse.
pub fn parse_compiler_arg(argument: &str) -> Result<ParameterValue> {
    let (name, version) = split_argument(argument)?;
    if !KNOWN_COMPILERS.contains(&name) {
        return Err(invalid(
            argument,
            format!("unknown compiler {name}, known compilers: {}", KNOWN_COMPILERS.join(", ")),
        ));
    }
    Ok(ParameterValue::new(name, version))
}

/// Parse a backend argument
///
/// `name@version` sets the backend version; `0` and `1` are accepted as
/// off/on. A bare backend name means enabled.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the backend is unknown or the version
/// does not parse.
pub fn parse_backend_arg(argument: &str) -> Result<ParameterValue> {
    if BACKEND_NAMES.contains(&argument) {
        return Ok(ParameterValue::new(argument, ON_VER));
    }
    let (name, version) = split_argument(argument)?;
    if !BACKEND_NAMES.contains(&name) {
        return Err(invalid(
            argument,
            format!("unknown backend {name}, known backends: {}", BACKEND_NAMES.join(", ")),
        ));
    }
    Ok(ParameterValue::new(name, version))
}

fn split_argument(argument: &str) -> Result<(&str, &str)> {
    let (name, version) = argument
        .split_once('@')
        .ok_or_else(|| invalid(argument, "@ is missing, expected name@version".to_string()))?;
    Version::parse(version).map_err(|err| invalid(argument, err.to_string()))?;
    Ok((name, version))
}

fn invalid(argument: &str, reason: String) -> Error {
    Error::InvalidArgument {
        argument: argument.to_string(),
        reason,
    }
}
