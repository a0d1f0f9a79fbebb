//! Version numbers and comparison operators
//!
//! Rule tables compare release versions such as `11.4`, `20.04` or
//! `2023.1.0`. Missing trailing segments count as zero. Suffixes follow the
//! usual release phases: `dev < a < b < rc < release < post`, each with an
//! optional numeric serial (`12.2rc2 < 12.2rc10`).

use crate::error::{Error, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // This regex pattern is verified at compile time, unwrap is safe here
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[vV]?(?P<release>\d+(?:\.\d+)*)(?:[-_.]?(?P<suffix>[A-Za-z][0-9A-Za-z.]*))?$")
        .unwrap()
});

static SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // This regex pattern is verified at compile time, unwrap is safe here
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(?P<label>[A-Za-z]+)[-_.]?(?P<serial>\d*)$").unwrap()
});

/// Release phase of a version, in sort order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// `dev`
    Dev,
    /// `a`, `alpha`
    Alpha,
    /// `b`, `beta`
    Beta,
    /// `rc`, `c`, `pre`, `preview`
    ReleaseCandidate,
    /// Any other suffix, compared by its label
    Other(String),
    /// No suffix
    Release,
    /// `post`, `rev`, `r`
    Post,
}

impl Phase {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "dev" => Self::Dev,
            "a" | "alpha" => Self::Alpha,
            "b" | "beta" => Self::Beta,
            "rc" | "c" | "pre" | "preview" => Self::ReleaseCandidate,
            "post" | "rev" | "r" => Self::Post,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Split a suffix into its phase and serial (`rc10` -> `(ReleaseCandidate, 10)`)
fn parse_suffix(suffix: &str) -> Option<(Phase, u64)> {
    let Some(captures) = SUFFIX_REGEX.captures(suffix) else {
        return Some((Phase::Other(suffix.to_ascii_lowercase()), 0));
    };
    let label = captures.name("label").map_or("", |m| m.as_str());
    let serial = match captures.name("serial").map_or("", |m| m.as_str()) {
        "" => 0,
        digits => digits.parse().ok()?,
    };
    Some((Phase::from_label(label), serial))
}

/// Parsed release version
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    release: Vec<u64>,
    phase: Phase,
    serial: u64,
}

impl Version {
    /// Parse a version string
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the input has no numeric release
    /// part or a segment overflows.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| Error::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };
        let captures = VERSION_REGEX
            .captures(trimmed)
            .ok_or_else(|| invalid("expected dotted numbers with an optional suffix"))?;
        let release = captures
            .name("release")
            .map_or("", |m| m.as_str())
            .split('.')
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("release segment out of range"))?;
        let (phase, serial) = match captures.name("suffix") {
            Some(suffix) => {
                parse_suffix(suffix.as_str()).ok_or_else(|| invalid("suffix serial out of range"))?
            }
            None => (Phase::Release, 0),
        };
        Ok(Self {
            raw: trimmed.to_string(),
            release,
            phase,
            serial,
        })
    }

    /// Numeric release segments as written
    #[must_use]
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// First release segment
    #[must_use]
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(0)
    }

    /// Release phase given by the suffix
    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// True for versions that sort before their plain release
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.phase < Phase::Release
    }

    fn cmp_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| {
                let left = self.release.get(i).copied().unwrap_or(0);
                let right = other.release.get(i).copied().unwrap_or(0);
                left.cmp(&right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_release(other)
            .then_with(|| self.phase.cmp(&other.phase))
            .then_with(|| self.serial.cmp(&other.serial))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Comparison operator of the rule helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Op {
    /// True if `ordering` (left compared to right) satisfies the operator
    #[must_use]
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }

    /// Apply the operator to two comparable values
    #[must_use]
    pub fn compare<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        self.holds(left.cmp(right))
    }

    /// Operator symbol
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(Error::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare two version strings; `false` if either fails to parse
#[must_use]
pub fn compare_versions(left: &str, op: Op, right: &str) -> bool {
    match (Version::parse(left), Version::parse(right)) {
        (Ok(left), Ok(right)) => op.compare(&left, &right),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_release_versions() {
        assert_eq!(v("11.4").release(), &[11, 4]);
        assert_eq!(v("20.04").release(), &[20, 4]);
        assert_eq!(v("2023.1.0").release(), &[2023, 1, 0]);
        assert_eq!(v(" 9 ").major(), 9);
        assert_eq!(v("v3.26").release(), &[3, 26]);
        assert!(!v("1.0.0").is_prerelease());
    }

    #[test]
    fn test_parse_suffixes() {
        assert!(v("1.0.0-dev").is_prerelease());
        assert!(v("12.2rc1").is_prerelease());
        assert!(v("1.0.0.dev1").is_prerelease());
        assert_eq!(v("1.0.0-dev").release(), &[1, 0, 0]);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "abc", "1..2", ".5", "1.0-", "99999999999999999999999"] {
            let err = Version::parse(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidVersion { .. }), "{bad}");
        }
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(v("11"), v("11.0"));
        assert_eq!(v("0"), v("0.0.0"));
        assert!(v("11.4") > v("11"));
        assert!(v("10.2") < v("11.0"));
        assert!(v("3.9") < v("3.19"));
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert!(v("1.0.0-dev") < v("1.0.0"));
        assert!(v("1.0.0-dev") > v("0.9"));
        assert!(v("12.2a") < v("12.2b"));
    }

    #[test]
    fn test_suffix_phases_and_serials() {
        assert_eq!(v("12.2rc10").phase(), &Phase::ReleaseCandidate);
        assert!(v("12.2rc2") < v("12.2rc10"));
        assert!(v("1.0.dev") < v("1.0a1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b2") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(!v("1.0.post1").is_prerelease());
        assert_eq!(v("1.0.0-alpha1"), v("1.0.0a1"));
        assert!(v("1.0.0-nightly") < v("1.0.0"));
    }

    #[test]
    fn test_display_keeps_input() {
        assert_eq!(v("20.04").to_string(), "20.04");
        assert_eq!("1.0.0-dev".parse::<Version>().unwrap().to_string(), "1.0.0-dev");
    }

    #[test]
    fn test_operator_parse_and_apply() {
        assert_eq!("<=".parse::<Op>().unwrap(), Op::Le);
        assert_eq!(Op::Ge.to_string(), ">=");
        assert!(matches!("=>".parse::<Op>(), Err(Error::InvalidOperator(_))));
        assert!(Op::Lt.compare(&v("11.3"), &v("11.4")));
        assert!(Op::Ne.compare(&v("11.3"), &v("11.4")));
        assert!(!Op::Eq.compare(&v("11.3"), &v("11.4")));
        assert!(Op::Ge.compare("b", "a"));
    }

    #[test]
    fn test_compare_versions_unparsable_is_false() {
        assert!(compare_versions("11.4", Op::Ge, "11.4.0"));
        assert!(!compare_versions("latest", Op::Eq, "latest"));
        assert!(!compare_versions("latest", Op::Ne, "1.0"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_ordering_matches_numeric_tuples(
            a in prop::collection::vec(0u64..50, 1..4),
            b in prop::collection::vec(0u64..50, 1..4),
        ) {
            let render = |parts: &[u64]| {
                parts.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
            };
            let pad = |parts: &[u64]| {
                let mut padded = parts.to_vec();
                padded.resize(4, 0);
                padded
            };
            let left = v(&render(&a));
            let right = v(&render(&b));
            prop_assert_eq!(left.cmp(&right), pad(&a).cmp(&pad(&b)));
        }

        #[test]
        fn prop_operators_agree_with_ordering(
            a in 0u64..20,
            b in 0u64..20,
        ) {
            let left = v(&a.to_string());
            let right = v(&b.to_string());
            prop_assert_eq!(Op::Lt.compare(&left, &right), a < b);
            prop_assert_eq!(Op::Le.compare(&left, &right), a <= b);
            prop_assert_eq!(Op::Gt.compare(&left, &right), a > b);
            prop_assert_eq!(Op::Ge.compare(&left, &right), a >= b);
            prop_assert_eq!(Op::Eq.compare(&left, &right), a == b);
            prop_assert_eq!(Op::Ne.compare(&left, &right), a != b);
        }
    }
}
