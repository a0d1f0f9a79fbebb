//! Parameter model
//!
//! A [`ParameterMatrix`] is the ordered set of axes a CI job varies over. Every
//! field holds candidate [`Value`]s in configuration order; the reserved
//! [`BACKENDS`] field holds [`BackendGroup`]s instead of single values.

use crate::error::{Error, Result};
use crate::fields::BACKENDS;
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{Error as _, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize a version that YAML may have typed as an integer (`9`)
///
/// Floats are rejected: `11.10` and `12.0` would not survive the round trip
/// through `f64`, so dotted versions have to be quoted.
fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VersionRepr {
        String(String),
        Integer(i64),
        Float(f64),
    }
    match VersionRepr::deserialize(deserializer)? {
        VersionRepr::String(s) => Ok(s),
        VersionRepr::Integer(i) => Ok(i.to_string()),
        VersionRepr::Float(f) => Err(D::Error::custom(format!(
            "version {f} must be quoted, e.g. '{f}'"
        ))),
    }
}

/// A `(name, version)` pair, e.g. `("gcc", "12")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Software or flag name
    pub name: String,
    /// Version string, compared verbatim by the engine
    #[serde(deserialize_with = "deserialize_version")]
    pub version: String,
}

impl ParameterValue {
    /// Create a new value
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Backend flags that are always set together in one job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendGroup(Vec<ParameterValue>);

impl BackendGroup {
    /// Create a group from its flags
    #[must_use]
    pub fn new(flags: Vec<ParameterValue>) -> Self {
        Self(flags)
    }

    /// Flags of the group in configuration order
    #[must_use]
    pub fn flags(&self) -> &[ParameterValue] {
        &self.0
    }

    /// Look up a flag by backend name
    #[must_use]
    pub fn get(&self, backend: &str) -> Option<&ParameterValue> {
        self.0.iter().find(|flag| flag.name == backend)
    }

    /// Number of flags
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the group has no flags (never true inside a valid matrix)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BackendGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{flag}")?;
        }
        write!(f, "]")
    }
}

/// A candidate value of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Single `(name, version)` value of an ordinary field
    Parameter(ParameterValue),
    /// Atomic backend group of the `BACKENDS` field
    Backends(BackendGroup),
}

// A map is a parameter value and a sequence is a backend group. Dispatching
// on the shape keeps the inner error (e.g. an unquoted float version) instead
// of serde's generic untagged-enum message.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a {name, version} map or a list of them")
            }

            fn visit_map<A>(self, map: A) -> std::result::Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                ParameterValue::deserialize(MapAccessDeserializer::new(map)).map(Value::Parameter)
            }

            fn visit_seq<A>(self, seq: A) -> std::result::Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                BackendGroup::deserialize(SeqAccessDeserializer::new(seq)).map(Value::Backends)
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl Value {
    /// Shorthand for a parameter value
    #[must_use]
    pub fn parameter(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Parameter(ParameterValue::new(name, version))
    }

    /// Shorthand for a backend group
    #[must_use]
    pub fn backends(flags: &[(&str, &str)]) -> Self {
        Self::Backends(BackendGroup::new(
            flags
                .iter()
                .map(|(name, version)| ParameterValue::new(*name, *version))
                .collect(),
        ))
    }

    /// The parameter value, if this is not a backend group
    #[must_use]
    pub fn as_parameter(&self) -> Option<&ParameterValue> {
        match self {
            Self::Parameter(value) => Some(value),
            Self::Backends(_) => None,
        }
    }

    /// The backend group, if this is one
    #[must_use]
    pub fn as_backends(&self) -> Option<&BackendGroup> {
        match self {
            Self::Parameter(_) => None,
            Self::Backends(group) => Some(group),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(value) => value.fmt(f),
            Self::Backends(group) => group.fmt(f),
        }
    }
}

/// One axis of the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Case-sensitive identifier, e.g. `HOST_COMPILER`
    pub name: String,
    /// Candidate values in configuration order
    pub values: Vec<Value>,
}

impl Field {
    /// Create a field
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::malformed("", "field identifier is empty"));
        }
        if self.values.is_empty() {
            return Err(Error::malformed(&self.name, "field has no candidate values"));
        }
        let is_backends = self.name == BACKENDS;
        for value in &self.values {
            match value {
                Value::Backends(group) if !is_backends => {
                    return Err(Error::malformed(
                        &self.name,
                        format!("only {BACKENDS} may hold backend groups, found {group}"),
                    ));
                }
                Value::Backends(group) if group.is_empty() => {
                    return Err(Error::malformed(&self.name, "backend group is empty"));
                }
                Value::Parameter(value) if is_backends => {
                    return Err(Error::malformed(
                        &self.name,
                        format!("entries must be sequences of (name, version) pairs, found {value}"),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Validated, immutable set of fields in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParameterMatrix {
    fields: Vec<Field>,
}

impl ParameterMatrix {
    /// Validate and build a matrix
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMatrix`] for empty or duplicate identifiers, fields
    /// without values, or backend groups outside `BACKENDS` (and vice versa).
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            field.validate()?;
            if fields[..i].iter().any(|other| other.name == field.name) {
                return Err(Error::malformed(&field.name, "duplicate field identifier"));
            }
        }
        Ok(Self { fields })
    }

    /// Start a builder
    #[must_use]
    pub fn builder() -> MatrixBuilder {
        MatrixBuilder::default()
    }

    /// Field identifiers in configuration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Candidate values of a field
    #[must_use]
    pub fn values_of(&self, field: &str) -> Option<&[Value]> {
        self.position(field).map(|i| self.fields[i].values.as_slice())
    }

    /// All fields
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Position of a field in configuration order
    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    /// True if the matrix has the field
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the matrix has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size of the unfiltered combination space, saturating at `u128::MAX`
    #[must_use]
    pub fn raw_combination_count(&self) -> u128 {
        self.fields
            .iter()
            .fold(1u128, |acc, f| acc.saturating_mul(f.values.len() as u128))
    }
}

/// Incremental construction of a [`ParameterMatrix`]
#[derive(Debug, Default)]
pub struct MatrixBuilder {
    fields: Vec<Field>,
}

impl MatrixBuilder {
    /// Append an ordinary field
    #[must_use]
    pub fn parameter(mut self, name: &str, values: &[(&str, &str)]) -> Self {
        self.fields.push(Field::new(
            name,
            values
                .iter()
                .map(|(n, v)| Value::parameter(*n, *v))
                .collect(),
        ));
        self
    }

    /// Append the `BACKENDS` field
    #[must_use]
    pub fn backends(mut self, groups: &[&[(&str, &str)]]) -> Self {
        self.fields.push(Field::new(
            BACKENDS,
            groups.iter().map(|group| Value::backends(group)).collect(),
        ));
        self
    }

    /// Append a prebuilt field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// See [`ParameterMatrix::new`].
    pub fn build(self) -> Result<ParameterMatrix> {
        ParameterMatrix::new(self.fields)
    }
}
