//! Combinations and jobs
//!
//! A [`Combination`] is a view over a [`ParameterMatrix`] that assigns at most
//! one value per field; presence is explicit, so a filter asking for a field
//! that is not assigned gets `None`. A [`Job`] is the owned, complete form that
//! leaves the engine.

use crate::error::{Error, Result};
use crate::fields::BACKENDS;
use crate::parameter::{BackendGroup, ParameterMatrix, ParameterValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Partial or complete assignment of values to the fields of a matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'m> {
    matrix: &'m ParameterMatrix,
    picks: Vec<Option<usize>>,
}

impl<'m> Combination<'m> {
    /// Empty combination over a matrix
    #[must_use]
    pub fn new(matrix: &'m ParameterMatrix) -> Self {
        Self {
            matrix,
            picks: vec![None; matrix.len()],
        }
    }

    /// Build a combination from value positions (one slot per field)
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownValue`] if a slot points past the field's values or
    /// the slot count differs from the field count.
    pub fn from_picks(matrix: &'m ParameterMatrix, picks: &[Option<usize>]) -> Result<Self> {
        if picks.len() != matrix.len() {
            return Err(Error::UnknownValue {
                field: String::new(),
                value: format!("{} slots for {} fields", picks.len(), matrix.len()),
            });
        }
        let mut combination = Self::new(matrix);
        for (field, pick) in picks.iter().enumerate() {
            if let Some(value) = *pick {
                let f = &matrix.fields()[field];
                if value >= f.values.len() {
                    return Err(Error::UnknownValue {
                        field: f.name.clone(),
                        value: format!("#{value}"),
                    });
                }
                combination.picks[field] = Some(value);
            }
        }
        Ok(combination)
    }

    /// Matrix this combination ranges over
    #[must_use]
    pub fn matrix(&self) -> &'m ParameterMatrix {
        self.matrix
    }

    /// Assign a value by positions
    ///
    /// # Panics
    ///
    /// Panics if `field` is not a field position of the matrix or `value` is
    /// not a value position of that field. Use [`Combination::with`] for
    /// checked assignment.
    pub fn assign(&mut self, field: usize, value: usize) {
        let count = self.matrix.fields()[field].values.len();
        assert!(
            value < count,
            "value #{value} out of range for field #{field} ({count} values)"
        );
        self.picks[field] = Some(value);
    }

    /// Remove the assignment of a field
    pub fn unassign(&mut self, field: usize) {
        self.picks[field] = None;
    }

    /// Assign a field by name to one of its candidate values
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] or [`Error::UnknownValue`] if the field or
    /// value is not part of the matrix.
    pub fn with(mut self, field: &str, value: &Value) -> Result<Self> {
        let position = self
            .matrix
            .position(field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))?;
        let index = self.matrix.fields()[position]
            .values
            .iter()
            .position(|candidate| candidate == value)
            .ok_or_else(|| Error::UnknownValue {
                field: field.to_string(),
                value: value.to_string(),
            })?;
        self.picks[position] = Some(index);
        Ok(self)
    }

    /// Value assigned to a field, `None` if the field is absent
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'m Value> {
        let position = self.matrix.position(field)?;
        self.value_at(position)
    }

    /// Value assigned to the field at a position
    #[must_use]
    pub fn value_at(&self, field: usize) -> Option<&'m Value> {
        let pick = (*self.picks.get(field)?)?;
        Some(&self.matrix.fields()[field].values[pick])
    }

    /// Parameter value of an ordinary field
    #[must_use]
    pub fn parameter(&self, field: &str) -> Option<&'m ParameterValue> {
        self.get(field).and_then(Value::as_parameter)
    }

    /// Selected backend group
    #[must_use]
    pub fn backends(&self) -> Option<&'m BackendGroup> {
        self.get(BACKENDS).and_then(Value::as_backends)
    }

    /// True if the field is assigned
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Value positions, one slot per field
    #[must_use]
    pub fn picks(&self) -> &[Option<usize>] {
        &self.picks
    }

    /// Number of assigned fields
    #[must_use]
    pub fn assigned(&self) -> usize {
        self.picks.iter().filter(|p| p.is_some()).count()
    }

    /// True if every field is assigned
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.picks.iter().all(Option::is_some)
    }

    /// Assigned `(field, value)` pairs in matrix order
    pub fn iter(&self) -> impl Iterator<Item = (&'m str, &'m Value)> + '_ {
        let matrix = self.matrix;
        self.picks.iter().enumerate().filter_map(move |(i, pick)| {
            pick.map(|v| {
                let field = &matrix.fields()[i];
                (field.name.as_str(), &field.values[v])
            })
        })
    }

    /// Owned job for a complete combination
    #[must_use]
    pub fn to_job(&self) -> Option<Job> {
        if !self.is_complete() {
            return None;
        }
        Some(Job {
            assignments: self
                .iter()
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect(),
        })
    }
}

/// Complete, admissible combination selected for output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    assignments: Vec<(String, Value)>,
}

impl Job {
    /// Value of a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.assignments
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// True if the job assigns `value` to `field`
    #[must_use]
    pub fn matches(&self, field: &str, value: &Value) -> bool {
        self.get(field) == Some(value)
    }

    /// `(field, value)` pairs in matrix order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.assignments
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of assigned fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True for the vacuous job of an empty matrix
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Human-readable job name, the values joined by `" | "`
    #[must_use]
    pub fn display_name(&self) -> String {
        self.assignments
            .iter()
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Re-attach the job to a matrix
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] or [`Error::UnknownValue`] if the job does not
    /// come from this matrix.
    pub fn combination<'m>(&self, matrix: &'m ParameterMatrix) -> Result<Combination<'m>> {
        self.assignments
            .iter()
            .try_fold(Combination::new(matrix), |combination, (field, value)| {
                combination.with(field, value)
            })
    }
}

impl Serialize for Job {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.assignments.len()))?;
        for (field, value) in &self.assignments {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
