//! Single-row matrices for rule tests

use jobcov_gen::fields::BACKENDS;
use jobcov_gen::{Combination, Field, ParameterMatrix, Value};

/// Matrix with one value per field
pub(crate) fn row(fields: &[(&str, (&str, &str))]) -> ParameterMatrix {
    row_with_backends(fields, None)
}

/// Matrix with one value per field plus an optional `BACKENDS` group
pub(crate) fn row_with_backends(
    fields: &[(&str, (&str, &str))],
    backends: Option<&[(&str, &str)]>,
) -> ParameterMatrix {
    let mut all: Vec<Field> = fields
        .iter()
        .map(|(field, (name, version))| Field::new(*field, vec![Value::parameter(*name, *version)]))
        .collect();
    if let Some(group) = backends {
        all.push(Field::new(BACKENDS, vec![Value::backends(group)]));
    }
    ParameterMatrix::new(all).unwrap()
}

/// The single complete combination of a one-value-per-field matrix
pub(crate) fn complete(matrix: &ParameterMatrix) -> Combination<'_> {
    Combination::from_picks(matrix, &vec![Some(0); matrix.len()]).unwrap()
}
