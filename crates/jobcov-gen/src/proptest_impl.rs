//! Proptest strategies for property-based testing
//!
//! Small random matrices with random blacklist filters, sized so the
//! exhaustive cross-checks in the properties stay cheap.

use crate::filter::{ChainPosition, FilterChain, ForbidPair};
use crate::parameter::{Field, ParameterMatrix, Value};
use proptest::prelude::*;

/// Strategy for generating a field with `1..=max_values` values
pub fn field_strategy(index: usize, max_values: usize) -> impl Strategy<Value = Field> {
    (1..=max_values).prop_map(move |count| {
        Field::new(
            format!("F{index}"),
            (0..count)
                .map(|v| Value::parameter(format!("f{index}"), format!("{v}")))
                .collect(),
        )
    })
}

/// Strategy for generating matrices of 1 to 5 fields with 1 to 3 values each
pub fn matrix_strategy() -> impl Strategy<Value = ParameterMatrix> {
    (1usize..=5)
        .prop_flat_map(|fields| {
            (0..fields)
                .map(|i| field_strategy(i, 3))
                .collect::<Vec<_>>()
        })
        .prop_filter_map("valid matrix", |fields| ParameterMatrix::new(fields).ok())
}

/// Strategy for generating a blacklist chain for a matrix
///
/// Each forbidden pair is drawn as raw indices and folded onto the matrix;
/// pairs that land on a single field are skipped.
pub fn blacklist_strategy(matrix: ParameterMatrix) -> impl Strategy<Value = FilterChain> {
    prop::collection::vec((0usize..8, 0usize..8, 0usize..8, 0usize..8), 0..4).prop_map(
        move |pairs| {
            let fields = matrix.fields();
            let mut chain = FilterChain::new();
            for (fa, va, fb, vb) in pairs {
                let (fa, fb) = (fa % fields.len(), fb % fields.len());
                if fa == fb {
                    continue;
                }
                let a = &fields[fa];
                let b = &fields[fb];
                chain.insert(
                    ChainPosition::Core,
                    ForbidPair::new(
                        (a.name.as_str(), a.values[va % a.values.len()].clone()),
                        (b.name.as_str(), b.values[vb % b.values.len()].clone()),
                    ),
                );
            }
            chain
        },
    )
}

/// Strategy for generating a matrix with a blacklist chain
pub fn constrained_matrix_strategy() -> impl Strategy<Value = (ParameterMatrix, FilterChain)> {
    matrix_strategy().prop_flat_map(|matrix| {
        let chain = blacklist_strategy(matrix.clone());
        (Just(matrix), chain)
    })
}

/// Strategy for generating pair sizes
pub fn pair_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=4
}
