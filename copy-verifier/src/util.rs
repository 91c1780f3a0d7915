// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use eth_types::{field_to_string, Field};
use serde::ser::SerializeStruct;
use serde::Serializer;
use std::str::FromStr;

/// Random linear combination `Σ bytes[i] * r^i`
pub fn rlc<F: Field>(bytes: &[u8], r: F) -> F {
    bytes
        .iter()
        .rev()
        .fold(F::ZERO, |acc, byte| acc * r + F::from(*byte as u64))
}

/// Horner's rule from the first byte: `Σ bytes[i] * r^(n-1-i)`
pub fn horner<F: Field>(bytes: &[u8], r: F) -> F {
    bytes
        .iter()
        .fold(F::ZERO, |acc, byte| acc * r + F::from(*byte as u64))
}

/// Read an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn read_env_var<T: Clone + FromStr>(var_name: &'static str, default: T) -> T {
    std::env::var(var_name)
        .map(|s| s.parse::<T>().unwrap_or_else(|_| default.clone()))
        .unwrap_or(default)
}

/// Serialize named field elements as a struct of printable strings.
pub(crate) fn serialize_columns<F: Field, S: Serializer>(
    serializer: S,
    name: &'static str,
    columns: &[(&'static str, F)],
) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct(name, columns.len())?;
    for (column, value) in columns {
        state.serialize_field(column, &field_to_string(value))?;
    }
    state.end()
}
