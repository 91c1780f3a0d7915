// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! Utility functions over assigned values.
use eth_types::Field;

/// Returns `when_true` when `condition == 1` and `when_false` when
/// `condition == 0`. The condition must already be constrained to be boolean.
pub fn select<F: Field>(condition: F, when_true: F, when_false: F) -> F {
    condition * when_true + (F::ONE - condition) * when_false
}

/// Returns `1 - a` for a boolean `a`.
pub fn not<F: Field>(a: F) -> F {
    F::ONE - a
}

/// Returns `a OR b` for boolean `a` and `b`.
pub fn expr_or<F: Field>(a: F, b: F) -> F {
    a + b - a * b
}

/// Returns 2**by as Field
pub fn pow_of_two<F: Field>(by: usize) -> F {
    F::from(2).pow_vartime([by as u64])
}
