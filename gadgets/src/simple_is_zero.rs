// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! SimpleIsZero gadget helps to generate the value 1-value*value_inv.

use eth_types::Field;

/// SimpleIsZero holds a value together with its inverse (zero when the value
/// is zero).
#[derive(Clone, Debug)]
pub struct SimpleIsZero<F> {
    value: F,
    value_inv: F,
}

impl<F: Field> SimpleIsZero<F> {
    /// given value, return a new SimpleIsZero instance
    pub fn new(value: F) -> Self {
        Self {
            value,
            value_inv: Option::from(value.invert()).unwrap_or(F::ZERO),
        }
    }

    /// return 1 - value * value_inv
    ///
    /// if value=0 return 1
    /// else return 0
    pub fn expr(&self) -> F {
        F::ONE - self.value * self.value_inv
    }
}

/// Returns 1 when `value` is exactly zero in the field, 0 otherwise.
pub fn is_zero<F: Field>(value: F) -> F {
    SimpleIsZero::new(value).expr()
}

/// Returns 1 when `lhs` and `rhs` are the same field element, 0 otherwise.
pub fn is_equal<F: Field>(lhs: F, rhs: F) -> F {
    is_zero(lhs - rhs)
}
