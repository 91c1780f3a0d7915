// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! SimpleLtGadget gadget
use crate::util::pow_of_two;
use eth_types::Field;
use std::cmp::Ordering;

/// Maximum number of bytes of an integer that can be compared: two of them
/// must be added in a single field element without wrapping.
pub const MAX_N_BYTES: usize = 31;

/// Returns `1` when `lhs < rhs`, and returns `0` otherwise.
/// lhs and rhs `< 256**N_BYTES`
/// `N_BYTES` is required to be `<= MAX_N_BYTES` to prevent overflow:
/// values are stored in a single field element and two of these are added
/// together.
/// The equation that is enforced is `lhs - rhs == diff - (lt * range)`.
/// Because all values are `<= 256**N_BYTES` and `lt` is boolean, `lt` can only
/// be `1` when `lhs < rhs`.
#[derive(Clone, Debug)]
pub struct SimpleLtGadget<F, const N_BYTES: usize> {
    lhs: F,
    rhs: F,
    lt: F, // `1` when `lhs < rhs`, `0` otherwise.
    diff: F, /* `diff` equals `lhs - rhs` if `lhs >= rhs`,
              * `lhs - rhs + range` otherwise. */
    range: F, // The range of the inputs, `256**N_BYTES`
}

impl<F: Field, const N_BYTES: usize> SimpleLtGadget<F, N_BYTES> {
    /// Returns SimpleLtGadget. Panics when an operand does not fit `N_BYTES`.
    pub fn new(lhs: F, rhs: F) -> Self {
        let range = pow_of_two(N_BYTES * 8);
        let lt = lt(lhs, rhs, N_BYTES);
        Self {
            lhs,
            rhs,
            lt,
            diff: lhs - rhs + lt * range,
            range,
        }
    }

    /// Returns constraints
    pub fn get_constraints(&self) -> Vec<(&'static str, F)> {
        // The equation we require to hold: `lhs - rhs == diff - (lt * range)`.
        vec![(
            "lhs - rhs == diff - (lt ⋅ range)",
            (self.lhs - self.rhs) - (self.diff - self.lt * self.range),
        )]
    }

    /// Returns SimpleLtGadget lt value
    pub fn expr(&self) -> F {
        self.lt
    }
}

fn bounded_repr<F: Field>(value: F, n_bytes: usize, side: &str) -> Vec<u8> {
    match value.to_bounded_bytes(n_bytes) {
        Some(bytes) => bytes,
        None => panic!("{side} {value:?} exceeds the range of {n_bytes} bytes"),
    }
}

fn cmp_bounded<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> Ordering {
    assert!(
        n_bytes <= MAX_N_BYTES,
        "Too many bytes to composite an integer in field"
    );
    let lhs = bounded_repr(lhs, n_bytes, "lhs");
    let rhs = bounded_repr(rhs, n_bytes, "rhs");
    // little endian, compare from the most significant byte
    lhs.iter().rev().cmp(rhs.iter().rev())
}

/// Returns 1 when `lhs < rhs` as unsigned integers.
///
/// Only valid when both operands are known to fit `n_bytes` bytes; panics
/// otherwise, since the field order would make the answer meaningless.
pub fn lt<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> F {
    F::from((cmp_bounded(lhs, rhs, n_bytes) == Ordering::Less) as u64)
}

/// Returns `(lt, eq)` for `lhs` and `rhs` as unsigned integers, under the same
/// precondition as [`lt`].
pub fn compare<F: Field>(lhs: F, rhs: F, n_bytes: usize) -> (F, F) {
    let ordering = cmp_bounded(lhs, rhs, n_bytes);
    (
        F::from((ordering == Ordering::Less) as u64),
        F::from((ordering == Ordering::Equal) as u64),
    )
}
