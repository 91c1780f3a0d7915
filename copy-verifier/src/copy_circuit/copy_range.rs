// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use super::constraint_builder::ConstraintBuilder;
use crate::error::FailureKind;
use crate::witness::copy::Row;
use eth_types::Field;
use gadgets::util::not;

/// Tracks whether a row is inside the copy range of its event. Past the copy
/// range nothing is copied, but words may still run up to their end.
#[derive(Clone, Copy, Debug)]
pub struct CopyRangeGadget<F> {
    pub is_copy_range: F,
    pub is_first: F,
    pub is_last: F,
    /// reader (1) or writer (0)
    pub q_step: F,
}

impl<F: Field> CopyRangeGadget<F> {
    pub fn new(row: &Row<F>) -> Self {
        Self {
            is_copy_range: row.is_copy_range,
            is_first: row.is_first,
            is_last: row.is_last,
            q_step: row.q_step,
        }
    }

    /// This row and the next one are both in the copy range
    pub fn is_continue(&self) -> F {
        self.is_copy_range * not(self.is_last)
    }
}

pub fn verify_row_copy_range<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    curr: &CopyRangeGadget<F>,
    next: &CopyRangeGadget<F>,
) {
    cb.kind(FailureKind::Malformed, |cb| {
        cb.require_boolean("is_first is boolean", curr.is_first);
        cb.require_boolean("is_last is boolean", curr.is_last);
        cb.require_boolean("q_step is boolean", curr.q_step);
        cb.require_zero("writer row is not first", not(curr.q_step) * curr.is_first);
        cb.require_zero("reader row is not last", curr.q_step * curr.is_last);
        cb.require_equal(
            "reader and writer rows alternate",
            next.q_step,
            not(curr.q_step),
        );

        // is_copy_range[i+1] = is_first[i+1] OR (is_copy_range[i] AND NOT is_last[i])
        cb.require_equal(
            "is_copy_range continues until is_last",
            next.is_copy_range,
            next.is_first + not(next.is_first) * curr.is_continue(),
        );
    });
}
