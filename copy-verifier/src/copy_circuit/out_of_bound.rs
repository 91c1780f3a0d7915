// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use super::constraint_builder::ConstraintBuilder;
use crate::error::FailureKind;
use crate::witness::copy::Row;
use eth_types::Field;
use gadgets::simple_is_zero::is_equal;
use gadgets::util::not;

/// Tracks `is_pad = (addr >= src_addr_end)` on the source side.
///
/// The event must start at or before `src_addr_end`, otherwise `is_pad` stays
/// 0 and the extra RW operations are rejected by the RW ledger.
#[derive(Clone, Copy, Debug)]
pub struct OutOfBoundGadget<F> {
    pub is_pad: F,
    pub is_read: F,
    pub is_at_addr_end: F,
}

impl<F: Field> OutOfBoundGadget<F> {
    pub fn new(row: &Row<F>) -> Self {
        Self {
            is_pad: row.is_pad,
            is_read: row.q_step,
            is_at_addr_end: is_equal(row.addr, row.src_addr_end),
        }
    }
}

/// `curr` and `next` are consecutive rows of the same side. `is_start` marks
/// the first row of an event and `next_continue` whether `next` belongs to
/// the same event as `curr`.
pub fn verify_row_oob<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    curr: &OutOfBoundGadget<F>,
    next: &OutOfBoundGadget<F>,
    is_start: F,
    next_continue: F,
) {
    cb.kind(FailureKind::Malformed, |cb| {
        cb.require_boolean("is_pad is boolean", curr.is_pad);
        cb.condition(not(curr.is_read), |cb| {
            cb.require_zero("writer row is never padded", curr.is_pad);
        });
    });

    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(is_start, |cb| {
            cb.require_equal(
                "is_pad starts at the source boundary",
                curr.is_pad,
                curr.is_at_addr_end,
            );
        });
        cb.condition(next_continue * next.is_at_addr_end, |cb| {
            cb.require_equal("is_pad switches on at src_addr_end", next.is_pad, F::ONE);
        });
        cb.condition(next_continue * not(next.is_at_addr_end), |cb| {
            cb.require_equal("is_pad is carried", next.is_pad, curr.is_pad);
        });
    });
}
