// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use super::constraint_builder::ConstraintBuilder;
use crate::error::FailureKind;
use crate::witness::copy::Row;
use eth_types::Field;

/// The current RW counter and the RW operations the event still owes
#[derive(Clone, Copy, Debug)]
pub struct RwcGadget<F> {
    pub rw_counter: F,
    pub rwc_inc_left: F,
}

impl<F: Field> RwcGadget<F> {
    pub fn new(row: &Row<F>) -> Self {
        Self {
            rw_counter: row.rw_counter,
            rwc_inc_left: row.rwc_inc_left,
        }
    }
}

/// While the event runs, propagate the counter from `rg_0` to the next row
/// after `rwc_diff_0` operations on `rg_0`.
pub fn verify_row_rw_counter<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    enabled: F,
    rg_0: &RwcGadget<F>,
    rg_1: &RwcGadget<F>,
    rwc_diff_0: F,
) {
    cb.kind(FailureKind::Accounting, |cb| {
        cb.condition(enabled, |cb| {
            cb.require_equal(
                "rw_counter advances by the RW operations of the row",
                rg_1.rw_counter,
                rg_0.rw_counter + rwc_diff_0,
            );
            cb.require_equal(
                "rwc_inc_left decreases by the RW operations of the row",
                rg_1.rwc_inc_left,
                rg_0.rwc_inc_left - rwc_diff_0,
            );
        });
    });
}
