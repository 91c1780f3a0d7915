// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! WordIterator makes sure a word is processed in full.
//!
//! When `must_run = 1` on any row, the iterator has to be enabled for a whole
//! word of `WORD_LENGTH` rows around it, before, at and after that row. A word
//! may also run where it does not have to. The gadget marks the start and the
//! end of every word.

use super::constraint_builder::ConstraintBuilder;
use crate::constant::WORD_LENGTH;
use crate::error::FailureKind;
use crate::witness::copy::Row;
use eth_types::Field;
use gadgets::simple_is_zero::{is_equal, is_zero};
use gadgets::util::{expr_or, not};

#[derive(Clone, Copy, Debug)]
pub struct WordIterator<F> {
    pub is_in_word: F,
    pub position_in_word: F,
    pub is_word_start: F,
    pub is_word_end: F,
}

impl<F: Field> WordIterator<F> {
    pub fn new(row: &Row<F>) -> Self {
        Self {
            is_in_word: row.is_in_word,
            position_in_word: row.position_in_word,
            is_word_start: row.is_word_start,
            is_word_end: row.is_word_end,
        }
    }

    /// This row and the next one are part of the same word
    pub fn is_continue(&self) -> F {
        self.is_in_word * not(self.is_word_end)
    }

    /// This row and the previous one are part of the same word
    pub fn is_continue_backwards(&self) -> F {
        self.is_in_word * not(self.is_word_start)
    }

    /// Address of the first byte of the word
    pub fn address_at_start(&self, address: F) -> F {
        address - (self.position_in_word - F::ONE)
    }
}

/// Verify the transition from `curr` to `next` of the same side. Returns
/// whether both rows are inside the same word.
pub fn verify_step_word_iterator<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    curr: &WordIterator<F>,
    next: &WordIterator<F>,
    can_start: F,
    must_run: F,
) -> F {
    cb.kind(FailureKind::Malformed, |cb| {
        cb.condition(must_run, |cb| {
            cb.require_equal("word must run here", curr.is_in_word, F::ONE);
        });
        cb.condition(curr.is_word_start, |cb| {
            cb.require_equal("word can start here", can_start, F::ONE);
        });

        cb.require_equal(
            "is_in_word == (position_in_word != 0)",
            curr.is_in_word,
            not(is_zero(curr.position_in_word)),
        );
        cb.require_equal(
            "is_word_start == (position_in_word == 1)",
            curr.is_word_start,
            is_equal(curr.position_in_word, F::ONE),
        );
        cb.require_equal(
            "is_word_end == (position_in_word == 32)",
            curr.is_word_end,
            is_equal(curr.position_in_word, F::from(WORD_LENGTH as u64)),
        );
    });

    // forwards from a running row, or backwards into a running row
    let word_continue = expr_or(curr.is_continue(), next.is_continue_backwards());
    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(word_continue, |cb| {
            cb.require_equal(
                "position_in_word increments by one",
                next.position_in_word,
                curr.position_in_word + F::ONE,
            );
        });
    });
    word_continue
}
