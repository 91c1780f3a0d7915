// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use super::constraint_builder::ConstraintBuilder;
use super::word_iterator::WordIterator;
use crate::constant::WORD_LENGTH;
use crate::error::FailureKind;
use eth_types::Field;
use gadgets::util::select;

/// Accumulates the bytes of a word with the reversed Horner's rule.
///
/// For `i` in `[0, 32)` we want `final_rlc = Σ byte[i]·r^i`. With `X = r^-1`
/// the accumulator `acc[i] = acc[i-1]·X + byte[i]` starts at the highest
/// power and ends with `final_rlc = r^31·acc[31]`. It is checked without an
/// inversion as `(acc[i] - byte[i])·r == acc[i-1]`.
#[derive(Clone, Copy, Debug)]
pub struct WordRlcGadget<F> {
    pub word_iter: WordIterator<F>,
    pub rlc_acc: F,
}

impl<F: Field> WordRlcGadget<F> {
    pub fn new(word_iter: WordIterator<F>, rlc_acc: F) -> Self {
        Self { word_iter, rlc_acc }
    }

    /// RLC of the whole word. Only meaningful on its last byte.
    pub fn get_final_rlc(&self, r: F) -> F {
        r.pow_vartime([WORD_LENGTH as u64 - 1]) * self.rlc_acc
    }
}

/// Verify that the accumulator of `curr` includes `curr_byte` on top of the
/// accumulator of `prev`, or starts from it at a word start.
pub fn verify_step_word_rlc<F: Field>(
    cb: &mut ConstraintBuilder<F>,
    name: &'static str,
    r: F,
    prev: &WordRlcGadget<F>,
    curr: &WordRlcGadget<F>,
    curr_byte: F,
) {
    let prev_acc = select(curr.word_iter.is_word_start, F::ZERO, prev.rlc_acc);
    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(curr.word_iter.is_in_word, |cb| {
            cb.require_equal(name, (curr.rlc_acc - curr_byte) * r, prev_acc);
        });
    });
}
