// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! # ZKEVM-Gadgets
//!
//! A collection of reusable gadgets for the copy verifier. The gadgets work on
//! assigned field values: every constraint is an element that must evaluate to
//! zero.

#![cfg_attr(docsrs, feature(doc_cfg))]
// We want to have UPPERCASE idents sometimes.
#![allow(clippy::upper_case_acronyms)]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::debug_assert_with_mut_call)]

pub mod simple_is_zero;
pub mod simple_lt;
pub mod util;

use eth_types::Field;

/// Restrict a value to be a boolean.
pub fn bool_check<F: Field>(value: F) -> F {
    range_check(value, 2)
}

/// Restrict a value such that 0 <= word < range.
pub fn range_check<F: Field>(word: F, range: usize) -> F {
    (1..range).fold(word, |acc, i| acc * (F::from(i as u64) - word))
}
