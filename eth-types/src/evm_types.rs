// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! Byte level classification of EVM bytecode.

/// `PUSH1` opcode
pub const PUSH1: u8 = 0x60;
/// `PUSH32` opcode
pub const PUSH32: u8 = 0x7f;

/// Number of immediate bytes following `byte` when it is executed as an
/// opcode. Zero for everything but `PUSH1..=PUSH32`.
pub fn push_data_size(byte: u8) -> usize {
    if (PUSH1..=PUSH32).contains(&byte) {
        (byte - PUSH1 + 1) as usize
    } else {
        0
    }
}

/// For every position of `code`, whether the byte is an opcode (`true`) or
/// the immediate data of a preceding push (`false`).
pub fn code_flags(code: &[u8]) -> Vec<bool> {
    let mut flags = Vec::with_capacity(code.len());
    let mut push_data_left = 0;
    for byte in code {
        if push_data_left > 0 {
            flags.push(false);
            push_data_left -= 1;
        } else {
            flags.push(true);
            push_data_left = push_data_size(*byte);
        }
    }
    flags
}
