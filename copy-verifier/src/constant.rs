// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

/// Number of bytes of a word processed by one RW operation
pub const WORD_LENGTH: usize = 32;
/// Memory addresses (and any other non-log copy address) fit in 5 bytes
pub const N_BYTES_MEMORY_ADDRESS: usize = 5;

/// Tx log data addresses are `offset + (Data << TX_LOG_FIELD_SHIFT) + (log_id << TX_LOG_ID_SHIFT)`
pub const TX_LOG_FIELD_SHIFT: u32 = 32;
pub const TX_LOG_ID_SHIFT: u32 = 48;

/// Upper bound of copy rows, overridden at runtime by `COPY_MAX_ROWS`
#[cfg(not(feature = "k_11"))]
pub const MAX_NUM_ROW: usize = 280000;
#[cfg(feature = "k_11")]
pub const MAX_NUM_ROW: usize = 2048;

pub(crate) const ENV_MAX_ROWS: &str = "COPY_MAX_ROWS";
pub(crate) const ENV_VERIFY_PARALLEL: &str = "COPY_VERIFY_PARALLEL";
