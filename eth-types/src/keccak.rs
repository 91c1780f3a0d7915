// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! Keccak-256 helper.

use sha3::{Digest, Keccak256};

/// Computes the Keccak-256 digest of the input bytes.
pub fn keccak256<T: AsRef<[u8]>>(input: T) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input.as_ref());
    hasher.finalize().into()
}
