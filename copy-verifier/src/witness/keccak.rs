// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::util::{horner, rlc, serialize_columns};
use eth_types::{keccak256, Field};
use serde::{Serialize, Serializer};

/// Keccak table row: the hash of an input identified by its length and
/// Horner accumulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row<F> {
    pub input_len: F,
    pub input_rlc: F,
    /// RLC of the little-endian digest bytes
    pub output_rlc: F,
}

impl<F: Field> Row<F> {
    pub fn new(input: &[u8], challenge: F) -> Self {
        let mut digest = keccak256(input);
        digest.reverse();
        Self {
            input_len: F::from(input.len() as u64),
            input_rlc: horner(input, challenge),
            output_rlc: rlc(&digest, challenge),
        }
    }

    pub fn columns(&self) -> [(&'static str, F); 3] {
        [
            ("input_len", self.input_len),
            ("input_rlc", self.input_rlc),
            ("output_rlc", self.output_rlc),
        ]
    }
}

impl<F: Field> Serialize for Row<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(serializer, "Row", &self.columns())
    }
}
