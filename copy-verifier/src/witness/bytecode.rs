// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::util::serialize_columns;
use eth_types::evm_types::code_flags;
use eth_types::Field;
use serde::{Serialize, Serializer};
use strum_macros::Display;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row<F> {
    /// the code hash of the bytecode, encoded with the challenge
    pub code_hash: F,
    /// Header row carries the code length, Byte rows the bytes
    pub tag: Tag,
    /// the index that program counter points to
    pub index: F,
    /// whether the byte is an opcode rather than pushed data
    pub is_code: F,
    /// bytecode, operation code or pushed value
    pub value: F,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Tag {
    #[default]
    Header,
    Byte,
}

impl Tag {
    pub fn value<F: Field>(&self) -> F {
        F::from(*self as u64)
    }
}

impl<F: Field> Row<F> {
    pub fn columns(&self) -> [(&'static str, F); 5] {
        [
            ("code_hash", self.code_hash),
            ("tag", self.tag.value()),
            ("index", self.index),
            ("is_code", self.is_code),
            ("value", self.value),
        ]
    }

    /// Header row followed by one row per byte
    pub fn from_code(code: &[u8], code_hash: F) -> Vec<Self> {
        let header = Row {
            code_hash,
            tag: Tag::Header,
            index: F::ZERO,
            is_code: F::ZERO,
            value: F::from(code.len() as u64),
        };
        std::iter::once(header)
            .chain(
                code.iter()
                    .zip(code_flags(code))
                    .enumerate()
                    .map(|(index, (byte, is_code))| Row {
                        code_hash,
                        tag: Tag::Byte,
                        index: F::from(index as u64),
                        is_code: F::from(is_code as u64),
                        value: F::from(*byte as u64),
                    }),
            )
            .collect()
    }
}

impl<F: Field> Serialize for Row<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(serializer, "Row", &self.columns())
    }
}
