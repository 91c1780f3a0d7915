// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::util::serialize_columns;
use eth_types::Field;
use serde::{Serialize, Serializer};
use strum_macros::{Display, EnumString};

/// One operation of the RW log. Copies read and write whole words, the value
/// is the RLC of the 32 bytes starting at `address`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row<F> {
    // auto increment counter, unique for each row
    pub rw_counter: F,
    // whether the operation is a write
    pub is_write: F,
    // Type of value, memory or tx log
    pub tag: Tag,
    // call id for memory, tx id for logs
    pub id: F,
    // address of the first byte of the word
    pub address: F,
    pub value: F,
    pub value_prev: F,
}

impl<F: Field> Row<F> {
    pub fn columns(&self) -> [(&'static str, F); 7] {
        [
            ("rw_counter", self.rw_counter),
            ("is_write", self.is_write),
            ("tag", self.tag.value()),
            ("id", self.id),
            ("address", self.address),
            ("value", self.value),
            ("value_prev", self.value_prev),
        ]
    }
}

impl<F: Field> Serialize for Row<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(serializer, "Row", &self.columns())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, EnumString, Display)]
pub enum Tag {
    #[default]
    Memory,
    TxLog,
}

impl From<Tag> for usize {
    fn from(t: Tag) -> Self {
        t as usize
    }
}

impl Tag {
    pub fn value<F: Field>(&self) -> F {
        F::from(*self as u64)
    }
}
