// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::util::serialize_columns;
use eth_types::Field;
use serde::{Serialize, Serializer};
use strum_macros::Display;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row<F> {
    /// tx_id (start from 1)
    pub tx_id: F,
    pub tag: Tag,
    /// byte offset for TxCalldata, 0 otherwise
    pub index: F,
    pub value: F,
}

/// Tx context field tags used by copies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Tag {
    #[default]
    TxCallDataLength,
    TxCalldata,
}

impl Tag {
    pub fn value<F: Field>(&self) -> F {
        F::from(*self as u64)
    }
}

/// Tx log field tags, the data tag is folded into log addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTag {
    Address = 1,
    Topic,
    Data,
}

impl<F: Field> Row<F> {
    pub fn columns(&self) -> [(&'static str, F); 4] {
        [
            ("tx_id", self.tx_id),
            ("tag", self.tag.value()),
            ("index", self.index),
            ("value", self.value),
        ]
    }

    /// Length row followed by one row per calldata byte
    pub fn from_calldata(tx_id: u64, calldata: &[u8]) -> Vec<Self> {
        let tx_id = F::from(tx_id);
        std::iter::once(Row {
            tx_id,
            tag: Tag::TxCallDataLength,
            index: F::ZERO,
            value: F::from(calldata.len() as u64),
        })
        .chain(calldata.iter().enumerate().map(|(index, byte)| Row {
            tx_id,
            tag: Tag::TxCalldata,
            index: F::from(index as u64),
            value: F::from(*byte as u64),
        }))
        .collect()
    }
}

impl<F: Field> Serialize for Row<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(serializer, "Row", &self.columns())
    }
}
