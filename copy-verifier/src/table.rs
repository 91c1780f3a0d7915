// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::witness::{bytecode, keccak, public, state, Witness};
use eth_types::Field;

/// A fact the copy table looks up in an external table. Every column of the
/// entry has to match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupEntry<F> {
    /// Lookup to the RW log, one word read or written by a copy
    Rw {
        rw_counter: F,
        is_write: F,
        /// Memory or TxLog, as a field value
        tag: F,
        /// Call id for memory, tx id for logs
        id: F,
        /// Address of the first byte of the word
        address: F,
        /// RLC of the word after the operation
        value: F,
        /// RLC of the word before the operation
        value_prev: F,
    },
    /// Lookup to the bytecode table
    Bytecode {
        code_hash: F,
        /// Header or Byte
        tag: F,
        /// Program counter or the index of bytecodes
        index: F,
        is_code: F,
        value: F,
    },
    /// Lookup to the tx table
    Tx {
        tx_id: F,
        tag: F,
        index: F,
        value: F,
    },
}

/// Read-only view of the external tables of a witness
#[derive(Clone, Copy, Debug)]
pub struct Tables<'a, F> {
    pub state: &'a [state::Row<F>],
    pub bytecode: &'a [bytecode::Row<F>],
    pub public: &'a [public::Row<F>],
    pub keccak: &'a [keccak::Row<F>],
}

impl<'a, F: Field> Tables<'a, F> {
    pub fn new(witness: &'a Witness<F>) -> Self {
        Self {
            state: &witness.state,
            bytecode: &witness.bytecode,
            public: &witness.public,
            keccak: &witness.keccak,
        }
    }

    /// Number of facts matching the entry. A lookup holds when this is
    /// exactly one.
    pub fn matches(&self, entry: &LookupEntry<F>) -> usize {
        match entry {
            LookupEntry::Rw {
                rw_counter,
                is_write,
                tag,
                id,
                address,
                value,
                value_prev,
            } => self
                .state
                .iter()
                .filter(|row| {
                    row.columns().map(|(_, v)| v)
                        == [*rw_counter, *is_write, *tag, *id, *address, *value, *value_prev]
                })
                .count(),
            LookupEntry::Bytecode {
                code_hash,
                tag,
                index,
                is_code,
                value,
            } => self
                .bytecode
                .iter()
                .filter(|row| {
                    row.columns().map(|(_, v)| v) == [*code_hash, *tag, *index, *is_code, *value]
                })
                .count(),
            LookupEntry::Tx {
                tx_id,
                tag,
                index,
                value,
            } => self
                .public
                .iter()
                .filter(|row| row.columns().map(|(_, v)| v) == [*tx_id, *tag, *index, *value])
                .count(),
        }
    }

    /// Digest RLC of the input with the given length and Horner accumulation,
    /// when exactly one Keccak row has them.
    pub fn keccak_lookup(&self, input_len: F, input_rlc: F) -> Option<F> {
        let mut found = self
            .keccak
            .iter()
            .filter(|row| row.input_len == input_len && row.input_rlc == input_rlc);
        match (found.next(), found.next()) {
            (Some(row), None) => Some(row.output_rlc),
            _ => None,
        }
    }
}
