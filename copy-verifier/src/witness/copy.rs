// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::constant::WORD_LENGTH;
use crate::util::{horner, rlc, serialize_columns};
use crate::witness::state;
use eth_types::Field;
use serde::{Serialize, Serializer};
use strum_macros::{Display, EnumString};

/// One row of the copy table. A step is a reader row (`q_step = 1`)
/// immediately followed by a writer row (`q_step = 0`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row<F> {
    /// 1 on reader rows, 0 on writer rows
    pub q_step: F,
    /// First reader row of an event
    pub is_first: F,
    /// Last writer row inside the copy range of an event
    pub is_last: F,
    /// Whether the row belongs to the copy range of its event
    pub is_copy_range: F,
    /// Call id, tx id or code hash of the source (reader) or destination (writer)
    pub id: F,
    /// `CopyDataType` of the row
    pub tag: F,
    pub is_memory: F,
    pub is_bytecode: F,
    pub is_tx_calldata: F,
    pub is_tx_log: F,
    pub is_rlc_acc: F,
    /// Address of the byte on its side of the copy
    pub addr: F,
    /// Exclusive end of the valid source bytes
    pub src_addr_end: F,
    /// Bytes left to copy, counting the current step
    pub bytes_left: F,
    /// Byte value, or the accumulated RLC on an RlcAcc writer row
    pub value: F,
    /// Reversed Horner accumulator of the bytes as read
    pub rlc_acc: F,
    /// Reversed Horner accumulator of the bytes as updated, or the forward
    /// Horner accumulation on an RlcAcc writer row
    pub rlc_acc_update: F,
    /// Source address at or past `src_addr_end`
    pub is_pad: F,
    /// Bytecode only: the byte is an opcode and not push data
    pub is_code: F,
    pub rw_counter: F,
    /// RW operations the event still owes from this row on
    pub rwc_inc_left: F,
    pub is_in_word: F,
    /// 1..=32 inside a word, 0 outside
    pub position_in_word: F,
    pub is_word_start: F,
    pub is_word_end: F,
}

impl<F: Field> Row<F> {
    /// Column names and values in table order
    pub fn columns(&self) -> [(&'static str, F); 25] {
        [
            ("q_step", self.q_step),
            ("is_first", self.is_first),
            ("is_last", self.is_last),
            ("is_copy_range", self.is_copy_range),
            ("id", self.id),
            ("tag", self.tag),
            ("is_memory", self.is_memory),
            ("is_bytecode", self.is_bytecode),
            ("is_tx_calldata", self.is_tx_calldata),
            ("is_tx_log", self.is_tx_log),
            ("is_rlc_acc", self.is_rlc_acc),
            ("addr", self.addr),
            ("src_addr_end", self.src_addr_end),
            ("bytes_left", self.bytes_left),
            ("value", self.value),
            ("rlc_acc", self.rlc_acc),
            ("rlc_acc_update", self.rlc_acc_update),
            ("is_pad", self.is_pad),
            ("is_code", self.is_code),
            ("rw_counter", self.rw_counter),
            ("rwc_inc_left", self.rwc_inc_left),
            ("is_in_word", self.is_in_word),
            ("position_in_word", self.position_in_word),
            ("is_word_start", self.is_word_start),
            ("is_word_end", self.is_word_end),
        ]
    }

    fn set_tag(&mut self, tag: CopyDataType) {
        self.tag = tag.value();
        self.is_memory = F::from((tag == CopyDataType::Memory) as u64);
        self.is_bytecode = F::from((tag == CopyDataType::Bytecode) as u64);
        self.is_tx_calldata = F::from((tag == CopyDataType::TxCalldata) as u64);
        self.is_tx_log = F::from((tag == CopyDataType::TxLog) as u64);
        self.is_rlc_acc = F::from((tag == CopyDataType::RlcAcc) as u64);
    }

    fn set_position(&mut self, position: u64) {
        self.position_in_word = F::from(position);
        self.is_in_word = F::from((position != 0) as u64);
        self.is_word_start = F::from((position == 1) as u64);
        self.is_word_end = F::from((position == WORD_LENGTH as u64) as u64);
    }
}

impl<F: Field> Serialize for Row<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(serializer, "Row", &self.columns())
    }
}

/// Kind of data on one side of a copy.
/// Memory, Bytecode and TxCalldata can be read, Memory, TxLog and RlcAcc can
/// be written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, EnumString, Display)]
pub enum CopyDataType {
    #[default]
    /// Memory of a call
    Memory = 1,
    /// Bytecode of a contract
    Bytecode,
    /// Calldata of a transaction
    TxCalldata,
    /// Data of a transaction log
    TxLog,
    /// Random linear combination of the copied bytes
    RlcAcc,
}

impl From<CopyDataType> for usize {
    fn from(t: CopyDataType) -> Self {
        t as usize
    }
}

impl CopyDataType {
    pub fn value<F: Field>(&self) -> F {
        F::from(*self as u64)
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Memory | Self::Bytecode | Self::TxCalldata)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Memory | Self::TxLog | Self::RlcAcc)
    }

    /// Whether the data lives in the RW log and is accessed word by word
    pub fn is_rw(&self) -> bool {
        matches!(self, Self::Memory | Self::TxLog)
    }
}

/// Identifier of a copy side: a call or tx id, or a code hash
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberOrHash {
    Number(u64),
    Hash([u8; 32]),
}

impl Default for NumberOrHash {
    fn default() -> Self {
        NumberOrHash::Number(0)
    }
}

impl NumberOrHash {
    /// Encode into a field element. A hash is stored big-endian, its
    /// little-endian bytes are combined with the challenge.
    pub fn to_field<F: Field>(&self, challenge: F) -> F {
        match self {
            NumberOrHash::Number(n) => F::from(*n),
            NumberOrHash::Hash(h) => {
                let mut le_bytes = *h;
                le_bytes.reverse();
                rlc(&le_bytes, challenge)
            }
        }
    }
}

/// A request to copy `length` bytes from a source to a destination
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CopyEvent {
    pub src_type: CopyDataType,
    pub src_id: NumberOrHash,
    pub src_addr: u64,
    /// Bytes at or past this address read as zero
    pub src_addr_end: u64,
    pub dst_type: CopyDataType,
    pub dst_id: NumberOrHash,
    pub dst_addr: u64,
    pub length: u64,
    /// RW counter of the first RW operation of the event
    pub rw_counter: u64,
}

/// What the caller of a copy gets back
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyResult<F> {
    /// Number of RW operations issued by the copy
    pub rw_counter_increment: u64,
    /// Horner accumulation of the copied bytes, used with an RlcAcc
    /// destination
    pub rlc_result: F,
}

impl CopyEvent {
    /// Source start address, never past the end of the valid source
    pub fn src_addr_start(&self) -> u64 {
        self.src_addr.min(self.src_addr_end)
    }

    /// Number of valid (not padded) source bytes reachable by the copy
    pub fn valid_src_len(&self) -> u64 {
        (self.src_addr_end - self.src_addr_start()).min(self.length)
    }

    /// Number of steps the event occupies: the copy range, extended so that
    /// every word started in it can reach its end.
    pub fn num_steps(&self) -> u64 {
        let full_words = |n: u64| n.div_ceil(WORD_LENGTH as u64) * WORD_LENGTH as u64;
        let mut steps = self.length;
        if self.src_type.is_rw() {
            steps = steps.max(full_words(self.valid_src_len()));
        }
        if self.dst_type.is_rw() {
            steps = steps.max(full_words(self.length));
        }
        steps
    }

    /// Position in word of every step of a side whose first `words_len`
    /// steps are covered by words.
    fn positions(&self, words_len: u64) -> Vec<u64> {
        (0..self.num_steps())
            .map(|k| {
                if k < words_len {
                    k % WORD_LENGTH as u64 + 1
                } else {
                    0
                }
            })
            .collect()
    }

    fn read_word_len(&self) -> u64 {
        if self.src_type.is_rw() {
            self.valid_src_len().div_ceil(WORD_LENGTH as u64) * WORD_LENGTH as u64
        } else {
            0
        }
    }

    fn write_word_len(&self) -> u64 {
        if self.dst_type.is_rw() {
            self.length.div_ceil(WORD_LENGTH as u64) * WORD_LENGTH as u64
        } else {
            0
        }
    }
}

/// Bytes of one event on every step, gathered by the witness generator
#[derive(Clone, Debug, Default)]
pub(crate) struct EventBytes {
    /// Source bytes, zero when padded
    pub read: Vec<u8>,
    pub is_pad: Vec<bool>,
    pub is_code: Vec<bool>,
    /// Destination bytes after the copy: the copied byte inside the copy
    /// range, the existing byte past it
    pub written: Vec<u8>,
}

/// Rows of the event and the RW operations they issue
pub(crate) struct EventRows<F> {
    pub rows: Vec<Row<F>>,
    pub rws: Vec<state::Row<F>>,
    pub rlc_result: F,
}

/// Reversed Horner accumulators of a side, restarting at every word start.
fn word_accumulators<F: Field>(positions: &[u64], bytes: &[u8], challenge_inv: F) -> Vec<F> {
    let mut acc = F::ZERO;
    positions
        .iter()
        .zip(bytes)
        .map(|(position, byte)| {
            acc = match position {
                0 => F::ZERO,
                1 => F::from(*byte as u64),
                _ => acc * challenge_inv + F::from(*byte as u64),
            };
            acc
        })
        .collect()
}

/// Lay out the rows of one event. `challenge` must be invertible.
pub(crate) fn gen_event_rows<F: Field>(
    event: &CopyEvent,
    bytes: &EventBytes,
    challenge: F,
    challenge_inv: F,
) -> EventRows<F> {
    let steps = event.num_steps() as usize;
    let length = event.length as usize;
    let src_id = event.src_id.to_field(challenge);
    let dst_id = event.dst_id.to_field(challenge);
    let src_addr = event.src_addr_start();

    let read_positions = event.positions(event.read_word_len());
    let write_positions = event.positions(event.write_word_len());
    let read_acc = word_accumulators(&read_positions, &bytes.read, challenge_inv);
    let write_acc = word_accumulators(&write_positions, &bytes.written, challenge_inv);

    // forward Horner accumulation over the copy range, for RlcAcc
    let mut pushed = Vec::with_capacity(length);
    for (k, byte) in bytes.read[..length].iter().enumerate() {
        let prev = if k == 0 { F::ZERO } else { pushed[k - 1] };
        pushed.push(prev * challenge + F::from(*byte as u64));
    }
    let rlc_result = horner(&bytes.read[..length], challenge);

    let mut rows = Vec::with_capacity(2 * steps);
    for k in 0..steps {
        let in_range = k < length;
        let bytes_left = if in_range { (length - k) as u64 } else { 0 };

        let mut reader = Row::<F> {
            q_step: F::ONE,
            is_first: F::from((k == 0) as u64),
            is_copy_range: F::from(in_range as u64),
            id: src_id,
            addr: F::from(src_addr + k as u64),
            src_addr_end: F::from(event.src_addr_end),
            bytes_left: F::from(bytes_left),
            value: F::from(bytes.read[k] as u64),
            rlc_acc: read_acc[k],
            rlc_acc_update: read_acc[k],
            is_pad: F::from(bytes.is_pad[k] as u64),
            is_code: F::from(bytes.is_code[k] as u64),
            ..Default::default()
        };
        reader.set_tag(event.src_type);
        reader.set_position(read_positions[k]);

        let mut writer = Row::<F> {
            q_step: F::ZERO,
            is_last: F::from((k + 1 == length) as u64),
            is_copy_range: F::from(in_range as u64),
            id: dst_id,
            addr: F::from(event.dst_addr + k as u64),
            src_addr_end: F::from(event.src_addr_end),
            bytes_left: F::from(bytes_left),
            ..Default::default()
        };
        writer.set_tag(event.dst_type);
        writer.set_position(write_positions[k]);
        if event.dst_type == CopyDataType::RlcAcc {
            let value = if in_range { pushed[k] } else { F::ZERO };
            writer.value = value;
            writer.rlc_acc_update = value;
        } else {
            writer.value = F::from(bytes.written[k] as u64);
            writer.rlc_acc = write_acc[k];
            writer.rlc_acc_update = write_acc[k];
        }

        rows.push(reader);
        rows.push(writer);
    }

    // the ledger: one RW operation at every word end
    let total = rows.iter().filter(|row| row.is_word_end == F::ONE).count() as u64;
    let shift = challenge.pow_vartime([WORD_LENGTH as u64 - 1]);
    let mut done = 0u64;
    let mut rws = Vec::with_capacity(total as usize);
    for row in rows.iter_mut() {
        row.rw_counter = F::from(event.rw_counter + done);
        row.rwc_inc_left = F::from(total - done);
        if row.is_word_end == F::ONE {
            rws.push(state::Row {
                rw_counter: row.rw_counter,
                is_write: F::ONE - row.q_step,
                tag: if row.is_memory == F::ONE {
                    state::Tag::Memory
                } else {
                    state::Tag::TxLog
                },
                id: row.id,
                address: row.addr - F::from(WORD_LENGTH as u64 - 1),
                value: shift * row.rlc_acc_update,
                value_prev: shift * row.rlc_acc,
            });
            done += 1;
        }
    }

    EventRows {
        rows,
        rws,
        rlc_result,
    }
}
