// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! Copy circuit: verifies byte-exact data movement between memory, bytecode,
//! tx calldata, tx logs and an RLC accumulator.
//!
//! Every step of a copy event is a reader row (`q_step = 1`) followed by a
//! writer row (`q_step = 0`). The verifier slides a circular window
//! `[i, i+1, i+2]` over the table: rows `i` and `i+2` are consecutive rows of
//! the same side, row `i+1` is the paired row of the other side.
//!
//! Memory and log bytes are accessed through 32-byte words. A word runs on
//! one side of the table, its bytes are accumulated with [`word_rlc`] and
//! its RW operation is looked up at its last byte. Steps past the copy range
//! only exist to let such a word reach its end.
//!
//! All constraints are gated values that must be zero, see
//! [`ConstraintBuilder`].

mod constraint_builder;
pub mod copy_range;
pub mod out_of_bound;
pub mod rw_counter;
pub mod word_iterator;
pub mod word_rlc;

pub use constraint_builder::ConstraintBuilder;

use crate::constant::{ENV_MAX_ROWS, ENV_VERIFY_PARALLEL, MAX_NUM_ROW, N_BYTES_MEMORY_ADDRESS};
use crate::error::{FailureKind, VerifyFailure};
use crate::table::{LookupEntry, Tables};
use crate::util::read_env_var;
use crate::witness::copy::{CopyDataType, Row};
use crate::witness::{bytecode, public, state, Witness};
use copy_range::{verify_row_copy_range, CopyRangeGadget};
use eth_types::Field;
use gadgets::simple_is_zero::is_zero;
use gadgets::simple_lt::SimpleLtGadget;
use gadgets::util::{not, select};
use itertools::Itertools;
use log::{debug, info, warn};
use out_of_bound::{verify_row_oob, OutOfBoundGadget};
use rayon::prelude::*;
use rw_counter::{verify_row_rw_counter, RwcGadget};
use word_iterator::{verify_step_word_iterator, WordIterator};
use word_rlc::{verify_step_word_rlc, WordRlcGadget};

/// Decode the tag into one boolean indicator per data type
pub fn verify_tag_decoding<F: Field>(cb: &mut ConstraintBuilder<F>, row: &Row<F>) {
    let indicators = [
        (CopyDataType::Memory, row.is_memory, "is_memory matches the tag"),
        (CopyDataType::Bytecode, row.is_bytecode, "is_bytecode matches the tag"),
        (CopyDataType::TxCalldata, row.is_tx_calldata, "is_tx_calldata matches the tag"),
        (CopyDataType::TxLog, row.is_tx_log, "is_tx_log matches the tag"),
        (CopyDataType::RlcAcc, row.is_rlc_acc, "is_rlc_acc matches the tag"),
    ];
    cb.kind(FailureKind::Malformed, |cb| {
        for (tag, indicator, name) in indicators {
            cb.require_equal(name, indicator, is_zero(row.tag - tag.value::<F>()));
        }
        cb.require_equal(
            "exactly one data type",
            indicators.iter().map(|(_, indicator, _)| *indicator).sum::<F>(),
            F::ONE,
        );
    });
}

/// Constraints of the window `rows = [i, i+1, i+2]` anchored at row `i`
pub fn verify_row<F: Field>(cb: &mut ConstraintBuilder<F>, rows: [&Row<F>; 3], r: F) {
    verify_tag_decoding(cb, rows[0]);
    let is_rw = rows[0].is_memory + rows[0].is_tx_log;

    let copy_range = rows.map(CopyRangeGadget::new);
    verify_row_copy_range(cb, &copy_range[0], &copy_range[1]);

    // a word may start on a memory or log row not past the source boundary,
    // and must run inside the copy range
    let word_iter = rows.map(WordIterator::new);
    let word_can_start_0 = is_rw * not(rows[0].is_pad);
    let word_must_run_0 = word_can_start_0 * copy_range[0].is_copy_range;
    verify_step_word_iterator(
        cb,
        &word_iter[0],
        &word_iter[2],
        word_can_start_0,
        word_must_run_0,
    );

    // otherwise a word could start before is_pad switches on
    cb.kind(FailureKind::Malformed, |cb| {
        cb.condition(copy_range[0].is_first * rows[0].is_pad, |cb| {
            cb.require_zero("no word on a source padded from the start", word_iter[0].is_in_word);
        });
    });

    // rows[0] and rows[2] belong to the same event
    let same_event = not(rows[1].is_first) * not(rows[2].is_first);
    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(same_event, |cb| {
            cb.require_equal("id is constant in an event", rows[0].id, rows[2].id);
            cb.require_equal("tag is constant in an event", rows[0].tag, rows[2].tag);
            cb.require_equal(
                "src_addr_end is constant in an event",
                rows[0].src_addr_end,
                rows[2].src_addr_end,
            );
            cb.require_equal("addr increments by one", rows[0].addr + F::ONE, rows[2].addr);
        });
    });

    verify_row_oob(
        cb,
        &OutOfBoundGadget::new(rows[0]),
        &OutOfBoundGadget::new(rows[2]),
        rows[0].is_first,
        rows[2].q_step * same_event,
    );

    // word RLC of the bytes as read, on both sides
    let rlc_reader_0 = WordRlcGadget::new(word_iter[0], rows[0].rlc_acc);
    let rlc_reader_2 = WordRlcGadget::new(word_iter[2], rows[2].rlc_acc);
    let read_byte_2 = rows[2].value;
    verify_step_word_rlc(
        cb,
        "read word RLC includes the byte",
        r,
        &rlc_reader_0,
        &rlc_reader_2,
        read_byte_2,
    );

    // a writer row inside the copy range takes the byte of its reader, any
    // other row keeps its byte
    let is_source_to_dest_2 = copy_range[2].is_copy_range * not(rows[2].q_step);
    let updated_byte_2 = select(is_source_to_dest_2, rows[1].value, read_byte_2);
    let rlc_updater_0 = WordRlcGadget::new(word_iter[0], rows[0].rlc_acc_update);
    let rlc_updater_2 = WordRlcGadget::new(word_iter[2], rows[2].rlc_acc_update);
    verify_step_word_rlc(
        cb,
        "updated word RLC includes the byte",
        r,
        &rlc_updater_0,
        &rlc_updater_2,
        updated_byte_2,
    );

    // an RlcAcc writer accumulates the read bytes from the start of the event
    cb.kind(FailureKind::Continuity, |cb| {
        let is_acc_2 = not(rows[2].q_step) * rows[2].is_rlc_acc * copy_range[2].is_copy_range;
        cb.condition(is_acc_2, |cb| {
            let prev_acc = select(rows[1].is_first, F::ZERO, rows[0].rlc_acc_update);
            cb.require_equal(
                "RlcAcc accumulates the read bytes",
                rows[2].rlc_acc_update,
                prev_acc * r + rows[1].value,
            );
        });
    });

    // one RW operation at the end of every word
    let rw_diff_0 = word_iter[0].is_word_end;
    let continue_event = not(rows[1].is_first);
    let rg_0 = RwcGadget::new(rows[0]);
    let rg_1 = RwcGadget::new(rows[1]);
    verify_row_rw_counter(cb, continue_event, &rg_0, &rg_1, rw_diff_0);

    cb.condition(rw_diff_0, |cb| {
        let tag = select(
            rows[0].is_memory,
            state::Tag::Memory.value(),
            state::Tag::TxLog.value(),
        );
        cb.add_lookup(
            "RW word lookup",
            LookupEntry::Rw {
                rw_counter: rg_0.rw_counter,
                is_write: not(rows[0].q_step),
                tag,
                id: rows[0].id,
                address: word_iter[0].address_at_start(rows[0].addr),
                value: rlc_updater_0.get_final_rlc(r),
                value_prev: rlc_reader_0.get_final_rlc(r),
            },
        );
    });

    cb.kind(FailureKind::Accounting, |cb| {
        // rows[0] and rows[1] are the last step of the copy range, the words
        // running on them are the only RW operations left
        cb.condition(rows[1].is_last, |cb| {
            cb.require_equal(
                "RW operations left match the words in flight",
                rows[0].rwc_inc_left,
                word_iter[0].is_in_word + word_iter[1].is_in_word,
            );
        });
        // rows[0] closes the event
        cb.condition(rows[1].is_first, |cb| {
            cb.require_equal(
                "RW operations are used up at the end of the event",
                rows[0].rwc_inc_left,
                rw_diff_0,
            );
        });
    });

    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(rows[1].is_last * rows[1].is_rlc_acc, |cb| {
            cb.require_equal(
                "RlcAcc value is the accumulated RLC on the last row",
                rows[1].rlc_acc_update,
                rows[1].value,
            );
        });
    });
}

/// Constraints between the rows of a step and the next step
pub fn verify_step<F: Field>(cb: &mut ConstraintBuilder<F>, rows: [&Row<F>; 3], r: F) {
    cb.kind(FailureKind::Continuity, |cb| {
        cb.condition(rows[0].q_step * rows[0].is_copy_range, |cb| {
            cb.require_zero(
                "bytes_left is 1 on the last step",
                rows[1].is_last * (F::ONE - rows[0].bytes_left),
            );
            cb.require_zero(
                "bytes_left decrements by one",
                not(rows[1].is_last) * (rows[0].bytes_left - rows[2].bytes_left - F::ONE),
            );
            cb.require_equal(
                "writer repeats bytes_left",
                rows[1].bytes_left,
                rows[0].bytes_left,
            );
        });
    });

    cb.kind(FailureKind::Malformed, |cb| {
        cb.condition(rows[0].q_step, |cb| {
            cb.require_zero("padded byte is zero", rows[0].is_pad * rows[0].value);
            // log addresses carry the log id above the address bytes
            if rows[0].is_tx_log == F::ZERO {
                let in_range = [rows[0].addr, rows[0].src_addr_end]
                    .iter()
                    .all(|value| value.to_bounded_bytes(N_BYTES_MEMORY_ADDRESS).is_some());
                cb.require_equal(
                    "addr and src_addr_end fit the address bytes",
                    F::from(in_range as u64),
                    F::ONE,
                );
                if in_range {
                    let is_in_bound = SimpleLtGadget::<F, N_BYTES_MEMORY_ADDRESS>::new(
                        rows[0].addr,
                        rows[0].src_addr_end,
                    );
                    for (name, value) in is_in_bound.get_constraints() {
                        cb.require_zero(name, value);
                    }
                    cb.require_equal(
                        "is_pad == (addr >= src_addr_end)",
                        not(is_in_bound.expr()),
                        rows[0].is_pad,
                    );
                }
            }
        });
    });

    cb.kind(FailureKind::Continuity, |cb| {
        let copies_byte = rows[0].q_step * rows[0].is_copy_range * not(rows[1].is_rlc_acc);
        cb.condition(copies_byte, |cb| {
            cb.require_equal("written byte equals read byte", rows[1].value, rows[0].value);
        });
        cb.condition(rows[0].q_step * rows[0].is_first, |cb| {
            cb.require_equal(
                "first written value equals read byte",
                rows[1].value,
                rows[0].value,
            );
        });
        let accumulates = not(rows[0].q_step)
            * rows[0].is_copy_range
            * not(rows[0].is_last)
            * rows[0].is_rlc_acc;
        cb.condition(accumulates, |cb| {
            cb.require_equal(
                "RlcAcc value accumulates the next read byte",
                rows[2].value,
                rows[0].value * r + rows[1].value,
            );
        });
    });
}

/// Source lookups of a row. Memory and log bytes are covered by the RW word
/// lookup.
pub fn verify_lookups<F: Field>(cb: &mut ConstraintBuilder<F>, row: &Row<F>) {
    let is_real = not(row.is_pad) * row.is_copy_range;
    cb.condition(row.is_bytecode * is_real, |cb| {
        cb.add_lookup(
            "Bytecode lookup",
            LookupEntry::Bytecode {
                code_hash: row.id,
                tag: bytecode::Tag::Byte.value(),
                index: row.addr,
                is_code: row.is_code,
                value: row.value,
            },
        );
    });
    cb.condition(row.is_tx_calldata * is_real, |cb| {
        cb.add_lookup(
            "Tx calldata lookup",
            LookupEntry::Tx {
                tx_id: row.id,
                tag: public::Tag::TxCalldata.value(),
                index: row.addr,
                value: row.value,
            },
        );
    });
}

fn verify_window<F: Field>(rows: &[Row<F>], i: usize, tables: &Tables<F>, r: F) -> Vec<VerifyFailure> {
    let n = rows.len();
    let window = [&rows[i], &rows[(i + 1) % n], &rows[(i + 2) % n]];
    let mut cb = ConstraintBuilder::new();
    verify_row(&mut cb, window, r);
    verify_step(&mut cb, window, r);
    verify_lookups(&mut cb, window[0]);
    cb.failures(i, tables)
}

/// Table-wide layout: whole steps, starting with the first reader of an event
fn verify_layout<F: Field>(rows: &[Row<F>]) -> Vec<VerifyFailure> {
    let mut failures = vec![];
    if rows.len() % 2 == 1 {
        failures.push(VerifyFailure::Malformed {
            row: rows.len() - 1,
            name: "table is made of whole steps",
        });
    }
    if let Some(row) = rows.first() {
        if row.q_step != F::ONE || row.is_first != F::ONE {
            failures.push(VerifyFailure::Malformed {
                row: 0,
                name: "table starts with the first reader of an event",
            });
        }
    }
    failures
}

fn finish<F: Field>(rows: &[Row<F>], mut failures: Vec<VerifyFailure>) -> Result<(), Vec<VerifyFailure>> {
    failures.sort_by_key(|failure| failure.row());
    let events = rows.iter().positions(|row| row.is_first == F::ONE).collect_vec();
    debug!("copy table events start at rows {:?}", events);
    if failures.is_empty() {
        info!("copy table verified: {} rows, {} events", rows.len(), events.len());
        return Ok(());
    }
    for failure in failures.iter() {
        warn!("{}", failure);
    }
    info!(
        "copy table rejected: {} rows, {} failures",
        rows.len(),
        failures.len()
    );
    Err(failures)
}

/// Verify every window of the copy table against the lookup tables, with the
/// challenge `r`. Returns all failures in row order.
pub fn verify_copy_table<F: Field>(
    rows: &[Row<F>],
    tables: &Tables<F>,
    r: F,
) -> Result<(), Vec<VerifyFailure>> {
    let mut failures = verify_layout(rows);
    for i in 0..rows.len() {
        failures.extend(verify_window(rows, i, tables, r));
    }
    finish(rows, failures)
}

/// Same as [`verify_copy_table`], windows are checked in parallel
pub fn verify_copy_table_par<F: Field>(
    rows: &[Row<F>],
    tables: &Tables<F>,
    r: F,
) -> Result<(), Vec<VerifyFailure>> {
    let mut failures = verify_layout(rows);
    let windows: Vec<Vec<VerifyFailure>> = (0..rows.len())
        .into_par_iter()
        .map(|i| verify_window(rows, i, tables, r))
        .collect();
    failures.extend(windows.into_iter().flatten());
    finish(rows, failures)
}

/// Runtime parameters of the copy circuit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyCircuitParams {
    pub max_rows: usize,
    /// verify windows with rayon
    pub parallel: bool,
}

impl Default for CopyCircuitParams {
    fn default() -> Self {
        Self {
            max_rows: MAX_NUM_ROW,
            parallel: false,
        }
    }
}

impl CopyCircuitParams {
    /// Read `COPY_MAX_ROWS` and `COPY_VERIFY_PARALLEL`, from the process
    /// environment or a `.env` file
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let default = Self::default();
        Self {
            max_rows: read_env_var(ENV_MAX_ROWS, default.max_rows),
            parallel: read_env_var(ENV_VERIFY_PARALLEL, default.parallel),
        }
    }
}

/// The copy table of a witness with the tables it looks up
#[derive(Clone, Copy, Debug)]
pub struct CopyCircuit<'a, F> {
    witness: &'a Witness<F>,
    params: CopyCircuitParams,
}

impl<'a, F: Field> CopyCircuit<'a, F> {
    pub fn new_from_witness(witness: &'a Witness<F>, params: CopyCircuitParams) -> Self {
        Self { witness, params }
    }

    pub fn num_rows(&self) -> usize {
        self.witness.copy.len()
    }

    pub fn verify(&self, r: F) -> Result<(), Vec<VerifyFailure>> {
        let rows = &self.witness.copy;
        if rows.len() > self.params.max_rows {
            let failure = VerifyFailure::Malformed {
                row: self.params.max_rows,
                name: "table fits the maximum number of rows",
            };
            warn!("{}", failure);
            return Err(vec![failure]);
        }
        let tables = Tables::new(self.witness);
        if self.params.parallel {
            verify_copy_table_par(rows, &tables, r)
        } else {
            verify_copy_table(rows, &tables, r)
        }
    }
}
