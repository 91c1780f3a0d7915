// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

pub mod bytecode;
pub mod copy;
pub mod keccak;
pub mod public;
pub mod state;

use crate::constant::{
    MAX_NUM_ROW, N_BYTES_MEMORY_ADDRESS, TX_LOG_FIELD_SHIFT, TX_LOG_ID_SHIFT,
};
use anyhow::{anyhow, bail, ensure, Result};
use copy::{CopyDataType, CopyEvent, CopyResult, EventBytes, NumberOrHash};
use eth_types::evm_types::code_flags;
use eth_types::{keccak256, Field};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::io;

/// The copy table together with the contents of the tables it looks up
#[derive(Debug, Clone)]
pub struct Witness<F> {
    pub copy: Vec<copy::Row<F>>,
    pub state: Vec<state::Row<F>>,
    pub bytecode: Vec<bytecode::Row<F>>,
    pub public: Vec<public::Row<F>>,
    pub keccak: Vec<keccak::Row<F>>,
    current_state: CurrentState,
    max_rows: usize,
}

/// Execution data the copies read from and write to
#[derive(Debug, Default, Clone)]
pub struct CurrentState {
    /// (call_id, address) -> byte, absent bytes are zero
    pub memory: HashMap<(u64, u64), u8>,
    pub codes: HashMap<[u8; 32], Vec<u8>>,
    pub calldata: HashMap<u64, Vec<u8>>,
}

impl<F: Field> Default for Witness<F> {
    fn default() -> Self {
        Self::new(MAX_NUM_ROW)
    }
}

/// Address of byte `offset` of the data of log `log_id`
pub fn tx_log_address(log_id: u64, offset: u64) -> u64 {
    offset + ((public::LogTag::Data as u64) << TX_LOG_FIELD_SHIFT) + (log_id << TX_LOG_ID_SHIFT)
}

impl<F: Field> Witness<F> {
    /// Empty witness accepting at most `max_rows` copy rows
    pub fn new(max_rows: usize) -> Self {
        Self {
            copy: vec![],
            state: vec![],
            bytecode: vec![],
            public: vec![],
            keccak: vec![],
            current_state: CurrentState::default(),
            max_rows,
        }
    }

    pub fn current_state(&self) -> &CurrentState {
        &self.current_state
    }

    /// Register a contract code and return its hash
    pub fn add_bytecode(&mut self, code: &[u8], challenge: F) -> [u8; 32] {
        let hash = keccak256(code);
        if !self.current_state.codes.contains_key(&hash) {
            let code_hash = NumberOrHash::Hash(hash).to_field(challenge);
            self.bytecode
                .extend(bytecode::Row::from_code(code, code_hash));
            self.current_state.codes.insert(hash, code.to_vec());
        }
        hash
    }

    /// Register the calldata of a transaction
    pub fn add_tx_calldata(&mut self, tx_id: u64, calldata: &[u8]) -> Result<()> {
        ensure!(
            !self.current_state.calldata.contains_key(&tx_id),
            "calldata of tx {tx_id} is already registered"
        );
        self.public
            .extend(public::Row::from_calldata(tx_id, calldata));
        self.current_state.calldata.insert(tx_id, calldata.to_vec());
        Ok(())
    }

    /// Seed the memory of a call
    pub fn set_memory(&mut self, call_id: u64, offset: u64, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.current_state
                .memory
                .insert((call_id, offset + i as u64), *byte);
        }
    }

    pub fn memory(&self, call_id: u64, address: u64) -> u8 {
        self.current_state
            .memory
            .get(&(call_id, address))
            .copied()
            .unwrap_or_default()
    }

    /// Materialize a copy request into copy rows, RW operations and, for an
    /// RlcAcc destination, the Keccak row of the copied bytes.
    pub fn add_copy_event(&mut self, event: &CopyEvent, challenge: F) -> Result<CopyResult<F>> {
        if event.length == 0 {
            debug!("skip empty copy event {:?}", event);
            return Ok(CopyResult::default());
        }
        ensure!(
            event.src_type.is_readable(),
            "{} cannot be the source of a copy",
            event.src_type
        );
        ensure!(
            event.dst_type.is_writable(),
            "{} cannot be the destination of a copy",
            event.dst_type
        );
        let challenge_inv: F = Option::from(challenge.invert())
            .ok_or_else(|| anyhow!("the challenge must not be zero"))?;

        let steps = event.num_steps();
        let num_rows = self.copy.len() + 2 * steps as usize;
        ensure!(
            num_rows <= self.max_rows,
            "copy table needs {num_rows} rows, at most {} are allowed",
            self.max_rows
        );
        self.check_addresses(event, steps)?;

        let bytes = self.event_bytes(event, steps)?;
        let generated = copy::gen_event_rows(event, &bytes, challenge, challenge_inv);

        if event.dst_type == CopyDataType::Memory {
            let call_id = number(&event.dst_id)?;
            let copied = &bytes.written[..event.length as usize];
            self.set_memory(call_id, event.dst_addr, copied);
        }
        if event.dst_type == CopyDataType::RlcAcc {
            let row = keccak::Row::new(&bytes.read[..event.length as usize], challenge);
            if !self.keccak.contains(&row) {
                self.keccak.push(row);
            }
        }

        let result = CopyResult {
            rw_counter_increment: generated.rws.len() as u64,
            rlc_result: generated.rlc_result,
        };
        debug!(
            "copy {} -> {}: {} bytes in {} steps, {} rw operations",
            event.src_type, event.dst_type, event.length, steps, result.rw_counter_increment
        );
        self.copy.extend(generated.rows);
        self.state.extend(generated.rws);
        Ok(result)
    }

    fn check_addresses(&self, event: &CopyEvent, steps: u64) -> Result<()> {
        let limit = 1u64 << (8 * N_BYTES_MEMORY_ADDRESS);
        let src_last = event
            .src_addr_start()
            .checked_add(steps)
            .ok_or_else(|| anyhow!("source address overflows"))?;
        ensure!(
            src_last < limit && event.src_addr_end < limit,
            "source addresses exceed {N_BYTES_MEMORY_ADDRESS} bytes"
        );
        let dst_last = event
            .dst_addr
            .checked_add(steps)
            .ok_or_else(|| anyhow!("destination address overflows"))?;
        // log addresses carry the log id in their upper bytes
        ensure!(
            event.dst_type == CopyDataType::TxLog || dst_last < limit,
            "destination addresses exceed {N_BYTES_MEMORY_ADDRESS} bytes"
        );
        Ok(())
    }

    fn event_bytes(&self, event: &CopyEvent, steps: u64) -> Result<EventBytes> {
        let src_addr = event.src_addr_start();
        let (source, flags): (Option<&[u8]>, Vec<bool>) = match event.src_type {
            CopyDataType::Memory => (None, vec![]),
            CopyDataType::Bytecode => {
                let NumberOrHash::Hash(hash) = event.src_id else {
                    bail!("bytecode is identified by its hash");
                };
                let code = self
                    .current_state
                    .codes
                    .get(&hash)
                    .ok_or_else(|| anyhow!("unknown code hash {}", hex_string(&hash)))?;
                (Some(code.as_slice()), code_flags(code))
            }
            CopyDataType::TxCalldata => {
                let tx_id = number(&event.src_id)?;
                let calldata = self
                    .current_state
                    .calldata
                    .get(&tx_id)
                    .ok_or_else(|| anyhow!("no calldata for tx {tx_id}"))?;
                (Some(calldata.as_slice()), vec![])
            }
            _ => bail!("{} cannot be the source of a copy", event.src_type),
        };
        if let Some(source) = source {
            ensure!(
                event.src_addr_end <= source.len() as u64,
                "src_addr_end {} is past the {} source bytes",
                event.src_addr_end,
                source.len()
            );
        }
        let src_call_id = match event.src_type {
            CopyDataType::Memory => number(&event.src_id)?,
            _ => 0,
        };
        let dst_call_id = match event.dst_type {
            CopyDataType::Memory => number(&event.dst_id)?,
            _ => 0,
        };

        let mut bytes = EventBytes::default();
        for k in 0..steps {
            let addr = src_addr + k;
            let is_pad = addr >= event.src_addr_end;
            let byte = match source {
                _ if is_pad => 0,
                Some(source) => source[addr as usize],
                None => self.memory(src_call_id, addr),
            };
            bytes.read.push(byte);
            bytes.is_pad.push(is_pad);
            bytes
                .is_code
                .push(!is_pad && flags.get(addr as usize).copied().unwrap_or_default());
            let written = if k < event.length {
                byte
            } else if event.dst_type == CopyDataType::Memory {
                self.memory(dst_call_id, event.dst_addr + k)
            } else {
                0
            };
            bytes.written.push(written);
        }
        Ok(bytes)
    }

    /// Write every table as CSV, each with its own header
    pub fn write_csv<W: io::Write>(&self, mut writer: W) -> Result<()> {
        write_table(&mut writer, &self.copy)?;
        write_table(&mut writer, &self.state)?;
        write_table(&mut writer, &self.bytecode)?;
        write_table(&mut writer, &self.public)?;
        write_table(&mut writer, &self.keccak)?;
        Ok(())
    }

    pub fn print_csv(&self) -> Result<()> {
        info!(
            "print witness: {} copy rows, {} rw rows",
            self.copy.len(),
            self.state.len()
        );
        self.write_csv(io::stdout())
    }
}

fn write_table<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn number(id: &NumberOrHash) -> Result<u64> {
    match id {
        NumberOrHash::Number(n) => Ok(*n),
        NumberOrHash::Hash(h) => bail!("expected a call or tx id, got hash {}", hex_string(h)),
    }
}

fn hex_string(hash: &[u8; 32]) -> String {
    format!("0x{:02x}", hash.iter().format(""))
}
