use copy_verifier::copy_circuit::{
    verify_copy_table, verify_copy_table_par, CopyCircuit, CopyCircuitParams,
};
use copy_verifier::error::VerifyFailure;
use copy_verifier::table::Tables;
use copy_verifier::util::{horner, rlc};
use copy_verifier::witness::copy::{CopyDataType, CopyEvent, NumberOrHash, Row};
use copy_verifier::witness::{state, tx_log_address, Witness};
use eth_types::{keccak256, Field, Fr};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use test_case::test_case;

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

fn challenge() -> Fr {
    Fr::from(0x1234_5678_9abc_def1u64)
}

fn verify(witness: &Witness<Fr>, r: Fr) -> Result<(), Vec<VerifyFailure>> {
    verify_copy_table(&witness.copy, &Tables::new(witness), r)
}

/// 10 opcodes, then ADD MUL SUB
fn code_with_tail() -> Vec<u8> {
    let mut code = vec![0x5b; 10];
    code.extend([0x01, 0x02, 0x03]);
    code
}

fn bytecode_to_memory(witness: &mut Witness<Fr>, r: Fr) -> CopyEvent {
    let hash = witness.add_bytecode(&code_with_tail(), r);
    let event = CopyEvent {
        src_type: CopyDataType::Bytecode,
        src_id: NumberOrHash::Hash(hash),
        src_addr: 10,
        src_addr_end: 13,
        dst_type: CopyDataType::Memory,
        dst_id: NumberOrHash::Number(1),
        dst_addr: 100,
        length: 3,
        rw_counter: 1,
    };
    witness.add_copy_event(&event, r).unwrap();
    event
}

#[test]
fn test_bytecode_to_memory() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);

    // 3 copied steps and 29 steps to finish the written word
    assert_eq!(witness.copy.len(), 64);
    let firsts: Vec<usize> = (0..64).filter(|i| witness.copy[*i].is_first == Fr::one()).collect();
    let lasts: Vec<usize> = (0..64).filter(|i| witness.copy[*i].is_last == Fr::one()).collect();
    assert_eq!(firsts, vec![0]);
    assert_eq!(lasts, vec![5]);
    assert_eq!(
        witness.copy.iter().filter(|row| row.is_copy_range == Fr::one()).count(),
        6
    );
    // no word is read from bytecode, the written word ends in memory
    assert!(witness
        .copy
        .iter()
        .step_by(2)
        .all(|row| row.is_in_word == Fr::zero()));
    assert_eq!(witness.state.len(), 1);
    assert_eq!(witness.state[0].is_write, Fr::one());
    assert_eq!(witness.state[0].address, Fr::from(100));
    assert_eq!(witness.memory(1, 100), 0x01);
    assert_eq!(witness.memory(1, 102), 0x03);

    assert_eq!(verify(&witness, r), Ok(()));
}

#[test]
fn test_memory_to_memory_one_word() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    let bytes: Vec<u8> = (1..=32).collect();
    witness.set_memory(1, 0x20, &bytes);
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(1),
        src_addr: 0x20,
        src_addr_end: 0x40,
        dst_type: CopyDataType::Memory,
        dst_id: NumberOrHash::Number(2),
        dst_addr: 0x80,
        length: 32,
        rw_counter: 7,
    };
    let result = witness.add_copy_event(&event, r).unwrap();
    assert_eq!(result.rw_counter_increment, 2);
    assert_eq!(witness.copy.len(), 64);

    let word_ends = |q_step: Fr| {
        witness
            .copy
            .iter()
            .filter(|row| row.q_step == q_step && row.is_word_end == Fr::one())
            .count()
    };
    assert_eq!(word_ends(Fr::one()), 1);
    assert_eq!(word_ends(Fr::zero()), 1);

    let writes: Vec<&state::Row<Fr>> = witness
        .state
        .iter()
        .filter(|rw| rw.is_write == Fr::one())
        .collect();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].address, Fr::from(0x80));
    assert_eq!(writes[0].rw_counter, Fr::from(8));
    assert_eq!(writes[0].value, rlc(&bytes, r));
    assert_eq!(witness.state[0].address, Fr::from(0x20));
    assert_eq!(witness.state[0].is_write, Fr::zero());

    assert_eq!(verify(&witness, r), Ok(()));
}

#[test_case(CopyDataType::RlcAcc, 4 ; "into the accumulator")]
#[test_case(CopyDataType::Memory, 32 ; "into memory")]
fn test_zero_length_valid_source(dst_type: CopyDataType, steps: usize) {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    witness.set_memory(1, 0x10, &[9, 9, 9, 9]);
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(1),
        src_addr: 0x10,
        src_addr_end: 0x10,
        dst_type,
        dst_id: NumberOrHash::Number(2),
        dst_addr: 0,
        length: 4,
        rw_counter: 1,
    };
    let result = witness.add_copy_event(&event, r).unwrap();
    assert_eq!(result.rlc_result, Fr::zero());
    assert_eq!(witness.copy.len(), 2 * steps);

    let readers: Vec<_> = witness.copy.iter().step_by(2).collect();
    assert!(readers.iter().all(|row| row.is_pad == Fr::one()));
    assert!(readers.iter().all(|row| row.is_in_word == Fr::zero()));
    assert!(readers.iter().all(|row| row.value == Fr::zero()));
    assert_eq!(verify(&witness, r), Ok(()));
}

#[test]
fn test_corrupted_addr() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    witness.copy[2].addr += Fr::one();

    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 2,
        name: "addr increments by one"
    }));
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 0,
        name: "addr increments by one"
    }));
    assert!(failures.iter().all(|failure| failure.row() <= 2));
}

/// 3 memory bytes into the accumulator, the writer rows carry the running RLC
fn memory_to_rlc_acc(witness: &mut Witness<Fr>, r: Fr) -> Fr {
    witness.set_memory(1, 0, &[0xde, 0xad, 0xbe]);
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(1),
        src_addr_end: 3,
        dst_type: CopyDataType::RlcAcc,
        length: 3,
        rw_counter: 1,
        ..Default::default()
    };
    witness.add_copy_event(&event, r).unwrap().rlc_result
}

#[test]
fn test_tampered_rlc_acc_value() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    let rlc_result = memory_to_rlc_acc(&mut witness, r);
    assert_eq!(witness.copy[5].value, rlc_result);
    assert_eq!(verify(&witness, r), Ok(()));

    witness.copy[5].value += Fr::one();
    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 4,
        name: "RlcAcc value is the accumulated RLC on the last row"
    }));
}

#[test]
fn test_tampered_intermediate_rlc_acc() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    memory_to_rlc_acc(&mut witness, r);

    let mut tampered = witness.clone();
    tampered.copy[3].value += Fr::one();
    let failures = verify(&tampered, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 1,
        name: "RlcAcc value accumulates the next read byte"
    }));
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 3,
        name: "RlcAcc value accumulates the next read byte"
    }));

    let mut tampered = witness.clone();
    tampered.copy[3].rlc_acc_update += Fr::one();
    let failures = verify(&tampered, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 1,
        name: "RlcAcc accumulates the read bytes"
    }));

    // the first accumulated value is the first byte
    let mut tampered = witness;
    tampered.copy[1].value += Fr::one();
    let failures = verify(&tampered, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 0,
        name: "first written value equals read byte"
    }));
}

#[test]
fn test_padded_byte_not_zero() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    // the fourth reader is past the end of the source
    assert_eq!(witness.copy[6].is_pad, Fr::one());
    witness.copy[6].value = Fr::one();

    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Malformed {
        row: 6,
        name: "padded byte is zero"
    }));
}

#[test]
fn test_in_bound_reader_padded() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    witness.copy[2].is_pad = Fr::one();

    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Malformed {
        row: 2,
        name: "is_pad == (addr >= src_addr_end)"
    }));
}

#[test]
fn test_reader_addr_too_large() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    witness.copy[2].addr = Fr::from(1u64 << 40);

    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Malformed {
        row: 2,
        name: "addr and src_addr_end fit the address bytes"
    }));
    assert!(!failures.contains(&VerifyFailure::Malformed {
        row: 2,
        name: "is_pad == (addr >= src_addr_end)"
    }));
}

#[test]
fn test_bytes_left() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);

    // 3, 1, 1 instead of 3, 2, 1
    let mut skipped = witness.clone();
    skipped.copy[2].bytes_left = Fr::one();
    skipped.copy[3].bytes_left = Fr::one();
    let failures = verify(&skipped, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 0,
        name: "bytes_left decrements by one"
    }));

    let mut last = witness;
    last.copy[4].bytes_left = Fr::from(2);
    let failures = verify(&last, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 4,
        name: "bytes_left is 1 on the last step"
    }));
    assert!(failures.contains(&VerifyFailure::Continuity {
        row: 4,
        name: "writer repeats bytes_left"
    }));
}

#[test]
fn test_word_on_source_padded_from_start() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(1),
        src_addr: 0x10,
        src_addr_end: 0x10,
        dst_type: CopyDataType::RlcAcc,
        length: 4,
        rw_counter: 1,
        ..Default::default()
    };
    witness.add_copy_event(&event, r).unwrap();
    assert_eq!(verify(&witness, r), Ok(()));

    let row = &mut witness.copy[0];
    row.is_in_word = Fr::one();
    row.position_in_word = Fr::one();
    row.is_word_start = Fr::one();
    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Malformed {
        row: 0,
        name: "no word on a source padded from the start"
    }));
}

#[test]
fn test_event_constants() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);

    let tampers: [(fn(&mut Row<Fr>), &'static str); 3] = [
        (|row: &mut Row<Fr>| row.id += Fr::one(), "id is constant in an event"),
        (
            |row: &mut Row<Fr>| {
                row.tag = CopyDataType::TxCalldata.value();
                row.is_bytecode = Fr::zero();
                row.is_tx_calldata = Fr::one();
            },
            "tag is constant in an event",
        ),
        (
            |row: &mut Row<Fr>| row.src_addr_end += Fr::one(),
            "src_addr_end is constant in an event",
        ),
    ];
    for (tamper, name) in tampers {
        let mut tampered = witness.clone();
        // third reader of the event
        tamper(&mut tampered.copy[4]);
        let failures = verify(&tampered, r).unwrap_err();
        assert!(
            failures.contains(&VerifyFailure::Continuity { row: 2, name }),
            "{name}: {failures:?}"
        );
    }
}

#[test]
fn test_flipped_is_code() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    assert_eq!(witness.copy[0].is_code, Fr::one());
    witness.copy[0].is_code = Fr::zero();

    let failures = verify(&witness, r).unwrap_err();
    assert_eq!(
        failures,
        vec![VerifyFailure::Lookup {
            row: 0,
            name: "Bytecode lookup",
            matches: 0
        }]
    );
}

#[test]
fn test_missing_rw_operation() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    witness.state.clear();

    let failures = verify(&witness, r).unwrap_err();
    assert_eq!(
        failures,
        vec![VerifyFailure::Lookup {
            row: 63,
            name: "RW word lookup",
            matches: 0
        }]
    );
}

#[test]
fn test_rw_ledger_too_short() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    bytecode_to_memory(&mut witness, r);
    for row in witness.copy.iter_mut() {
        row.rwc_inc_left = Fr::zero();
    }

    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Accounting {
        row: 4,
        name: "RW operations left match the words in flight"
    }));
    assert!(failures.contains(&VerifyFailure::Accounting {
        row: 63,
        name: "RW operations are used up at the end of the event"
    }));
}

// code of 100 bytes mixing PUSH1 with their data and other opcodes
fn sample_code() -> Vec<u8> {
    (0..100u8)
        .map(|i| if i % 3 == 0 { 0x60 } else { i })
        .collect()
}

#[test_case(0x00, 0x00, 54 ; "inside the code")]
#[test_case(0x00, 0x40, 123 ; "past the end of the code")]
#[test_case(0x10, 0x20, 200 ; "mostly padded")]
fn test_codecopy(src_addr: u64, dst_addr: u64, length: u64) {
    init_logger();
    let r = challenge();
    let code = sample_code();
    let mut witness = Witness::<Fr>::default();
    let hash = witness.add_bytecode(&code, r);
    let event = CopyEvent {
        src_type: CopyDataType::Bytecode,
        src_id: NumberOrHash::Hash(hash),
        src_addr,
        src_addr_end: code.len() as u64,
        dst_type: CopyDataType::Memory,
        dst_id: NumberOrHash::Number(1),
        dst_addr,
        length,
        rw_counter: 1,
    };
    let result = witness.add_copy_event(&event, r).unwrap();
    assert_eq!(result.rw_counter_increment, length.div_ceil(32));

    for k in 0..length {
        let expected = code.get((src_addr + k) as usize).copied().unwrap_or_default();
        assert_eq!(witness.memory(1, dst_addr + k), expected);
    }
    assert_eq!(verify(&witness, r), Ok(()));
}

#[test]
fn test_sha3() {
    init_logger();
    let mut rng = XorShiftRng::seed_from_u64(0x5a3);
    let r = Fr::from(rng.gen::<u64>());
    let data: Vec<u8> = (0..0x40).map(|_| rng.gen()).collect();

    let mut witness = Witness::<Fr>::default();
    witness.set_memory(1, 0x20, &data);
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(1),
        src_addr: 0x20,
        src_addr_end: 0x60,
        dst_type: CopyDataType::RlcAcc,
        dst_id: NumberOrHash::Number(1),
        dst_addr: 0,
        length: 0x40,
        rw_counter: 1,
    };
    let result = witness.add_copy_event(&event, r).unwrap();
    assert_eq!(result.rw_counter_increment, 2);
    assert_eq!(result.rlc_result, horner(&data, r));

    let mut digest = keccak256(&data);
    digest.reverse();
    let tables = Tables::new(&witness);
    assert_eq!(
        tables.keccak_lookup(Fr::from(0x40), result.rlc_result),
        Some(rlc(&digest, r))
    );
    assert_eq!(tables.keccak_lookup(Fr::from(0x3f), result.rlc_result), None);
    assert_eq!(verify(&witness, r), Ok(()));
}

#[test]
fn test_calldatacopy() {
    init_logger();
    let r = challenge();
    let calldata: Vec<u8> = (0..50).map(|i| 0xff - i).collect();
    let mut witness = Witness::<Fr>::default();
    witness.add_tx_calldata(1, &calldata).unwrap();
    let event = CopyEvent {
        src_type: CopyDataType::TxCalldata,
        src_id: NumberOrHash::Number(1),
        src_addr: 10,
        src_addr_end: 50,
        dst_type: CopyDataType::Memory,
        dst_id: NumberOrHash::Number(1),
        dst_addr: 0,
        length: 64,
        rw_counter: 1,
    };
    witness.add_copy_event(&event, r).unwrap();
    assert_eq!(witness.memory(1, 39), calldata[49]);
    assert_eq!(witness.memory(1, 40), 0);
    assert_eq!(verify(&witness, r), Ok(()));

    // a calldata byte not in the tx table
    witness.copy[2].value = Fr::from(7);
    witness.copy[3].value = Fr::from(7);
    let failures = verify(&witness, r).unwrap_err();
    assert!(failures.contains(&VerifyFailure::Lookup {
        row: 2,
        name: "Tx calldata lookup",
        matches: 0
    }));
}

#[test]
fn test_log_data() {
    init_logger();
    let r = challenge();
    let mut witness = Witness::<Fr>::default();
    witness.set_memory(3, 0, &[0x11; 40]);
    let event = CopyEvent {
        src_type: CopyDataType::Memory,
        src_id: NumberOrHash::Number(3),
        src_addr: 0,
        src_addr_end: 40,
        dst_type: CopyDataType::TxLog,
        dst_id: NumberOrHash::Number(1),
        dst_addr: tx_log_address(2, 0),
        length: 40,
        rw_counter: 20,
    };
    let result = witness.add_copy_event(&event, r).unwrap();
    assert_eq!(result.rw_counter_increment, 4);
    let log_writes: Vec<_> = witness
        .state
        .iter()
        .filter(|rw| rw.tag == state::Tag::TxLog)
        .collect();
    assert_eq!(log_writes.len(), 2);
    assert_eq!(log_writes[1].address, Fr::from(tx_log_address(2, 32)));
    assert_eq!(verify(&witness, r), Ok(()));
}

fn multi_event_witness(r: Fr) -> Witness<Fr> {
    let mut witness = Witness::<Fr>::default();
    let hash = witness.add_bytecode(&sample_code(), r);
    witness.add_tx_calldata(1, &[1, 2, 3, 4, 5]).unwrap();
    witness.set_memory(1, 0, &[0xab; 70]);

    let events = [
        CopyEvent {
            src_type: CopyDataType::Bytecode,
            src_id: NumberOrHash::Hash(hash),
            src_addr: 90,
            src_addr_end: 100,
            dst_type: CopyDataType::Memory,
            dst_id: NumberOrHash::Number(1),
            dst_addr: 5,
            length: 20,
            ..Default::default()
        },
        CopyEvent {
            src_type: CopyDataType::Memory,
            src_id: NumberOrHash::Number(1),
            src_addr: 3,
            src_addr_end: 70,
            dst_type: CopyDataType::RlcAcc,
            length: 50,
            ..Default::default()
        },
        CopyEvent {
            src_type: CopyDataType::TxCalldata,
            src_id: NumberOrHash::Number(1),
            src_addr: 2,
            src_addr_end: 5,
            dst_type: CopyDataType::Memory,
            dst_id: NumberOrHash::Number(2),
            dst_addr: 33,
            length: 40,
            ..Default::default()
        },
        CopyEvent {
            src_type: CopyDataType::Memory,
            src_id: NumberOrHash::Number(2),
            src_addr: 30,
            src_addr_end: 80,
            dst_type: CopyDataType::TxLog,
            dst_id: NumberOrHash::Number(1),
            dst_addr: tx_log_address(0, 0),
            length: 33,
            ..Default::default()
        },
    ];
    let mut rw_counter = 1;
    for event in events {
        let event = CopyEvent { rw_counter, ..event };
        rw_counter += witness.add_copy_event(&event, r).unwrap().rw_counter_increment;
    }
    witness
}

#[test]
fn test_multi_event() {
    init_logger();
    let r = challenge();
    let witness = multi_event_witness(r);
    assert_eq!(
        witness.copy.iter().filter(|row| row.is_first == Fr::one()).count(),
        4
    );
    // rw counters are unique across events
    let mut counters: Vec<u64> = witness.state.iter().map(|rw| rw.rw_counter.get_lower_64()).collect();
    counters.dedup();
    assert_eq!(counters.len(), witness.state.len());
    assert_eq!(verify(&witness, r), Ok(()));
}

#[test]
fn test_parallel_matches_sequential() {
    init_logger();
    let r = challenge();
    let mut witness = multi_event_witness(r);
    let tables = Tables::new(&witness);
    assert_eq!(verify_copy_table_par(&witness.copy, &tables, r), Ok(()));

    witness.copy[70].value += Fr::one();
    witness.copy[131].rw_counter += Fr::one();
    witness.copy[200].is_pad = Fr::one();
    let tables = Tables::new(&witness);
    let sequential = verify_copy_table(&witness.copy, &tables, r).unwrap_err();
    let parallel = verify_copy_table_par(&witness.copy, &tables, r).unwrap_err();
    assert_eq!(sequential, parallel);
    assert!(sequential.windows(2).all(|pair| pair[0].row() <= pair[1].row()));
}

#[test]
fn test_circuit_params() {
    init_logger();
    let r = challenge();
    let witness = multi_event_witness(r);
    let params = CopyCircuitParams {
        max_rows: witness.copy.len(),
        parallel: true,
    };
    let circuit = CopyCircuit::new_from_witness(&witness, params);
    assert_eq!(circuit.num_rows(), witness.copy.len());
    assert_eq!(circuit.verify(r), Ok(()));

    // a witness checked with another challenge
    assert!(circuit.verify(r + Fr::one()).is_err());
}
