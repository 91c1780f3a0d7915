// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

//! Field and EVM types shared by the copy verifier crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod evm_types;
pub mod keccak;

pub use halo2_proofs::halo2curves::bn256::Fr;
use halo2_proofs::halo2curves::ff::{Field as Halo2Field, PrimeField};
pub use keccak::keccak256;

/// Trait used to reduce verbosity with the declaration of the [`PrimeField`]
/// trait and its repr.
pub trait Field: Halo2Field + PrimeField<Repr = [u8; 32]> {
    /// Re-expose zero element as a function
    fn zero() -> Self {
        Self::ZERO
    }
    /// Re-expose one element as a function
    fn one() -> Self {
        Self::ONE
    }
    /// Gets the lower 64 bits of this field element when expressed
    /// canonically.
    fn get_lower_64(&self) -> u64 {
        let bytes = self.to_repr();
        bytes[..8]
            .iter()
            .rev()
            .fold(0u64, |acc, value| acc * 256u64 + *value as u64)
    }
    /// Returns the canonical value when it fits in `n_bytes` bytes.
    fn to_bounded_bytes(&self, n_bytes: usize) -> Option<Vec<u8>> {
        let bytes = self.to_repr();
        if bytes[n_bytes.min(32)..].iter().any(|b| *b != 0) {
            return None;
        }
        Some(bytes[..n_bytes.min(32)].to_vec())
    }
}

// Impl custom `Field` trait for BN256 Fr to be used and consistent with the
// rest of the workspace.
impl Field for Fr {}

/// Human readable form of a field element: decimal when it fits in a `u64`,
/// big-endian hex otherwise.
pub fn field_to_string<F: Field>(value: &F) -> String {
    match value.to_bounded_bytes(8) {
        Some(_) => value.get_lower_64().to_string(),
        None => {
            let mut bytes = value.to_repr();
            bytes.reverse();
            format!("0x{}", hex::encode(bytes))
        }
    }
}
