// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Class of a constraint, used to report which invariant a witness broke
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Booleanity, tag decoding, event boundary placement
    Malformed,
    /// Propagation from one row or step to the next
    Continuity,
    /// RW counter ledger
    Accounting,
}

/// A rejected copy table, located at the row whose window raised it
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerifyFailure {
    /// A structural invariant does not hold
    #[error("row {row}: malformed trace, `{name}` is not satisfied")]
    Malformed { row: usize, name: &'static str },
    /// A cross-row propagation check does not hold
    #[error("row {row}: continuity violation, `{name}` is not satisfied")]
    Continuity { row: usize, name: &'static str },
    /// The RW counter ledger does not balance
    #[error("row {row}: accounting violation, `{name}` is not satisfied")]
    Accounting { row: usize, name: &'static str },
    /// A lookup resolves to no fact or to several
    #[error("row {row}: lookup `{name}` matched {matches} facts instead of exactly one")]
    Lookup {
        row: usize,
        name: &'static str,
        matches: usize,
    },
}

impl VerifyFailure {
    pub(crate) fn new(kind: FailureKind, row: usize, name: &'static str) -> Self {
        match kind {
            FailureKind::Malformed => VerifyFailure::Malformed { row, name },
            FailureKind::Continuity => VerifyFailure::Continuity { row, name },
            FailureKind::Accounting => VerifyFailure::Accounting { row, name },
        }
    }

    /// Index of the first row of the failing window
    pub fn row(&self) -> usize {
        match self {
            VerifyFailure::Malformed { row, .. }
            | VerifyFailure::Continuity { row, .. }
            | VerifyFailure::Accounting { row, .. }
            | VerifyFailure::Lookup { row, .. } => *row,
        }
    }

    /// Name of the failing constraint or lookup
    pub fn name(&self) -> &'static str {
        match self {
            VerifyFailure::Malformed { name, .. }
            | VerifyFailure::Continuity { name, .. }
            | VerifyFailure::Accounting { name, .. }
            | VerifyFailure::Lookup { name, .. } => name,
        }
    }
}
