// Copyright (C) SAFIT. All rights reserved.
// Copyright (C) BABEC. All rights reserved.
// Copyright (C) THL A29 Limited, a Tencent company. All rights reserved.
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{FailureKind, VerifyFailure};
use crate::table::{LookupEntry, Tables};
use eth_types::Field;
use gadgets::bool_check;

type Constraint<F> = (&'static str, FailureKind, F);
type Lookup<F> = (&'static str, F, LookupEntry<F>);

/// Collects the constraints of one window as named values that must be zero.
/// Everything added inside `condition` is multiplied by the condition, so a
/// constraint is checked on every row and only vanishes through its gate.
pub struct ConstraintBuilder<F> {
    constraints: Vec<Constraint<F>>,
    lookups: Vec<Lookup<F>>,
    condition: F,
    kind: FailureKind,
}

impl<F: Field> Default for ConstraintBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> ConstraintBuilder<F> {
    pub fn new() -> Self {
        Self {
            constraints: vec![],
            lookups: vec![],
            condition: F::ONE,
            kind: FailureKind::Malformed,
        }
    }

    /// Classify the constraints added by `build`
    pub fn kind(&mut self, kind: FailureKind, build: impl FnOnce(&mut Self)) {
        let original = std::mem::replace(&mut self.kind, kind);
        build(self);
        self.kind = original;
    }

    /// Gate the constraints and lookups added by `build`
    pub fn condition(&mut self, condition: F, build: impl FnOnce(&mut Self)) {
        let original = self.condition;
        self.condition = original * condition;
        build(self);
        self.condition = original;
    }

    pub fn require_zero(&mut self, name: &'static str, value: F) {
        self.constraints
            .push((name, self.kind, self.condition * value));
    }

    pub fn require_equal(&mut self, name: &'static str, lhs: F, rhs: F) {
        self.require_zero(name, lhs - rhs)
    }

    pub fn require_boolean(&mut self, name: &'static str, value: F) {
        self.require_zero(name, bool_check(value))
    }

    /// Look up `entry`, active when the current condition is not zero
    pub fn add_lookup(&mut self, name: &'static str, entry: LookupEntry<F>) {
        self.lookups.push((name, self.condition, entry));
    }

    /// Failures of the collected constraints and lookups, reported at `row`
    pub fn failures(&self, row: usize, tables: &Tables<F>) -> Vec<VerifyFailure> {
        let constraints = self
            .constraints
            .iter()
            .filter(|(_, _, value)| *value != F::ZERO)
            .map(|(name, kind, _)| VerifyFailure::new(*kind, row, *name));
        let lookups = self
            .lookups
            .iter()
            .filter(|(_, condition, _)| *condition != F::ZERO)
            .filter_map(|(name, _, entry)| {
                let matches = tables.matches(entry);
                (matches != 1).then_some(VerifyFailure::Lookup {
                    row,
                    name: *name,
                    matches,
                })
            });
        constraints.chain(lookups).collect()
    }

    /// Names of the constraints that do not vanish
    #[cfg(test)]
    pub(crate) fn failing(&self) -> Vec<&'static str> {
        self.constraints
            .iter()
            .filter(|(_, _, value)| *value != F::ZERO)
            .map(|(name, _, _)| *name)
            .collect()
    }
}
