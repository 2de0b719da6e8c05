// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::error::{GlobalFnError, Result};

use super::{Predicate, RuntimeState};

/// One implementation of a logical operation, guarded by a predicate.
#[derive(Debug, Clone)]
pub struct DispatchCandidate<T> {
    pub name: &'static str,
    pub predicate: Predicate,
    pub implementation: T,
}

impl<T> DispatchCandidate<T> {
    pub fn new(name: &'static str, predicate: Predicate, implementation: T) -> Self {
        Self {
            name,
            predicate,
            implementation,
        }
    }
}

/// Fixed candidate set for one logical operation.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    operation: &'static str,
    candidates: Vec<DispatchCandidate<T>>,
}

impl<T> Dispatcher<T> {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            candidates: Vec::new(),
        }
    }

    pub fn with_candidate(
        mut self,
        name: &'static str,
        predicate: Predicate,
        implementation: T,
    ) -> Self {
        self.candidates
            .push(DispatchCandidate::new(name, predicate, implementation));
        self
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn candidates(&self) -> &[DispatchCandidate<T>] {
        &self.candidates
    }

    /// Select the single candidate whose predicate holds in `state`.
    ///
    /// Predicates can depend on runtime state unknown at registration time, so
    /// overlap is only detected here.
    pub fn resolve(&self, state: &RuntimeState) -> Result<&T> {
        let matched: Vec<&DispatchCandidate<T>> = self
            .candidates
            .iter()
            .filter(|c| c.predicate.eval(state))
            .collect();

        match matched.as_slice() {
            [only] => {
                tracing::debug!(
                    operation = self.operation,
                    candidate = only.name,
                    "Resolved dispatch ({})",
                    state
                );
                Ok(&only.implementation)
            }
            [] => Err(GlobalFnError::UnsupportedRuntimeState {
                operation: self.operation.to_string(),
                state: *state,
            }),
            _ => Err(GlobalFnError::AmbiguousDispatch {
                operation: self.operation.to_string(),
                matched: matched.iter().map(|c| c.name.to_string()).collect(),
                state: *state,
            }),
        }
    }
}
