// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// Opaque handle of an entered scope, consumed by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Scope-level configuration carried by a stage sub-scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageScopeConfig {
    pub stage_placement_id: usize,
    pub stage_weight_buffer_size: usize,
}

/// Placement/scope subsystem the planner sequences.
///
/// Scopes nest: every successful `enter_*` is paired with exactly one
/// [`ScopeSubsystem::exit`], innermost first.
pub trait ScopeSubsystem {
    type Placement;

    fn enter_placement(&mut self, placement: &Self::Placement) -> Result<()>;

    fn enter_stage_config(&mut self, config: StageScopeConfig) -> Result<()>;

    /// Id of the innermost active scope. May allocate the id on first read.
    fn current_scope_id(&mut self) -> Result<ScopeId>;

    fn exit(&mut self);
}

/// An entered scope. Exits on drop, including on early returns.
pub struct ScopeGuard<'a, S: ScopeSubsystem> {
    scopes: &'a mut S,
}

impl<'a, S: ScopeSubsystem> ScopeGuard<'a, S> {
    pub fn placement(scopes: &'a mut S, placement: &S::Placement) -> Result<Self> {
        scopes.enter_placement(placement)?;
        Ok(Self { scopes })
    }

    pub fn stage_config(scopes: &'a mut S, config: StageScopeConfig) -> Result<Self> {
        scopes.enter_stage_config(config)?;
        Ok(Self { scopes })
    }
}

impl<S: ScopeSubsystem> Deref for ScopeGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scopes
    }
}

impl<S: ScopeSubsystem> DerefMut for ScopeGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scopes
    }
}

impl<S: ScopeSubsystem> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        self.scopes.exit();
    }
}
