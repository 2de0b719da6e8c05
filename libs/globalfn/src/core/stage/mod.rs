// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline stage placement for stale-synchronous-parallel training.
//!
//! The planner turns an ordered list of [`Stage`]s into the scope ids the
//! execution engine uses to route weight buffering per device scope.

mod planner;
mod scope;
#[allow(clippy::module_inception)]
mod stage;
mod symbol_scope_stack;

pub use planner::{plan_stages, StagePlan};
pub use scope::{ScopeGuard, ScopeId, ScopeSubsystem, StageScopeConfig};
pub use stage::Stage;
pub use symbol_scope_stack::{ScopeSymbol, SymbolScopeStack};
