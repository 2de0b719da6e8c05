// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Predicate-based selection between mutually exclusive implementations.
//!
//! Each logical operation owns a fixed, ordered set of candidates. A candidate
//! pairs an implementation with a [`Predicate`] over the [`RuntimeState`];
//! resolution requires exactly one predicate to hold.

mod dispatcher;
mod predicate;
mod runtime_state;

pub use dispatcher::{DispatchCandidate, Dispatcher};
pub use predicate::{Condition, Predicate};
pub use runtime_state::RuntimeState;
