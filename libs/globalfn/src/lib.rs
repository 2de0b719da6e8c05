// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Global functions: user computations turned into callable jobs, configured
//! through a dotted-path configuration surface and dispatched on the current
//! session state.

#![allow(clippy::type_complexity)] // Leaf closures are clear in context

pub use serde_json;

pub mod core;

pub use crate::core::prelude;

pub use crate::core::{
    ConfigAccessor, ConfigFile, ConfigPathRegistry, ConfigValue, Computation, Dispatcher,
    ExecutionMode, FunctionConfig, FunctionDesc, FunctionKind, GlobalFnError, GlobalFunction,
    JobBuilder, LocalSession, Parameter, Predicate, Result, RuntimeState, Session,
    SessionContext, Signature, Stage, StagePlan, global_function, plan_stages,
};
