// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commonly used types for `use globalfn::prelude::*`.

pub use crate::core::{
    // Errors
    error::{GlobalFnError, Result},

    // Configuration
    config::FunctionConfig,
    descriptor::{ConfigValue, FunctionDesc},

    // Defining and calling global functions
    job::{Computation, FunctionKind, GlobalFunction, Parameter, Signature, global_function},
    session::{ExecutionMode, LocalSession, Session, SessionContext},

    // Stage placement
    stage::{Stage, SymbolScopeStack},
};
