// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod computation;
mod global_function;
mod job_builder;
mod signature;

pub use computation::{
    Computation, ComputationFn, Parameter, RESERVED_METADATA_PREFIX, Signature, Value,
};
pub use global_function::{
    FunctionBinding, FunctionKind, GlobalFunction, eager_global_function, global_function,
    global_function_dispatcher, lazy_global_function,
};
#[allow(deprecated)]
pub use global_function::global_function_with_config;
pub use job_builder::JobBuilder;
pub use signature::{AnnotatedSignatureChecker, SIGNATURE_METADATA_KEY, SignatureChecker};
