// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use crate::core::job::Computation;

use super::{FunctionAttribute, JobConfig};

/// Job configuration plus function attributes, optionally bound to the
/// computation it configures.
///
/// The field set is fixed; only values change after construction.
#[derive(Debug, Clone, Default)]
pub struct FunctionDesc {
    pub job_config: JobConfig,
    pub function_attribute: FunctionAttribute,
    pub job_func: Option<Arc<Computation>>,
}

impl FunctionDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `template`'s configuration into a fresh descriptor bound to
    /// `job_func`. Nothing mutable is shared with the template.
    pub fn clone_bound(template: &FunctionDesc, job_func: Arc<Computation>) -> Self {
        Self {
            job_config: template.job_config.clone(),
            function_attribute: template.function_attribute.clone(),
            job_func: Some(job_func),
        }
    }

    /// Name of the bound computation, if any.
    pub fn job_name(&self) -> Option<&str> {
        self.job_func.as_deref().map(Computation::name)
    }
}
