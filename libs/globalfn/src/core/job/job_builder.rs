// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Binds a configuration template to a computation and hands the result to
//! the session.

use std::sync::Arc;

use crate::core::descriptor::FunctionDesc;
use crate::core::error::Result;
use crate::core::session::Session;

use super::{Computation, SignatureChecker, Value};

/// Produces bound descriptors from a template and a computation.
#[derive(Clone)]
pub struct JobBuilder {
    checker: Arc<dyn SignatureChecker>,
}

impl std::fmt::Debug for JobBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobBuilder").finish_non_exhaustive()
    }
}

impl JobBuilder {
    pub fn new(checker: Arc<dyn SignatureChecker>) -> Self {
        Self { checker }
    }

    /// Check the computation's signature (once per computation) and clone
    /// `template` into a fresh descriptor bound to it.
    ///
    /// Later changes to `template` never reach the returned descriptor.
    pub fn bind(
        &self,
        template: &FunctionDesc,
        computation: &Arc<Computation>,
    ) -> Result<FunctionDesc> {
        self.checker.check_cached(computation)?;
        let desc = FunctionDesc::clone_bound(template, Arc::clone(computation));
        tracing::debug!(
            function = computation.name(),
            train = desc.job_config.is_train(),
            predict = desc.job_config.is_predict(),
            "Bound function descriptor"
        );
        Ok(desc)
    }

    /// Eager path: make sure the session is initialized, then run once.
    pub fn run(session: &mut dyn Session, desc: &FunctionDesc, args: &[Value]) -> Result<Value> {
        session.ensure_initialized()?;
        session.run_immediately(desc, args)
    }

    /// Lazy path: give the descriptor to the session as a pending job.
    pub fn submit(session: &mut dyn Session, desc: FunctionDesc) -> Result<String> {
        session.register_job(desc)
    }
}
