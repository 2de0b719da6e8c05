// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::descriptor::FunctionDesc;
use crate::core::error::Result;
use crate::core::job::Value;

use super::ExecutionMode;

/// Session collaborator: owns initialization, registered jobs and the
/// execution engine behind them.
///
/// Callers serialize access; implementations need no internal locking.
pub trait Session: Send {
    fn is_initialized(&self) -> bool;

    /// Initialize on first call; later calls are no-ops.
    fn ensure_initialized(&mut self) -> Result<()>;

    fn current_execution_mode(&self) -> ExecutionMode;

    /// Take ownership of a bound descriptor as a not-yet-compiled job and
    /// return its job name.
    fn register_job(&mut self, desc: FunctionDesc) -> Result<String>;

    /// Compile registered jobs if not done yet, then run `job_name`.
    fn compile_and_run(&mut self, job_name: &str, args: &[Value]) -> Result<Value>;

    /// Run a bound descriptor without registering it.
    fn run_immediately(&mut self, desc: &FunctionDesc, args: &[Value]) -> Result<Value>;

    /// Names of registered jobs, in registration order.
    fn job_names(&self) -> Vec<String> {
        Vec::new()
    }
}
