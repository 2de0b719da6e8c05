// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::descriptor::FunctionDesc;
use crate::core::error::{GlobalFnError, Result};
use crate::core::job::Value;

use super::{ExecutionMode, Session};

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Initial,
    Initialized,
}

/// A job owned by the session until it is compiled or discarded.
#[derive(Debug, Clone)]
pub struct JobRegistration {
    pub name: String,
    pub function_desc: FunctionDesc,
}

/// In-process session that runs bound computations directly.
#[derive(Debug, Default)]
pub struct LocalSession {
    mode: ExecutionMode,
    status: SessionStatus,
    jobs: Vec<JobRegistration>,
    compiled: bool,
}

impl LocalSession {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn eager() -> Self {
        Self::new(ExecutionMode::Eager)
    }

    pub fn lazy() -> Self {
        Self::new(ExecutionMode::Lazy)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn job(&self, name: &str) -> Option<&JobRegistration> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Drop every registered job that has not been compiled yet.
    pub fn discard_jobs(&mut self) -> usize {
        if self.compiled {
            return 0;
        }
        let discarded = self.jobs.len();
        self.jobs.clear();
        discarded
    }

    fn require_initialized(&self, operation: &str) -> Result<()> {
        if self.status != SessionStatus::Initialized {
            return Err(GlobalFnError::Session(format!(
                "{operation} requires an initialized session"
            )));
        }
        Ok(())
    }

    fn compile(&mut self) -> Result<()> {
        tracing::info!("Compiling {} registered jobs", self.jobs.len());
        for job in &self.jobs {
            tracing::debug!(
                job = job.name.as_str(),
                train = job.function_desc.job_config.is_train(),
                "Compiled job"
            );
        }
        self.compiled = true;
        Ok(())
    }
}

impl Session for LocalSession {
    fn is_initialized(&self) -> bool {
        self.status == SessionStatus::Initialized
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.status == SessionStatus::Initial {
            tracing::info!("Initializing {:?} session", self.mode);
            self.status = SessionStatus::Initialized;
        }
        Ok(())
    }

    fn current_execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    fn register_job(&mut self, desc: FunctionDesc) -> Result<String> {
        if self.is_initialized() {
            return Err(GlobalFnError::Session(
                "cannot register a job after the session is initialized".into(),
            ));
        }
        let name = desc
            .job_name()
            .ok_or_else(|| GlobalFnError::Session("job has no bound computation".into()))?
            .to_string();
        if self.job(&name).is_some() {
            return Err(GlobalFnError::Session(format!(
                "job '{name}' is already registered"
            )));
        }
        tracing::debug!(job = name.as_str(), "Registered job");
        self.jobs.push(JobRegistration {
            name: name.clone(),
            function_desc: desc,
        });
        Ok(name)
    }

    fn compile_and_run(&mut self, job_name: &str, args: &[Value]) -> Result<Value> {
        self.require_initialized("compile_and_run")?;
        if !self.compiled {
            self.compile()?;
        }
        let job = self
            .job(job_name)
            .ok_or_else(|| GlobalFnError::Session(format!("job '{job_name}' is not registered")))?;
        let computation = job
            .function_desc
            .job_func
            .as_ref()
            .ok_or_else(|| GlobalFnError::Session(format!("job '{job_name}' has no computation")))?;
        computation.invoke(args)
    }

    fn run_immediately(&mut self, desc: &FunctionDesc, args: &[Value]) -> Result<Value> {
        self.require_initialized("run_immediately")?;
        let computation = desc
            .job_func
            .as_ref()
            .ok_or_else(|| GlobalFnError::Session("descriptor has no bound computation".into()))?;
        tracing::debug!(function = computation.name(), "Running eagerly");
        computation.invoke(args)
    }

    fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|job| job.name.clone()).collect()
    }
}
