// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Turning a computation into a callable global function.
//!
//! Which builder runs depends on the session state at definition time:
//!
//! | session | eager | initialized | builder                 |
//! |---------|-------|-------------|-------------------------|
//! | yes     | yes   | any         | `eager_global_function` |
//! | yes     | no    | no          | `lazy_global_function`  |
//! | other   |       |             | unsupported             |

use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::config::FunctionConfig;
use crate::core::descriptor::{FunctionDesc, PredictConf, TrainConf};
use crate::core::dispatch::{Dispatcher, Predicate};
use crate::core::error::Result;
use crate::core::session::{ExecutionMode, SessionContext};

use super::{Computation, JobBuilder, RESERVED_METADATA_PREFIX, Value};

/// What a global function is defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Train,
    #[default]
    Predict,
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Predict => write!(f, "predict"),
        }
    }
}

/// How a global function reaches the session when called.
#[derive(Debug, Clone)]
pub enum FunctionBinding {
    /// Owns its bound descriptor and runs it immediately on every call.
    Eager(FunctionDesc),
    /// Refers to a job registered with the session at definition time.
    Lazy { job_name: String },
}

/// Callable produced by [`global_function`].
#[derive(Debug, Clone)]
pub struct GlobalFunction {
    name: String,
    binding: FunctionBinding,
    metadata: BTreeMap<String, Value>,
}

impl GlobalFunction {
    fn new(computation: &Computation, binding: FunctionBinding) -> Self {
        let metadata = computation
            .metadata()
            .into_iter()
            .filter(|(key, _)| key.starts_with(RESERVED_METADATA_PREFIX))
            .collect();
        Self {
            name: computation.name().to_string(),
            binding,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &FunctionBinding {
        &self.binding
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        match self.binding {
            FunctionBinding::Eager(_) => ExecutionMode::Eager,
            FunctionBinding::Lazy { .. } => ExecutionMode::Lazy,
        }
    }

    /// Reserved-prefix metadata of the computation as it was when the
    /// function was defined.
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Bound descriptor of an eager function.
    pub fn function_desc(&self) -> Option<&FunctionDesc> {
        match &self.binding {
            FunctionBinding::Eager(desc) => Some(desc),
            FunctionBinding::Lazy { .. } => None,
        }
    }

    pub fn call(&self, ctx: &mut SessionContext, args: &[Value]) -> Result<Value> {
        let session = ctx.session_mut()?;
        match &self.binding {
            FunctionBinding::Eager(desc) => JobBuilder::run(session, desc, args),
            FunctionBinding::Lazy { job_name } => {
                session.ensure_initialized()?;
                session.compile_and_run(job_name, args)
            }
        }
    }
}

pub type GlobalFunctionBuilder =
    fn(&mut SessionContext, &FunctionDesc, &Arc<Computation>) -> Result<GlobalFunction>;

/// The two global-function builders and the states each accepts.
pub fn global_function_dispatcher() -> Dispatcher<GlobalFunctionBuilder> {
    Dispatcher::new("global_function")
        .with_candidate(
            "eager_global_function",
            Predicate::session_exists() & Predicate::eager_execution_enabled(),
            eager_global_function as GlobalFunctionBuilder,
        )
        .with_candidate(
            "lazy_global_function",
            Predicate::session_exists()
                & !Predicate::eager_execution_enabled()
                & !Predicate::session_initialized(),
            lazy_global_function as GlobalFunctionBuilder,
        )
}

/// Define `computation` as a global function of `kind`, configured by
/// `config` (or a default configuration).
///
/// `config` is copied; changing it afterwards does not affect the result.
pub fn global_function(
    ctx: &mut SessionContext,
    kind: FunctionKind,
    config: Option<&FunctionConfig>,
    computation: impl Into<Arc<Computation>>,
) -> Result<GlobalFunction> {
    let mut template = config
        .map(|config| config.function_desc().clone())
        .unwrap_or_default();
    match kind {
        FunctionKind::Train => {
            template.job_config.train_conf.get_or_insert_with(TrainConf::default);
        }
        FunctionKind::Predict => {
            template.job_config.predict_conf.get_or_insert_with(PredictConf::default);
        }
    }
    let function = define(ctx, &template, computation.into())?;
    tracing::info!(
        function = function.name(),
        %kind,
        mode = ?function.execution_mode(),
        "Defined global function"
    );
    Ok(function)
}

/// Older entry point that takes only a configuration. The descriptor is
/// used as given, without marking it as a train or predict job.
#[deprecated(note = "use `global_function` with an explicit `FunctionKind`")]
#[track_caller]
pub fn global_function_with_config(
    ctx: &mut SessionContext,
    config: &FunctionConfig,
    computation: impl Into<Arc<Computation>>,
) -> Result<GlobalFunction> {
    let location = Location::caller();
    tracing::warn!(
        %location,
        "global_function_with_config is deprecated; use global_function with a function kind"
    );
    define(ctx, config.function_desc(), computation.into())
}

fn define(
    ctx: &mut SessionContext,
    template: &FunctionDesc,
    computation: Arc<Computation>,
) -> Result<GlobalFunction> {
    let state = ctx.runtime_state();
    let builder = *global_function_dispatcher().resolve(&state)?;
    builder(ctx, template, &computation)
}

/// Bind a copy of the template and keep it on the returned function.
pub fn eager_global_function(
    ctx: &mut SessionContext,
    template: &FunctionDesc,
    computation: &Arc<Computation>,
) -> Result<GlobalFunction> {
    let desc = ctx.job_builder().bind(template, computation)?;
    Ok(GlobalFunction::new(computation, FunctionBinding::Eager(desc)))
}

/// Bind a copy of the template and register it with the session as a
/// pending job.
pub fn lazy_global_function(
    ctx: &mut SessionContext,
    template: &FunctionDesc,
    computation: &Arc<Computation>,
) -> Result<GlobalFunction> {
    let desc = ctx.job_builder().bind(template, computation)?;
    let job_name = JobBuilder::submit(ctx.session_mut()?, desc)?;
    Ok(GlobalFunction::new(computation, FunctionBinding::Lazy { job_name }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::RuntimeState;
    use crate::core::error::GlobalFnError;
    use crate::core::job::{Parameter, SIGNATURE_METADATA_KEY, Signature};
    use crate::core::session::{LocalSession, Session};
    use serde_json::json;

    fn double() -> Computation {
        let signature = Signature::new().with_parameter(Parameter::annotated("x", "Blob"));
        Computation::new("double", signature, |args| {
            Ok(json!(args[0].as_i64().unwrap_or_default() * 2))
        })
    }

    #[test]
    fn test_dispatch_table_covers_states_without_overlap() {
        let dispatcher = global_function_dispatcher();
        for state in RuntimeState::all() {
            let matched = dispatcher
                .candidates()
                .iter()
                .filter(|candidate| candidate.predicate.eval(&state))
                .count();
            assert!(matched <= 1, "overlap at {state}");
        }
    }

    #[test]
    fn test_no_session_is_unsupported() {
        let mut ctx = SessionContext::new();
        let err = global_function(&mut ctx, FunctionKind::Predict, None, double()).unwrap_err();
        assert!(matches!(err, GlobalFnError::UnsupportedRuntimeState { .. }));
    }

    #[test]
    fn test_eager_definition_and_call() {
        let mut ctx = SessionContext::with_session(LocalSession::eager());
        let function = global_function(&mut ctx, FunctionKind::Train, None, double()).unwrap();

        assert_eq!(function.execution_mode(), ExecutionMode::Eager);
        let desc = function.function_desc().unwrap();
        assert!(desc.job_config.is_train());
        assert!(!desc.job_config.is_predict());
        assert!(function.metadata().contains_key(SIGNATURE_METADATA_KEY));

        assert_eq!(function.call(&mut ctx, &[json!(21)]).unwrap(), json!(42));
        assert!(ctx.session().unwrap().job_names().is_empty());
    }

    #[test]
    fn test_lazy_definition_registers_job() {
        let mut ctx = SessionContext::with_session(LocalSession::lazy());
        let function = global_function(&mut ctx, FunctionKind::Predict, None, double()).unwrap();

        assert_eq!(function.execution_mode(), ExecutionMode::Lazy);
        assert_eq!(ctx.session().unwrap().job_names(), ["double"]);
        assert_eq!(function.call(&mut ctx, &[json!(4)]).unwrap(), json!(8));
        assert!(ctx.session().unwrap().is_initialized());
    }

    #[test]
    fn test_lazy_after_initialization_is_unsupported() {
        let mut ctx = SessionContext::with_session(LocalSession::lazy());
        ctx.session_mut().unwrap().ensure_initialized().unwrap();
        let err = global_function(&mut ctx, FunctionKind::Predict, None, double()).unwrap_err();
        assert!(matches!(err, GlobalFnError::UnsupportedRuntimeState { .. }));
    }

    #[test]
    #[allow(deprecated)]
    fn test_config_only_form_uses_config_as_given() {
        let mut ctx = SessionContext::with_session(LocalSession::eager());
        let config = FunctionConfig::new();

        let function = global_function_with_config(&mut ctx, &config, double()).unwrap();
        let job_config = &function.function_desc().unwrap().job_config;
        assert!(!job_config.is_train());
        assert!(!job_config.is_predict());
    }

    #[test]
    fn test_only_reserved_metadata_is_copied() {
        let computation = Arc::new(double());
        computation.set_metadata("owner", json!("vision"));

        let mut ctx = SessionContext::with_session(LocalSession::eager());
        let function = global_function(&mut ctx, FunctionKind::Predict, None, computation).unwrap();

        assert!(function.metadata().contains_key(SIGNATURE_METADATA_KEY));
        assert!(!function.metadata().contains_key("owner"));
    }
}
