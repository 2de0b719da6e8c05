// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use crate::core::descriptor::{ConfigValue, FunctionDesc};
use crate::core::error::{GlobalFnError, Result};
use crate::core::stage::{Stage, StagePlan, ScopeSubsystem, plan_stages};

use super::{AccessorId, ConfigAccessor, ConfigFile, ConfigPathRegistry, flags};

/// User-facing configuration object: a descriptor plus the path registry
/// that knows how to mutate it.
#[derive(Clone)]
pub struct FunctionConfig {
    registry: Arc<ConfigPathRegistry>,
    function_desc: FunctionDesc,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionConfig")
            .field("function_desc", &self.function_desc)
            .finish_non_exhaustive()
    }
}

impl FunctionConfig {
    /// Default descriptor over the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(ConfigPathRegistry::builtin())
    }

    pub fn with_registry(registry: Arc<ConfigPathRegistry>) -> Self {
        Self {
            registry,
            function_desc: FunctionDesc::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ConfigPathRegistry> {
        &self.registry
    }

    pub fn function_desc(&self) -> &FunctionDesc {
        &self.function_desc
    }

    pub fn function_desc_mut(&mut self) -> &mut FunctionDesc {
        &mut self.function_desc
    }

    pub fn into_function_desc(self) -> FunctionDesc {
        self.function_desc
    }

    /// Accessor for the first segment of a path.
    pub fn at(&mut self, segment: &str) -> Result<ConfigAccessor<'_>> {
        ConfigAccessor::new(&self.registry, &mut self.function_desc, AccessorId::ROOT).get(segment)
    }

    /// Accessor for a full dotted path.
    pub fn path(&mut self, path: &str) -> Result<ConfigAccessor<'_>> {
        let node = self.registry.resolve(path)?;
        Ok(ConfigAccessor::new(&self.registry, &mut self.function_desc, node))
    }

    /// Invoke the leaf at `path` with `args`.
    #[track_caller]
    pub fn set(&mut self, path: &str, args: &[ConfigValue]) -> Result<ConfigValue> {
        let caller = Location::caller();
        let node = self.registry.resolve(path)?;
        self.registry.invoke(node, &mut self.function_desc, args, caller)
    }

    /// Apply every setting of `file`, in file order.
    #[track_caller]
    pub fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        for (path, value) in file.settings {
            self.set(&path, &value.into_args())?;
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config = Self::new();
        config.apply_file(ConfigFile::from_yaml_str(content)?)?;
        Ok(config)
    }

    /// Load `globalfn.yaml` from `dir`. Fails if the file is missing.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::new();
        config.apply_file(ConfigFile::load(dir)?)?;
        Ok(config)
    }

    /// Load `globalfn.yaml` from `dir`, or the default configuration if the
    /// file does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        if dir.join(ConfigFile::FILE_NAME).exists() {
            Self::load(dir)
        } else {
            tracing::debug!(
                "No {} in {}, using defaults",
                ConfigFile::FILE_NAME,
                dir.display()
            );
            Ok(Self::new())
        }
    }

    /// Plan pipeline stages and switch on stage partitioning with the
    /// resulting scope ids. Nothing is set if planning fails.
    #[track_caller]
    pub fn ssp_placement<S: ScopeSubsystem>(
        &mut self,
        scopes: &mut S,
        stages: &[Stage<S::Placement>],
        strategy: &str,
    ) -> Result<StagePlan> {
        let plan = plan_stages(scopes, stages)?;
        let scope_ids = plan
            .scope_ids
            .iter()
            .map(|id| {
                i64::try_from(id.0).map(ConfigValue::Int).map_err(|_| {
                    GlobalFnError::invalid_value(
                        flags::STAGE_PARTITION_SCOPE_IDS,
                        format!("{id} does not fit i64"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.set(flags::ENABLE_STAGE_PARTITION, &[true.into()])?;
        self.set(flags::STAGE_PARTITION_SCOPE_IDS, &[ConfigValue::List(scope_ids)])?;
        self.set(flags::STAGE_PARTITION_STRATEGY, &[strategy.into()])?;
        self.set(flags::ENABLE_SSP_VARIABLE_PROXY, &[true.into()])?;
        self.set(flags::ENABLE_STAGE_BUFFER, &[true.into()])?;
        tracing::info!(
            stages = stages.len(),
            strategy,
            "Enabled stage partitioning"
        );
        Ok(plan)
    }
}
