// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::descriptor::ConfigValue;
use crate::core::error::Result;

use super::ConfigPathRegistry;

/// Function flags stored in `JobConfig::flag_name2flag_value`.
pub mod flags {
    pub const ENABLE_STAGE_PARTITION: &str = "enable_stage_partition";
    pub const STAGE_PARTITION_SCOPE_IDS: &str = "stage_partition_scope_ids";
    pub const STAGE_PARTITION_STRATEGY: &str = "stage_partition_strategy";
    pub const ENABLE_SSP_VARIABLE_PROXY: &str = "enable_ssp_variable_proxy";
    pub const ENABLE_STAGE_BUFFER: &str = "enable_stage_buffer";
}

/// Declarative table of function flags and their typed defaults.
#[derive(Debug, Clone, Default)]
pub struct FunctionFlagTable {
    entries: Vec<(String, ConfigValue)>,
}

impl FunctionFlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::new()
            .with_flag(flags::ENABLE_STAGE_PARTITION, false)
            .with_flag(flags::STAGE_PARTITION_SCOPE_IDS, ConfigValue::List(Vec::new()))
            .with_flag(flags::STAGE_PARTITION_STRATEGY, "naive_sequential")
            .with_flag(flags::ENABLE_SSP_VARIABLE_PROXY, false)
            .with_flag(flags::ENABLE_STAGE_BUFFER, false)
    }

    pub fn with_flag(mut self, name: &str, default: impl Into<ConfigValue>) -> Self {
        self.entries.push((name.to_string(), default.into()));
        self
    }

    pub fn entries(&self) -> &[(String, ConfigValue)] {
        &self.entries
    }

    /// Declare one top-level leaf per flag.
    pub fn declare_into(&self, registry: &mut ConfigPathRegistry) -> Result<()> {
        for (name, default) in &self.entries {
            registry.declare_function_flag(name, default.clone())?;
        }
        Ok(())
    }
}
