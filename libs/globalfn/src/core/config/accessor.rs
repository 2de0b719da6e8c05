// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::panic::Location;

use crate::core::descriptor::{ConfigValue, FunctionDesc};
use crate::core::error::Result;

use super::{AccessorId, ConfigPathRegistry};

/// One segment of a dotted configuration path, bound to the descriptor it
/// configures.
///
/// ```
/// use globalfn::FunctionConfig;
///
/// let mut config = FunctionConfig::new();
/// config.at("tensorrt")?.get("use_fp16")?.call(&[true.into()])?;
/// assert!(config.function_desc().job_config.xrt_config.use_tensorrt);
/// # Ok::<(), globalfn::GlobalFnError>(())
/// ```
pub struct ConfigAccessor<'a> {
    registry: &'a ConfigPathRegistry,
    desc: &'a mut FunctionDesc,
    node: AccessorId,
}

impl<'a> ConfigAccessor<'a> {
    pub(crate) fn new(
        registry: &'a ConfigPathRegistry,
        desc: &'a mut FunctionDesc,
        node: AccessorId,
    ) -> Self {
        Self { registry, desc, node }
    }

    /// Identity of the accessor; equal for every path sharing this prefix.
    pub fn id(&self) -> AccessorId {
        self.node
    }

    pub fn path(&self) -> &str {
        self.registry.path_of(self.node)
    }

    pub fn is_leaf(&self) -> bool {
        self.registry.is_leaf(self.node)
    }

    /// Advance to the accessor of the next segment.
    pub fn get(self, segment: &str) -> Result<ConfigAccessor<'a>> {
        let node = self.registry.child(self.node, segment)?;
        Ok(Self { node, ..self })
    }

    /// Invoke the leaf installed at this path.
    #[track_caller]
    pub fn call(self, args: &[ConfigValue]) -> Result<ConfigValue> {
        let caller = Location::caller();
        self.registry.invoke(self.node, self.desc, args, caller)
    }
}
