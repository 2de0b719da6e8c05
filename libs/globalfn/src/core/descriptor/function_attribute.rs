// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use super::{DistributeStrategy, PlacementScope};

/// Metadata about a bound computation that is not part of the compiled job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionAttribute {
    pub default_placement_scope: Option<PlacementScope>,
    pub default_distribute_strategy: Option<DistributeStrategy>,
    pub allow_cpu_return_op: bool,
}

impl Default for FunctionAttribute {
    fn default() -> Self {
        Self {
            default_placement_scope: None,
            default_distribute_strategy: None,
            allow_cpu_return_op: true,
        }
    }
}
