// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

/// How a session executes global functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run immediately on each call; nothing persists.
    Eager,
    /// Register as a job, compile on first call, then run the compiled job.
    #[default]
    Lazy,
}

impl ExecutionMode {
    pub fn is_eager(self) -> bool {
        matches!(self, Self::Eager)
    }
}
