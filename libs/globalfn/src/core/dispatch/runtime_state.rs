// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;

use serde::{Deserialize, Serialize};

/// Snapshot of the process-wide flags that dispatch predicates read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RuntimeState {
    /// A session is active.
    pub session_exists: bool,
    /// The active session runs in eager mode.
    pub eager_execution_enabled: bool,
    /// The active session has been initialized.
    pub session_initialized: bool,
}

impl RuntimeState {
    pub fn new(
        session_exists: bool,
        eager_execution_enabled: bool,
        session_initialized: bool,
    ) -> Self {
        Self {
            session_exists,
            eager_execution_enabled,
            session_initialized,
        }
    }

    /// Every combination of the three flags, for exhaustive checks.
    pub fn all() -> impl Iterator<Item = RuntimeState> {
        (0u8..8).map(|bits| RuntimeState::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0))
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session_exists={}, eager_execution_enabled={}, session_initialized={}",
            self.session_exists, self.eager_execution_enabled, self.session_initialized
        )
    }
}
