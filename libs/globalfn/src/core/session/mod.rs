// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod context;
mod execution_mode;
mod local_session;
#[allow(clippy::module_inception)]
mod session;

pub use context::{SessionContext, SessionContextBuilder};
pub use execution_mode::ExecutionMode;
pub use local_session::{JobRegistration, LocalSession, SessionStatus};
pub use session::Session;
