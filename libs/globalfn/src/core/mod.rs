// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod prelude;
pub mod session;
pub mod stage;

pub use config::*;
pub use descriptor::*;
pub use dispatch::*;
pub use error::*;
pub use job::*;
pub use session::*;
pub use stage::*;
