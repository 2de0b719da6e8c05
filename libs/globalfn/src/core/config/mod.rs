// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Hierarchical configuration over a [`FunctionDesc`](crate::core::descriptor::FunctionDesc).
//!
//! Settings are addressed by dotted paths (`tensorrt.use_fp16`). Each path
//! prefix is an accessor; each full path ends in a leaf that mutates the
//! descriptor.

mod accessor;
mod builtin_leaves;
mod config_file;
mod function_config;
mod function_flags;
mod leaf;
mod path_registry;

pub use accessor::ConfigAccessor;
pub use config_file::{ConfigFile, SettingValue};
pub use function_config::FunctionConfig;
pub use function_flags::{FunctionFlagTable, flags};
pub use leaf::{DeprecationNotice, LeafArgs, LeafFn, LeafId};
pub use path_registry::{AccessorId, ConfigPathRegistry};
