// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Configuration descriptor: the flat job configuration record plus the
//! per-function attributes that never reach the compiled job.

mod function_attribute;
mod function_desc;
mod job_config;
mod value;

pub use function_attribute::FunctionAttribute;
pub use function_desc::FunctionDesc;
pub use job_config::{
    ExpRunConf, IndexedSlicesOptimizerConf, InitializerConf, JobConfig,
    MemoryAllocationAlgorithmConf, ModelUpdateConf, OpNameSet, PredictConf, TensorRtConfig,
    TrainConf, XrtConfig,
};
pub use value::{ConfigValue, DataType, DistributeStrategy, PlacementScope};
