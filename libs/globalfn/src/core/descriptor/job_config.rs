// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Job configuration record.
//!
//! Field defaults follow the job configuration defaults of the execution
//! engine; fields are independent unless a configuration leaf couples them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ConfigValue, DataType};

/// Flat, typed job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub train_conf: Option<TrainConf>,
    pub predict_conf: Option<PredictConf>,

    pub default_data_type: Option<DataType>,
    pub default_initializer_conf: Option<InitializerConf>,
    pub exp_run_conf: Option<ExpRunConf>,

    pub use_memory_allocation_algorithm_v2: bool,
    pub memory_allocation_algorithm_conf: MemoryAllocationAlgorithmConf,

    pub enable_cudnn: bool,
    pub cudnn_buf_limit_mbyte: i64,
    pub cudnn_conv_force_fwd_algo: Option<i64>,
    pub cudnn_conv_force_bwd_data_algo: Option<i64>,
    pub cudnn_conv_force_bwd_filter_algo: Option<i64>,
    pub cudnn_conv_heuristic_search_algo: bool,
    pub cudnn_conv_use_deterministic_algo_only: bool,
    pub cudnn_conv_enable_pseudo_half: bool,
    pub enable_cudnn_fused_normalization_add_relu: bool,

    pub enable_fuse_add_to_output: bool,
    pub enable_fuse_model_update_ops: bool,
    pub enable_reused_mem: bool,
    pub enable_inplace: bool,
    pub do_parallel_cast_before_widening_type_cast: bool,
    pub enable_non_distributed_optimizer: bool,
    pub prune_parallel_cast_ops: bool,
    pub prune_cast_to_static_shape_ops: bool,
    pub enable_float_compute_for_half_gemm: bool,
    pub enable_auto_mixed_precision: bool,
    pub enable_keep_header_only: bool,
    pub concurrency_width: i64,

    pub indexed_slices_optimizer_conf: Option<IndexedSlicesOptimizerConf>,
    pub xrt_config: XrtConfig,

    /// Values of dynamically declared function flags, keyed by flag name.
    pub flag_name2flag_value: BTreeMap<String, ConfigValue>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            train_conf: None,
            predict_conf: None,
            default_data_type: None,
            default_initializer_conf: None,
            exp_run_conf: None,
            use_memory_allocation_algorithm_v2: true,
            memory_allocation_algorithm_conf: MemoryAllocationAlgorithmConf::default(),
            enable_cudnn: true,
            cudnn_buf_limit_mbyte: 1024,
            cudnn_conv_force_fwd_algo: None,
            cudnn_conv_force_bwd_data_algo: None,
            cudnn_conv_force_bwd_filter_algo: None,
            cudnn_conv_heuristic_search_algo: true,
            cudnn_conv_use_deterministic_algo_only: false,
            cudnn_conv_enable_pseudo_half: false,
            enable_cudnn_fused_normalization_add_relu: false,
            enable_fuse_add_to_output: false,
            enable_fuse_model_update_ops: false,
            enable_reused_mem: true,
            enable_inplace: true,
            do_parallel_cast_before_widening_type_cast: true,
            enable_non_distributed_optimizer: false,
            prune_parallel_cast_ops: true,
            prune_cast_to_static_shape_ops: true,
            enable_float_compute_for_half_gemm: true,
            enable_auto_mixed_precision: false,
            enable_keep_header_only: false,
            concurrency_width: 128,
            indexed_slices_optimizer_conf: None,
            xrt_config: XrtConfig::default(),
            flag_name2flag_value: BTreeMap::new(),
        }
    }
}

impl JobConfig {
    pub fn is_train(&self) -> bool {
        self.train_conf.is_some()
    }

    pub fn is_predict(&self) -> bool {
        self.predict_conf.is_some()
    }

    /// Get the training record, creating it on first use.
    pub fn train_conf_mut(&mut self) -> &mut TrainConf {
        self.train_conf.get_or_insert_with(TrainConf::default)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConf {
    pub model_update_conf: Option<ModelUpdateConf>,
    pub loss_scale_factor: Option<f64>,
    pub primary_lr: Option<f64>,
    pub secondary_lr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictConf {}

/// Static memory allocation policies considered by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryAllocationAlgorithmConf {
    pub use_mem_size_first_algo: bool,
    pub use_mutual_exclusion_first_algo: bool,
    pub use_time_line_algo: bool,
}

impl MemoryAllocationAlgorithmConf {
    pub const POLICIES: [&'static str; 3] = [
        "use_mem_size_first_algo",
        "use_mutual_exclusion_first_algo",
        "use_time_line_algo",
    ];

    pub fn policy(&self, name: &str) -> Option<bool> {
        match name {
            "use_mem_size_first_algo" => Some(self.use_mem_size_first_algo),
            "use_mutual_exclusion_first_algo" => Some(self.use_mutual_exclusion_first_algo),
            "use_time_line_algo" => Some(self.use_time_line_algo),
            _ => None,
        }
    }

    pub fn policy_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "use_mem_size_first_algo" => Some(&mut self.use_mem_size_first_algo),
            "use_mutual_exclusion_first_algo" => Some(&mut self.use_mutual_exclusion_first_algo),
            "use_time_line_algo" => Some(&mut self.use_time_line_algo),
            _ => None,
        }
    }
}

impl Default for MemoryAllocationAlgorithmConf {
    fn default() -> Self {
        Self {
            use_mem_size_first_algo: true,
            use_mutual_exclusion_first_algo: true,
            use_time_line_algo: false,
        }
    }
}

/// Default variable initializer. Exactly one member is expected to be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitializerConf {
    pub constant_conf: Option<ConstantInitializerConf>,
    pub random_uniform_conf: Option<RandomUniformInitializerConf>,
    pub random_normal_conf: Option<RandomNormalInitializerConf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantInitializerConf {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomUniformInitializerConf {
    #[serde(default)]
    pub min: f64,
    #[serde(default = "one")]
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomNormalInitializerConf {
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "one")]
    pub std: f64,
}

fn one() -> f64 {
    1.0
}

/// Experimental run settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpRunConf {
    pub enable_experiment_run: bool,
    pub piece_num_of_experiment_phase: i64,
}

/// Optimizer settings of the legacy `train.*` surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelUpdateConf {
    pub naive_conf: Option<serde_json::Value>,
    pub momentum_conf: Option<MomentumConf>,
    pub adam_conf: Option<AdamConf>,
    pub learning_rate_decay: Option<serde_json::Value>,
    pub warmup_conf: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MomentumConf {
    #[serde(default = "default_beta")]
    pub beta: f64,
}

fn default_beta() -> f64 {
    0.9
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdamConf {
    #[serde(default = "default_beta")]
    pub beta1: f64,
    #[serde(default = "default_beta2")]
    pub beta2: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_beta2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-8
}

/// Ops whose gradients are kept as indexed slices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexedSlicesOptimizerConf {
    pub enable: bool,
    pub include_op_names: OpNameSet,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpNameSet {
    pub op_name: Vec<String>,
}

/// Backend (XLA / TensorRT) switches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XrtConfig {
    pub use_xla_jit: bool,
    pub use_tensorrt: bool,
    pub tensorrt_config: TensorRtConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorRtConfig {
    pub use_fp16: bool,
    pub use_int8: bool,
    pub int8_calibration: Option<String>,
}
