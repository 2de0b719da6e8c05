// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Built-in configuration leaf table.

use crate::core::descriptor::{
    ConfigValue, ExpRunConf, IndexedSlicesOptimizerConf, InitializerConf,
    MemoryAllocationAlgorithmConf, ModelUpdateConf,
};
use crate::core::error::{GlobalFnError, Result};

use super::ConfigPathRegistry;

/// Bool field on the job config; the argument is required.
macro_rules! bool_leaf {
    ($registry:expr, $field:ident) => {
        $registry.declare(stringify!($field), |desc, args| {
            desc.job_config.$field = args.bool()?;
            Ok(ConfigValue::Unit)
        })?
    };
}

/// Bool field on the job config; calling without an argument sets `true`.
macro_rules! flag_leaf {
    ($registry:expr, $field:ident) => {
        $registry.declare(stringify!($field), |desc, args| {
            desc.job_config.$field = args.flag()?;
            Ok(ConfigValue::Unit)
        })?
    };
}

macro_rules! structured_leaf {
    ($registry:expr, $field:ident, $conf:ty) => {
        $registry.declare(stringify!($field), |desc, args| {
            desc.job_config.$field = Some(args.structured::<$conf>()?);
            Ok(ConfigValue::Unit)
        })?
    };
}

pub(crate) fn declare_builtin_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    declare_job_leaves(registry)?;
    declare_memory_policy_leaves(registry)?;
    declare_backend_leaves(registry)?;
    declare_attribute_leaves(registry)?;
    declare_train_leaves(registry)?;
    declare_retired_leaves(registry)?;
    Ok(())
}

fn declare_job_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    registry.declare("default_data_type", |desc, args| {
        desc.job_config.default_data_type = Some(args.data_type()?);
        Ok(ConfigValue::Unit)
    })?;
    structured_leaf!(registry, default_initializer_conf, InitializerConf);
    structured_leaf!(registry, exp_run_conf, ExpRunConf);
    structured_leaf!(registry, indexed_slices_optimizer_conf, IndexedSlicesOptimizerConf);

    bool_leaf!(registry, use_memory_allocation_algorithm_v2);
    bool_leaf!(registry, cudnn_conv_heuristic_search_algo);
    bool_leaf!(registry, enable_cudnn_fused_normalization_add_relu);
    bool_leaf!(registry, enable_fuse_add_to_output);
    bool_leaf!(registry, cudnn_conv_use_deterministic_algo_only);
    bool_leaf!(registry, enable_fuse_model_update_ops);

    flag_leaf!(registry, enable_cudnn);
    flag_leaf!(registry, enable_reused_mem);
    flag_leaf!(registry, enable_inplace);
    flag_leaf!(registry, do_parallel_cast_before_widening_type_cast);
    flag_leaf!(registry, enable_non_distributed_optimizer);
    flag_leaf!(registry, prune_parallel_cast_ops);
    flag_leaf!(registry, prune_cast_to_static_shape_ops);
    flag_leaf!(registry, enable_float_compute_for_half_gemm);
    flag_leaf!(registry, enable_auto_mixed_precision);
    flag_leaf!(registry, enable_keep_header_only);

    registry.declare("cudnn_buf_limit_mbyte", |desc, args| {
        desc.job_config.cudnn_buf_limit_mbyte = args.int()?;
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("cudnn_conv_force_fwd_algo", |desc, args| {
        desc.job_config.cudnn_conv_force_fwd_algo = Some(args.int()?);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("cudnn_conv_force_bwd_data_algo", |desc, args| {
        desc.job_config.cudnn_conv_force_bwd_data_algo = Some(args.int()?);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("cudnn_conv_force_bwd_filter_algo", |desc, args| {
        desc.job_config.cudnn_conv_force_bwd_filter_algo = Some(args.int()?);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("concurrency_width", |desc, args| {
        desc.job_config.concurrency_width = args.int()?;
        Ok(ConfigValue::Unit)
    })?;

    registry.declare_aliases(
        &["enable_true_half_config_when_conv", "cudnn_conv_enable_true_half"],
        |desc, args| {
            desc.job_config.cudnn_conv_enable_pseudo_half = !args.flag()?;
            Ok(ConfigValue::Unit)
        },
    )?;
    registry.declare_aliases(
        &["cudnn_conv_enable_pseudo_half", "enable_cudnn_conv_pseudo_half"],
        |desc, args| {
            desc.job_config.cudnn_conv_enable_pseudo_half = args.bool()?;
            Ok(ConfigValue::Unit)
        },
    )?;
    Ok(())
}

fn unknown_policy(name: &str) -> GlobalFnError {
    GlobalFnError::UnknownConfigField(format!("memory_allocation_algorithm_conf.{name}"))
}

fn declare_memory_policy_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    const WHITE_LIST: &str = "static_mem_alloc_policy_white_list";

    registry.declare(&format!("{WHITE_LIST}.has"), |desc, args| {
        let policy = args.string()?;
        let conf = &desc.job_config.memory_allocation_algorithm_conf;
        conf.policy(&policy)
            .map(ConfigValue::Bool)
            .ok_or_else(|| unknown_policy(&policy))
    })?;
    for (verb, enabled) in [("add", true), ("remove", false)] {
        registry.declare(&format!("{WHITE_LIST}.{verb}"), move |desc, args| {
            let policy = args.string()?;
            let conf = &mut desc.job_config.memory_allocation_algorithm_conf;
            *conf.policy_mut(&policy).ok_or_else(|| unknown_policy(&policy))? = enabled;
            Ok(ConfigValue::Unit)
        })?;
    }

    let [mem_size_first, mutual_exclusion_first, time_line] =
        MemoryAllocationAlgorithmConf::POLICIES;
    for (leaf, policy) in [
        ("policy_mem_size_first", mem_size_first),
        ("policy_mutual_exclusion_first", mutual_exclusion_first),
        ("policy_time_line", time_line),
    ] {
        registry.declare(&format!("{WHITE_LIST}.{leaf}"), move |_, args| {
            args.none()?;
            Ok(ConfigValue::from(policy))
        })?;
    }

    registry.declare("static_mem_alloc_algo_white_list.show", |_, args| {
        args.none()?;
        Ok(ConfigValue::List(
            MemoryAllocationAlgorithmConf::POLICIES
                .iter()
                .map(|p| ConfigValue::from(*p))
                .collect(),
        ))
    })?;
    Ok(())
}

fn declare_backend_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    registry.declare("use_xla_jit", |desc, args| {
        desc.job_config.xrt_config.use_xla_jit = args.flag()?;
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("use_tensorrt", |desc, args| {
        desc.job_config.xrt_config.use_tensorrt = args.flag()?;
        Ok(ConfigValue::Unit)
    })?;

    // Sub-settings switch the backend on.
    registry.declare("tensorrt.use_fp16", |desc, args| {
        let value = args.flag()?;
        let xrt = &mut desc.job_config.xrt_config;
        xrt.use_tensorrt = true;
        xrt.tensorrt_config.use_fp16 = value;
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("tensorrt.use_int8", |desc, args| {
        let value = args.flag()?;
        let xrt = &mut desc.job_config.xrt_config;
        xrt.use_tensorrt = true;
        xrt.tensorrt_config.use_int8 = value;
        Ok(ConfigValue::Unit)
    })?;

    // Calibration only makes sense once int8 mode is configured.
    registry.declare("tensorrt.int8_calibration", |desc, args| {
        let calibration = args.string()?;
        let tensorrt = &mut desc.job_config.xrt_config.tensorrt_config;
        if !tensorrt.use_int8 {
            return Err(GlobalFnError::PreconditionNotMet {
                path: args.path().to_string(),
                requires: "tensorrt.use_int8".into(),
            });
        }
        tensorrt.int8_calibration = Some(calibration);
        Ok(ConfigValue::Unit)
    })?;
    Ok(())
}

fn declare_attribute_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    registry.declare("default_placement_scope", |desc, args| {
        desc.function_attribute.default_placement_scope = Some(args.placement()?);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("default_logical_view", |desc, args| {
        desc.function_attribute.default_distribute_strategy = Some(args.strategy()?);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare("allow_cpu_return_op", |desc, args| {
        desc.function_attribute.allow_cpu_return_op = args.bool()?;
        Ok(ConfigValue::Unit)
    })?;
    registry.declare_deprecated_alias("default_distribute_strategy", "default_logical_view")?;
    Ok(())
}

fn train_notice(path: &str) -> String {
    format!("'{path}' has been deprecated. Please replace it by the new optimizer api.")
}

fn declare_train_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    registry.declare_deprecated(
        "train.model_update_conf",
        train_notice("train.model_update_conf"),
        |desc, args| {
            let conf = args.structured::<ModelUpdateConf>()?;
            desc.job_config.train_conf_mut().model_update_conf = Some(conf);
            Ok(ConfigValue::Unit)
        },
    )?;
    registry.declare_deprecated(
        "train.loss_scale_factor",
        train_notice("train.loss_scale_factor"),
        |desc, args| {
            let factor = args.float()?;
            desc.job_config.train_conf_mut().loss_scale_factor = Some(factor);
            Ok(ConfigValue::Unit)
        },
    )?;
    registry.declare_deprecated("train.primary_lr", train_notice("train.primary_lr"), |desc, args| {
        let lr = args.float()?;
        desc.job_config.train_conf_mut().primary_lr = Some(lr);
        Ok(ConfigValue::Unit)
    })?;
    registry.declare_deprecated(
        "train.secondary_lr",
        train_notice("train.secondary_lr"),
        |desc, args| {
            let lr = args.float()?;
            desc.job_config.train_conf_mut().secondary_lr = Some(lr);
            Ok(ConfigValue::Unit)
        },
    )?;
    Ok(())
}

const RETIRED_LEAVES: [&str; 12] = [
    "enable_inplace_in_reduce_struct",
    "enable_nccl",
    "use_nccl_inter_node_communication",
    "use_boxing_v2",
    "enable_all_reduce_group",
    "all_reduce_group_num",
    "all_reduce_lazy_ratio",
    "all_reduce_group_min_mbyte",
    "all_reduce_group_size_warmup",
    "all_reduce_fp16",
    "disable_all_reduce_sequence",
    "non_distributed_optimizer_group_size_mbyte",
];

fn declare_retired_leaves(registry: &mut ConfigPathRegistry) -> Result<()> {
    for path in RETIRED_LEAVES {
        registry.declare_retired(path)?;
    }
    Ok(())
}
