// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// Integration tests for the dotted-path configuration surface.
///
/// Covers custom leaf declaration, backend preconditions, call-site
/// deprecation notices and `globalfn.yaml` loading.
use std::sync::Arc;

use globalfn::core::config::{ConfigFile, ConfigPathRegistry, FunctionConfig};
use globalfn::core::descriptor::{ConfigValue, DataType, DistributeStrategy};
use globalfn::GlobalFnError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Built-in table in a registry of its own, so deprecation bookkeeping is
/// not shared with other tests.
fn fresh_config() -> FunctionConfig {
    let registry = ConfigPathRegistry::with_builtin_leaves().expect("built-in leaves declare");
    FunctionConfig::with_registry(Arc::new(registry))
}

#[test]
fn test_custom_leaf_sets_descriptor_field() {
    let mut registry = ConfigPathRegistry::new();
    registry
        .declare("x.y", |desc, args| {
            desc.job_config.concurrency_width = args.int()?;
            Ok(ConfigValue::Unit)
        })
        .unwrap();
    let mut config = FunctionConfig::with_registry(Arc::new(registry));

    config.at("x").unwrap().get("y").unwrap().call(&[7.into()]).unwrap();

    assert_eq!(config.function_desc().job_config.concurrency_width, 7);
}

#[test]
fn test_calling_intermediate_accessor_fails() {
    let mut config = FunctionConfig::new();
    let err = config.at("tensorrt").unwrap().call(&[]).unwrap_err();
    assert!(matches!(err, GlobalFnError::UnknownConfigField(path) if path == "tensorrt"));
}

#[test]
fn test_calibration_requires_int8() {
    let mut config = FunctionConfig::new();

    let err = config
        .set("tensorrt.int8_calibration", &["/data/calib".into()])
        .unwrap_err();
    assert!(matches!(
        err,
        GlobalFnError::PreconditionNotMet { ref requires, .. } if requires == "tensorrt.use_int8"
    ));
    assert!(
        config
            .function_desc()
            .job_config
            .xrt_config
            .tensorrt_config
            .int8_calibration
            .is_none()
    );

    config.set("tensorrt.use_int8", &[]).unwrap();
    config.set("tensorrt.int8_calibration", &["/data/calib".into()]).unwrap();

    let xrt = &config.function_desc().job_config.xrt_config;
    assert!(xrt.use_tensorrt);
    assert!(xrt.tensorrt_config.use_int8);
    assert_eq!(xrt.tensorrt_config.int8_calibration.as_deref(), Some("/data/calib"));
}

#[test]
fn test_convenience_enable_sets_backend() {
    let mut config = FunctionConfig::new();
    assert!(!config.function_desc().job_config.xrt_config.use_tensorrt);

    config.set("tensorrt.use_fp16", &[true.into()]).unwrap();

    let xrt = &config.function_desc().job_config.xrt_config;
    assert!(xrt.use_tensorrt);
    assert!(xrt.tensorrt_config.use_fp16);
}

#[test]
fn test_deprecation_notice_once_per_call_site() {
    init_tracing();
    let mut config = fresh_config();

    for lr in [0.1, 0.2, 0.3] {
        config.set("train.primary_lr", &[lr.into()]).unwrap();
    }
    assert_eq!(config.registry().deprecation_notices().len(), 1);

    config.set("train.primary_lr", &[0.4.into()]).unwrap();
    let notices = config.registry().deprecation_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.path == "train.primary_lr"));
    assert!(notices[0].location.contains("config_path_test.rs"));
    assert_ne!(notices[0].location, notices[1].location);

    let train_conf = config.function_desc().job_config.train_conf.as_ref().unwrap();
    assert_eq!(train_conf.primary_lr, Some(0.4));
}

#[test]
fn test_deprecated_alias_delegates() {
    let mut config = fresh_config();
    config
        .set("default_distribute_strategy", &[DistributeStrategy::Mirrored.into()])
        .unwrap();

    assert_eq!(
        config.function_desc().function_attribute.default_distribute_strategy,
        Some(DistributeStrategy::Mirrored)
    );
    let notices = config.registry().deprecation_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("default_logical_view"));
}

#[test]
fn test_retired_leaf_has_no_effect() {
    let mut config = fresh_config();
    let before = config.function_desc().job_config.clone();

    let result = config.set("enable_nccl", &[true.into()]).unwrap();

    assert_eq!(result, ConfigValue::Unit);
    assert_eq!(config.function_desc().job_config, before);
    assert_eq!(config.registry().deprecation_notices().len(), 1);
}

#[test]
fn test_load_from_directory() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(ConfigFile::FILE_NAME),
        r#"
settings:
  default_data_type: float
  enable_cudnn: false
  tensorrt.use_fp16:
  static_mem_alloc_policy_white_list.remove: use_mem_size_first_algo
  exp_run_conf:
    enable_experiment_run: true
    piece_num_of_experiment_phase: 3
"#,
    )
    .unwrap();

    let config = FunctionConfig::load(dir.path()).unwrap();
    let job_config = &config.function_desc().job_config;

    assert_eq!(job_config.default_data_type, Some(DataType::Float));
    assert!(!job_config.enable_cudnn);
    assert!(job_config.xrt_config.tensorrt_config.use_fp16);
    assert_eq!(
        job_config.memory_allocation_algorithm_conf.policy("use_mem_size_first_algo"),
        Some(false)
    );
    let exp_run = job_config.exp_run_conf.as_ref().unwrap();
    assert!(exp_run.enable_experiment_run);
    assert_eq!(exp_run.piece_num_of_experiment_phase, 3);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        FunctionConfig::load(dir.path()),
        Err(GlobalFnError::Configuration(_))
    ));
    let config = FunctionConfig::load_or_default(dir.path()).unwrap();
    assert_eq!(config.function_desc().job_config.concurrency_width, 128);
}

#[test]
fn test_structured_value_rejects_unknown_fields() {
    let mut config = FunctionConfig::new();
    let value = serde_json::json!({ "enable_experiment_run": true, "bogus": 1 });

    let err = config.set("exp_run_conf", &[value.into()]).unwrap_err();
    assert!(matches!(err, GlobalFnError::InvalidValue { .. }));
}
