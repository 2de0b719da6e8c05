// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// Integration tests for SSP stage placement against the in-process scope
/// stack.
use globalfn::core::config::flags;
use globalfn::core::descriptor::{ConfigValue, PlacementScope};
use globalfn::core::stage::{plan_stages, Stage, StageScopeConfig, SymbolScopeStack};
use globalfn::{FunctionConfig, GlobalFnError};

fn gpu(device: u32) -> PlacementScope {
    PlacementScope::new("gpu", [format!("0:{device}")])
}

#[test]
fn test_each_placement_gets_a_scope() {
    let mut scopes = SymbolScopeStack::new();
    let stages = vec![Stage::new([gpu(1)]), Stage::new([gpu(2), gpu(3)])];

    let plan = plan_stages(&mut scopes, &stages).unwrap();

    assert_eq!(plan.scope_ids.len(), 3);
    let described = plan
        .scope_ids
        .iter()
        .map(|id| scopes.describe(*id).unwrap().clone())
        .collect::<Vec<_>>();
    let expected = [
        (gpu(1), 0, 2),
        (gpu(2), 1, 1),
        (gpu(3), 1, 1),
    ];
    for (symbol, (placement, position, depth)) in described.iter().zip(expected) {
        assert_eq!(symbol.placement.as_ref(), Some(&placement));
        assert_eq!(
            symbol.stage,
            Some(StageScopeConfig {
                stage_placement_id: position,
                stage_weight_buffer_size: depth,
            })
        );
    }
    assert_eq!(scopes.depth(), 0);
}

#[test]
fn test_partial_positions_enter_no_scope() {
    let mut scopes = SymbolScopeStack::new();
    let stages = vec![
        Stage::new([gpu(0)]).with_placement_id(1),
        Stage::new([gpu(1)]),
    ];

    let err = plan_stages(&mut scopes, &stages).unwrap_err();

    assert!(matches!(
        err,
        GlobalFnError::InconsistentStageSpec {
            field: "placement_id",
            set_at: 0,
            missing_at: 1,
        }
    ));
    assert_eq!(scopes.symbol_count(), 0);
}

#[test]
fn test_explicit_positions_and_depths() {
    let mut scopes = SymbolScopeStack::new();
    let stages = vec![
        Stage::new([gpu(0)]).with_placement_id(1).with_weight_buffer_size(4),
        Stage::new([gpu(1)]).with_placement_id(0).with_weight_buffer_size(1),
    ];

    let plan = plan_stages(&mut scopes, &stages).unwrap();

    assert_eq!(
        plan.stage_configs,
        vec![
            StageScopeConfig {
                stage_placement_id: 1,
                stage_weight_buffer_size: 4,
            },
            StageScopeConfig {
                stage_placement_id: 0,
                stage_weight_buffer_size: 1,
            },
        ]
    );
}

#[test]
fn test_ssp_placement_configures_function() {
    let mut config = FunctionConfig::new();
    let mut scopes = SymbolScopeStack::new();
    let stages = vec![Stage::new([gpu(0)]), Stage::new([gpu(1)])];

    let plan = config
        .ssp_placement(&mut scopes, &stages, "naive_sequential")
        .unwrap();

    let flag_values = &config.function_desc().job_config.flag_name2flag_value;
    let ids = plan
        .scope_ids
        .iter()
        .map(|id| ConfigValue::Int(id.0 as i64))
        .collect();
    assert_eq!(
        flag_values.get(flags::STAGE_PARTITION_SCOPE_IDS),
        Some(&ConfigValue::List(ids))
    );
    assert_eq!(
        flag_values.get(flags::ENABLE_STAGE_PARTITION),
        Some(&ConfigValue::Bool(true))
    );
}
