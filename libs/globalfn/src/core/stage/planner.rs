// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Stage placement planning.
//!
//! Algorithm:
//! 1. Check that `placement_id` and `weight_buffer_size` are each set on all
//!    stages or on none.
//! 2. Resolve effective values: stage `i` of `n` defaults to position `i` and
//!    buffer depth `n - i`; explicit positions must lie in `[0, n)` and
//!    explicit depths must be positive.
//! 3. For each placement of each stage, in order, enter the placement scope
//!    and a stage sub-scope carrying the effective values, and record the
//!    resulting scope id.
//!
//! All validation happens before the first scope is entered.

use crate::core::error::{GlobalFnError, Result};

use super::{ScopeGuard, ScopeId, ScopeSubsystem, Stage, StageScopeConfig};

/// Result of planning: one scope id per placement, stage by stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub scope_ids: Vec<ScopeId>,
    /// Effective configuration of each stage, indexed like the input.
    pub stage_configs: Vec<StageScopeConfig>,
}

/// Plan scope ids for `stages` against `scopes`.
pub fn plan_stages<S: ScopeSubsystem>(
    scopes: &mut S,
    stages: &[Stage<S::Placement>],
) -> Result<StagePlan> {
    check_all_or_nothing("placement_id", stages, |s| s.placement_id.is_some())?;
    check_all_or_nothing("weight_buffer_size", stages, |s| s.weight_buffer_size.is_some())?;

    let stage_configs = stages
        .iter()
        .enumerate()
        .map(|(index, stage)| effective_config(index, stages.len(), stage))
        .collect::<Result<Vec<_>>>()?;

    let mut scope_ids = Vec::with_capacity(stages.iter().map(|s| s.placements.len()).sum());
    for (stage, config) in stages.iter().zip(&stage_configs) {
        for placement in &stage.placements {
            let mut placement_scope = ScopeGuard::placement(scopes, placement)?;
            let mut stage_scope = ScopeGuard::stage_config(&mut *placement_scope, *config)?;
            scope_ids.push(stage_scope.current_scope_id()?);
        }
    }

    tracing::debug!(
        "Planned {} stages into {} scopes",
        stages.len(),
        scope_ids.len()
    );
    Ok(StagePlan {
        scope_ids,
        stage_configs,
    })
}

fn check_all_or_nothing<P>(
    field: &'static str,
    stages: &[Stage<P>],
    is_set: impl Fn(&Stage<P>) -> bool,
) -> Result<()> {
    let set_at = stages.iter().position(&is_set);
    let missing_at = stages.iter().position(|s| !is_set(s));
    match (set_at, missing_at) {
        (Some(set_at), Some(missing_at)) => Err(GlobalFnError::InconsistentStageSpec {
            field,
            set_at,
            missing_at,
        }),
        _ => Ok(()),
    }
}

fn effective_config<P>(
    index: usize,
    num_stages: usize,
    stage: &Stage<P>,
) -> Result<StageScopeConfig> {
    let stage_placement_id = match stage.placement_id {
        None => index,
        Some(position) => usize::try_from(position)
            .ok()
            .filter(|p| *p < num_stages)
            .ok_or(GlobalFnError::InvalidStagePosition {
                stage_index: index,
                position,
                num_stages,
            })?,
    };

    // Later stages keep fewer in-flight weight snapshots.
    let stage_weight_buffer_size = match stage.weight_buffer_size {
        None => num_stages - index,
        Some(depth) => usize::try_from(depth)
            .ok()
            .filter(|d| *d > 0)
            .ok_or(GlobalFnError::InvalidBufferDepth {
                stage_index: index,
                depth,
            })?,
    };

    Ok(StageScopeConfig {
        stage_placement_id,
        stage_weight_buffer_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::PlacementScope;
    use crate::core::stage::SymbolScopeStack;

    /// Records every enter/exit so tests can check nesting.
    #[derive(Default)]
    struct RecordingScopes {
        events: Vec<String>,
        depth: usize,
        fail_on: Option<&'static str>,
    }

    impl ScopeSubsystem for RecordingScopes {
        type Placement = &'static str;

        fn enter_placement(&mut self, placement: &&'static str) -> Result<()> {
            if self.fail_on == Some(*placement) {
                return Err(anyhow::anyhow!("cannot enter {placement}").into());
            }
            self.depth += 1;
            self.events.push(format!("enter {placement}"));
            Ok(())
        }

        fn enter_stage_config(&mut self, config: StageScopeConfig) -> Result<()> {
            self.depth += 1;
            self.events.push(format!(
                "enter pos{}/depth{}",
                config.stage_placement_id, config.stage_weight_buffer_size
            ));
            Ok(())
        }

        fn current_scope_id(&mut self) -> Result<ScopeId> {
            Ok(ScopeId(self.events.len() as u64))
        }

        fn exit(&mut self) {
            self.depth -= 1;
            self.events.push("exit".into());
        }
    }

    fn gpu(device: u32) -> PlacementScope {
        PlacementScope::new("gpu", [format!("0:{device}")])
    }

    #[test]
    fn test_default_positions_and_depths() {
        let mut scopes = SymbolScopeStack::new();
        let stages: Vec<_> = (0..4).map(|i| Stage::new([gpu(i)])).collect();
        let plan = plan_stages(&mut scopes, &stages).unwrap();

        for (i, config) in plan.stage_configs.iter().enumerate() {
            assert_eq!(config.stage_placement_id, i);
            assert_eq!(config.stage_weight_buffer_size, 4 - i);
        }
        assert_eq!(plan.scope_ids.len(), 4);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let mut scopes = SymbolScopeStack::new();
        let stages = vec![
            Stage::new([gpu(0)]).with_placement_id(1).with_weight_buffer_size(3),
            Stage::new([gpu(1)]).with_placement_id(0).with_weight_buffer_size(5),
        ];
        let plan = plan_stages(&mut scopes, &stages).unwrap();
        assert_eq!(
            plan.stage_configs,
            vec![
                StageScopeConfig {
                    stage_placement_id: 1,
                    stage_weight_buffer_size: 3
                },
                StageScopeConfig {
                    stage_placement_id: 0,
                    stage_weight_buffer_size: 5
                },
            ]
        );
    }

    #[test]
    fn test_placements_enumerated_in_order_with_nested_scopes() {
        let mut scopes = RecordingScopes::default();
        let stages = vec![Stage::new(["p1"]), Stage::new(["p2", "p3"])];
        plan_stages(&mut scopes, &stages).unwrap();
        assert_eq!(
            scopes.events,
            [
                "enter p1",
                "enter pos0/depth2",
                "exit",
                "exit",
                "enter p2",
                "enter pos1/depth1",
                "exit",
                "exit",
                "enter p3",
                "enter pos1/depth1",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn test_mixed_explicit_position_fails_before_any_scope() {
        let mut scopes = RecordingScopes::default();
        let stages = vec![Stage::new(["p1"]).with_placement_id(0), Stage::new(["p2"])];
        let err = plan_stages(&mut scopes, &stages).unwrap_err();
        assert!(matches!(
            err,
            GlobalFnError::InconsistentStageSpec {
                field: "placement_id",
                set_at: 0,
                missing_at: 1
            }
        ));
        assert!(scopes.events.is_empty());
    }

    #[test]
    fn test_mixed_buffer_size_is_inconsistent() {
        let mut scopes = RecordingScopes::default();
        let stages = vec![Stage::new(["p1"]), Stage::new(["p2"]).with_weight_buffer_size(2)];
        assert!(matches!(
            plan_stages(&mut scopes, &stages),
            Err(GlobalFnError::InconsistentStageSpec {
                field: "weight_buffer_size",
                ..
            })
        ));
    }

    #[test]
    fn test_position_out_of_range() {
        let mut scopes = RecordingScopes::default();
        for bad in [-1, 2] {
            let stages = vec![
                Stage::new(["p1"]).with_placement_id(0),
                Stage::new(["p2"]).with_placement_id(bad),
            ];
            let err = plan_stages(&mut scopes, &stages).unwrap_err();
            assert!(matches!(
                err,
                GlobalFnError::InvalidStagePosition {
                    stage_index: 1,
                    num_stages: 2,
                    ..
                }
            ));
        }
        assert!(scopes.events.is_empty());
    }

    #[test]
    fn test_non_positive_buffer_depth() {
        let mut scopes = RecordingScopes::default();
        let stages = vec![Stage::new(["p1"]).with_weight_buffer_size(0)];
        assert!(matches!(
            plan_stages(&mut scopes, &stages),
            Err(GlobalFnError::InvalidBufferDepth {
                stage_index: 0,
                depth: 0
            })
        ));
    }

    #[test]
    fn test_scopes_exit_when_entry_fails_midway() {
        let mut scopes = RecordingScopes {
            fail_on: Some("p3"),
            ..Default::default()
        };
        let stages = vec![Stage::new(["p1"]), Stage::new(["p2", "p3"])];
        assert!(plan_stages(&mut scopes, &stages).is_err());
        assert_eq!(scopes.depth, 0);
    }

    #[test]
    fn test_empty_sequence_plans_nothing() {
        let mut scopes = SymbolScopeStack::new();
        let plan = plan_stages::<SymbolScopeStack>(&mut scopes, &[]).unwrap();
        assert!(plan.scope_ids.is_empty());
    }
}
