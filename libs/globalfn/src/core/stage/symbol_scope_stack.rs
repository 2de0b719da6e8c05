// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;

use crate::core::descriptor::PlacementScope;
use crate::core::error::Result;

use super::{ScopeId, ScopeSubsystem, StageScopeConfig};

/// What a scope id stands for: the innermost placement and stage config
/// active when it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeSymbol {
    pub placement: Option<PlacementScope>,
    pub stage: Option<StageScopeConfig>,
}

#[derive(Debug, Clone)]
enum Frame {
    Placement(PlacementScope),
    Stage(StageScopeConfig),
}

/// In-process scope subsystem that interns every distinct scope as a
/// numbered symbol.
#[derive(Debug, Default)]
pub struct SymbolScopeStack {
    frames: Vec<Frame>,
    symbols: Vec<ScopeSymbol>,
    ids: HashMap<ScopeSymbol, ScopeId>,
}

impl SymbolScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently entered scopes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn describe(&self, id: ScopeId) -> Option<&ScopeSymbol> {
        usize::try_from(id.0).ok().and_then(|index| self.symbols.get(index))
    }

    fn current_symbol(&self) -> ScopeSymbol {
        let placement = self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Placement(p) => Some(p.clone()),
            Frame::Stage(_) => None,
        });
        let stage = self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Stage(s) => Some(*s),
            Frame::Placement(_) => None,
        });
        ScopeSymbol { placement, stage }
    }
}

impl ScopeSubsystem for SymbolScopeStack {
    type Placement = PlacementScope;

    fn enter_placement(&mut self, placement: &PlacementScope) -> Result<()> {
        self.frames.push(Frame::Placement(placement.clone()));
        Ok(())
    }

    fn enter_stage_config(&mut self, config: StageScopeConfig) -> Result<()> {
        self.frames.push(Frame::Stage(config));
        Ok(())
    }

    fn current_scope_id(&mut self) -> Result<ScopeId> {
        if self.frames.is_empty() {
            return Err(anyhow::anyhow!("no scope is active").into());
        }
        let symbol = self.current_symbol();
        if let Some(id) = self.ids.get(&symbol) {
            return Ok(*id);
        }
        let id = ScopeId(self.symbols.len() as u64);
        self.symbols.push(symbol.clone());
        self.ids.insert(symbol, id);
        Ok(id)
    }

    fn exit(&mut self) {
        if self.frames.pop().is_none() {
            tracing::warn!("Scope exit without a matching enter");
        }
    }
}
