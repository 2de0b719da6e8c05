// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// One pipeline stage: the placements it runs on plus optional explicit
/// position and weight buffer depth.
///
/// Within one sequence, either every stage sets a field or none does.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage<P> {
    pub placements: Vec<P>,
    pub placement_id: Option<i64>,
    pub weight_buffer_size: Option<i64>,
}

impl<P> Stage<P> {
    pub fn new(placements: impl IntoIterator<Item = P>) -> Self {
        Self {
            placements: placements.into_iter().collect(),
            placement_id: None,
            weight_buffer_size: None,
        }
    }

    pub fn with_placement_id(mut self, placement_id: i64) -> Self {
        self.placement_id = Some(placement_id);
        self
    }

    pub fn with_weight_buffer_size(mut self, weight_buffer_size: i64) -> Self {
        self.weight_buffer_size = Some(weight_buffer_size);
        self
    }
}
