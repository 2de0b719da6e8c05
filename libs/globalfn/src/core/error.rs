// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

use crate::core::dispatch::RuntimeState;

#[derive(Error, Debug)]
pub enum GlobalFnError {
    #[error("ambiguous dispatch for '{operation}': candidates {matched:?} all match {state}")]
    AmbiguousDispatch {
        operation: String,
        matched: Vec<String>,
        state: RuntimeState,
    },

    #[error("'{operation}' is not supported in the current runtime state ({state})")]
    UnsupportedRuntimeState {
        operation: String,
        state: RuntimeState,
    },

    #[error("'{path}' requires '{requires}' to be enabled first")]
    PreconditionNotMet { path: String, requires: String },

    #[error("inconsistent stage spec: {field} set on stage {set_at}, not on stage {missing_at}")]
    InconsistentStageSpec {
        field: &'static str,
        set_at: usize,
        missing_at: usize,
    },

    #[error("stage {stage_index}: placement id {position} is outside [0, {num_stages})")]
    InvalidStagePosition {
        stage_index: usize,
        position: i64,
        num_stages: usize,
    },

    #[error("stage {stage_index}: weight buffer size {depth} must be positive")]
    InvalidBufferDepth { stage_index: usize, depth: i64 },

    #[error("unknown config field: {0}")]
    UnknownConfigField(String),

    #[error("structural conflict at '{path}': {reason}")]
    StructuralConflict { path: String, reason: String },

    #[error("invalid path segment '{segment}' in '{path}'")]
    InvalidPathSegment { path: String, segment: String },

    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("invalid signature for '{function}': {reason}")]
    InvalidSignature { function: String, reason: String },

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlobalFnError {
    pub(crate) fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlobalFnError>;
