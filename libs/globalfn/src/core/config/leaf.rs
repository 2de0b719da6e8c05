// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::core::descriptor::{
    ConfigValue, DataType, DistributeStrategy, FunctionDesc, PlacementScope,
};
use crate::core::error::{GlobalFnError, Result};

/// Behavior installed at the end of a configuration path.
pub type LeafFn =
    Arc<dyn Fn(&mut FunctionDesc, &LeafArgs<'_>) -> Result<ConfigValue> + Send + Sync>;

/// Index of a leaf in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(pub(crate) usize);

pub(crate) enum LeafBehavior {
    Apply(LeafFn),
    /// Same effect as another leaf.
    Alias(LeafId),
    /// Accepts and discards its arguments.
    Retired,
}

pub(crate) struct Leaf {
    pub(crate) path: String,
    pub(crate) behavior: LeafBehavior,
    pub(crate) notice: Option<String>,
}

/// A deprecation notice that was emitted for one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    pub path: String,
    pub message: String,
    /// `file:line:column` of the caller.
    pub location: String,
}

/// Arguments passed to a leaf, with typed extraction helpers.
///
/// Extraction errors name the invoked path.
pub struct LeafArgs<'a> {
    path: &'a str,
    values: &'a [ConfigValue],
}

impl<'a> LeafArgs<'a> {
    pub fn new(path: &'a str, values: &'a [ConfigValue]) -> Self {
        Self { path, values }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    pub fn values(&self) -> &[ConfigValue] {
        self.values
    }

    pub fn invalid(&self, reason: impl Into<String>) -> GlobalFnError {
        GlobalFnError::invalid_value(self.path, reason)
    }

    pub fn single(&self) -> Result<&ConfigValue> {
        match self.values {
            [value] => Ok(value),
            other => Err(self.invalid(format!("expected 1 argument, got {}", other.len()))),
        }
    }

    /// Optional single argument.
    pub fn optional(&self) -> Result<Option<&ConfigValue>> {
        match self.values {
            [] => Ok(None),
            [value] => Ok(Some(value)),
            other => Err(self.invalid(format!("expected at most 1 argument, got {}", other.len()))),
        }
    }

    /// No argument accepted.
    pub fn none(&self) -> Result<()> {
        match self.values {
            [] => Ok(()),
            other => Err(self.invalid(format!("expected no arguments, got {}", other.len()))),
        }
    }

    fn expect<T>(
        &self,
        value: &ConfigValue,
        expected: &str,
        get: impl FnOnce(&ConfigValue) -> Option<T>,
    ) -> Result<T> {
        get(value).ok_or_else(|| self.invalid(format!("expected {expected}, got {}", value.kind())))
    }

    pub fn bool(&self) -> Result<bool> {
        self.expect(self.single()?, "bool", ConfigValue::as_bool)
    }

    /// A bool that defaults to `true` when no argument is given.
    pub fn flag(&self) -> Result<bool> {
        match self.optional()? {
            None => Ok(true),
            Some(value) => self.expect(value, "bool", ConfigValue::as_bool),
        }
    }

    pub fn int(&self) -> Result<i64> {
        self.expect(self.single()?, "int", ConfigValue::as_int)
    }

    pub fn float(&self) -> Result<f64> {
        self.expect(self.single()?, "float", ConfigValue::as_float)
    }

    pub fn string(&self) -> Result<String> {
        self.expect(self.single()?, "string", |v| v.as_str().map(str::to_string))
    }

    pub fn data_type(&self) -> Result<DataType> {
        match self.single()? {
            ConfigValue::DataType(dt) => Ok(*dt),
            ConfigValue::Str(name) => name.parse(),
            other => Err(self.invalid(format!("expected data type, got {}", other.kind()))),
        }
    }

    pub fn placement(&self) -> Result<PlacementScope> {
        match self.single()? {
            ConfigValue::Placement(scope) => Ok(scope.clone()),
            other => Err(self.invalid(format!("expected placement, got {}", other.kind()))),
        }
    }

    pub fn strategy(&self) -> Result<DistributeStrategy> {
        match self.single()? {
            ConfigValue::Strategy(strategy) => Ok(*strategy),
            other => Err(self.invalid(format!(
                "expected distribute strategy, got {}",
                other.kind()
            ))),
        }
    }

    /// Translate a structured argument into the typed sub-record `T`.
    pub fn structured<T: DeserializeOwned>(&self) -> Result<T> {
        match self.single()? {
            ConfigValue::Structured(value) => {
                serde_json::from_value(value.clone()).map_err(|e| self.invalid(e.to_string()))
            }
            other => Err(self.invalid(format!("expected structured value, got {}", other.kind()))),
        }
    }
}
