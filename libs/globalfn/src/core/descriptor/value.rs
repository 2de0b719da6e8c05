// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{GlobalFnError, Result};

/// Element type of blobs produced by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Char,
    Float,
    Double,
    Int8,
    Int32,
    Int64,
    UInt8,
    Float16,
}

impl DataType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
            Self::Int8 => "int8",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::Float16 => "float16",
        }
    }
}

impl FromStr for DataType {
    type Err = GlobalFnError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "char" => Self::Char,
            "float" | "float32" => Self::Float,
            "double" | "float64" => Self::Double,
            "int8" => Self::Int8,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::UInt8,
            "float16" | "half" => Self::Float16,
            other => {
                return Err(GlobalFnError::invalid_value(
                    "default_data_type",
                    format!("unknown data type '{other}'"),
                ));
            }
        })
    }
}

/// Device placement: a device tag plus `machine:device` ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementScope {
    pub device_tag: String,
    pub machine_device_ids: Vec<String>,
}

impl PlacementScope {
    pub fn new<I, S>(device_tag: impl Into<String>, machine_device_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            device_tag: device_tag.into(),
            machine_device_ids: machine_device_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for PlacementScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.device_tag, self.machine_device_ids.join(","))
    }
}

/// Default logical view of blobs inside a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributeStrategy {
    Mirrored,
    Consistent,
}

/// Argument and return value of configuration leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum ConfigValue {
    #[default]
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    /// Nested record, translated into a typed sub-record by the receiving leaf.
    Structured(serde_json::Value),
    DataType(DataType),
    Placement(PlacementScope),
    Strategy(DistributeStrategy),
}

impl ConfigValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Structured(_) => "structured",
            Self::DataType(_) => "data type",
            Self::Placement(_) => "placement",
            Self::Strategy(_) => "distribute strategy",
        }
    }

    /// `self` converted to the kind of `expected`, if it can be stored
    /// there. Ints widen to floats; nothing narrows.
    pub fn coerce_to(&self, expected: &ConfigValue) -> Option<ConfigValue> {
        match (self, expected) {
            (Self::Int(i), Self::Float(_)) => Some(Self::Float(*i as f64)),
            _ if std::mem::discriminant(self) == std::mem::discriminant(expected) => {
                Some(self.clone())
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalars and arrays map onto typed variants; objects stay structured.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Unit,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            object @ Value::Object(_) => Self::Structured(object),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl TryFrom<u64> for ConfigValue {
    type Error = GlobalFnError;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value).map(Self::Int).map_err(|_| {
            GlobalFnError::invalid_value("<u64>", format!("{value} does not fit an int"))
        })
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::List(value)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

impl From<DataType> for ConfigValue {
    fn from(value: DataType) -> Self {
        Self::DataType(value)
    }
}

impl From<PlacementScope> for ConfigValue {
    fn from(value: PlacementScope) -> Self {
        Self::Placement(value)
    }
}

impl From<DistributeStrategy> for ConfigValue {
    fn from(value: DistributeStrategy) -> Self {
        Self::Strategy(value)
    }
}
