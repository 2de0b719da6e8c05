// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::error::{GlobalFnError, Result};

/// Opaque argument and return value of a computation.
pub type Value = serde_json::Value;

pub type ComputationFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Metadata keys starting with this prefix belong to the library.
pub const RESERVED_METADATA_PREFIX: &str = "__globalfn_";

/// One declared parameter of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }

    pub fn annotated(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation.into()),
        }
    }
}

/// Declared parameter list of a computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// A user computation: name, signature, body, and a mutable metadata map.
///
/// Metadata is interior-mutable so the signature check result can be
/// cached on a shared computation.
pub struct Computation {
    name: String,
    signature: Signature,
    body: ComputationFn,
    metadata: RwLock<BTreeMap<String, Value>>,
}

impl std::fmt::Debug for Computation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("metadata", &*self.metadata.read())
            .finish_non_exhaustive()
    }
}

impl Computation {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            body: Arc::new(body),
            metadata: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.signature.arity() {
            return Err(GlobalFnError::InvalidSignature {
                function: self.name.clone(),
                reason: format!(
                    "expected {} arguments, got {}",
                    self.signature.arity(),
                    args.len()
                ),
            });
        }
        (self.body)(args)
    }

    /// Snapshot of the metadata map.
    pub fn metadata(&self) -> BTreeMap<String, Value> {
        self.metadata.read().clone()
    }

    pub fn metadata_value(&self, key: &str) -> Option<Value> {
        self.metadata.read().get(key).cloned()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: Value) {
        self.metadata.write().insert(key.into(), value);
    }
}
