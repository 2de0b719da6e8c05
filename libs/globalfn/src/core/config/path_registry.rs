// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Dotted-path configuration surface.
//!
//! Paths are stored in an arena of accessor nodes. A node is keyed by
//! (parent node, segment), so two paths sharing a prefix share the nodes of
//! that prefix. Leaves hang off the final node of each declared path.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::Location;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::core::descriptor::{ConfigValue, FunctionDesc};
use crate::core::error::{GlobalFnError, Result};

use super::leaf::{DeprecationNotice, Leaf, LeafArgs, LeafBehavior, LeafFn, LeafId};

/// Identity of one synthesized accessor (one path prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessorId(usize);

impl AccessorId {
    pub const ROOT: AccessorId = AccessorId(0);
}

struct AccessorNode {
    path: String,
    parent: Option<AccessorId>,
    children: HashMap<String, AccessorId>,
    leaf: Option<LeafId>,
}

/// Segment reserved for the descriptor itself.
const RESERVED_SEGMENT: &str = "function_desc";

static BUILTIN: LazyLock<Arc<ConfigPathRegistry>> = LazyLock::new(|| {
    Arc::new(
        ConfigPathRegistry::with_builtin_leaves()
            .expect("built-in configuration leaves must declare without conflict"),
    )
});

/// Registry of configuration paths and their leaf behaviors.
pub struct ConfigPathRegistry {
    nodes: Vec<AccessorNode>,
    leaves: Vec<Leaf>,
    flag_defaults: BTreeMap<String, ConfigValue>,
    warned: Mutex<HashSet<(LeafId, &'static Location<'static>)>>,
    notices: Mutex<Vec<DeprecationNotice>>,
}

impl Default for ConfigPathRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPathRegistry {
    /// Empty registry with only the root accessor.
    pub fn new() -> Self {
        Self {
            nodes: vec![AccessorNode {
                path: String::new(),
                parent: None,
                children: HashMap::new(),
                leaf: None,
            }],
            leaves: Vec::new(),
            flag_defaults: BTreeMap::new(),
            warned: Mutex::new(HashSet::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Registry holding the built-in leaf table and function flags.
    pub fn with_builtin_leaves() -> Result<Self> {
        let mut registry = Self::new();
        super::builtin_leaves::declare_builtin_leaves(&mut registry)?;
        super::FunctionFlagTable::builtin().declare_into(&mut registry)?;
        tracing::debug!(
            "Declared {} configuration leaves over {} accessors",
            registry.leaves.len(),
            registry.nodes.len()
        );
        Ok(registry)
    }

    /// Process-wide registry with the built-in table, built on first use.
    pub fn builtin() -> Arc<ConfigPathRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Declare a leaf at `path`.
    pub fn declare<F>(&mut self, path: &str, behavior: F) -> Result<LeafId>
    where
        F: Fn(&mut FunctionDesc, &LeafArgs<'_>) -> Result<ConfigValue> + Send + Sync + 'static,
    {
        self.declare_leaf(path, LeafBehavior::Apply(Arc::new(behavior)), None)
    }

    /// Declare several paths with identical effect. The first path owns the
    /// behavior, the rest alias it.
    pub fn declare_aliases<F>(&mut self, paths: &[&str], behavior: F) -> Result<LeafId>
    where
        F: Fn(&mut FunctionDesc, &LeafArgs<'_>) -> Result<ConfigValue> + Send + Sync + 'static,
    {
        let (canonical, aliases) = paths
            .split_first()
            .ok_or_else(|| GlobalFnError::Configuration("no path given for aliased leaf".into()))?;
        let id = self.declare(canonical, behavior)?;
        for alias in aliases {
            self.declare_leaf(alias, LeafBehavior::Alias(id), None)?;
        }
        Ok(id)
    }

    /// Declare a leaf that still takes effect but warns on use.
    pub fn declare_deprecated<F>(
        &mut self,
        path: &str,
        notice: impl Into<String>,
        behavior: F,
    ) -> Result<LeafId>
    where
        F: Fn(&mut FunctionDesc, &LeafArgs<'_>) -> Result<ConfigValue> + Send + Sync + 'static,
    {
        let behavior: LeafFn = Arc::new(behavior);
        self.declare_leaf(path, LeafBehavior::Apply(behavior), Some(notice.into()))
    }

    /// Declare `path` as a deprecated alias that warns, then delegates to the
    /// leaf already declared at `canonical`.
    pub fn declare_deprecated_alias(&mut self, path: &str, canonical: &str) -> Result<LeafId> {
        let node = self.resolve(canonical)?;
        let target = self.nodes[node.0]
            .leaf
            .ok_or_else(|| GlobalFnError::UnknownConfigField(canonical.to_string()))?;
        let notice = format!("'{path}' has been deprecated. Please use '{canonical}' instead.");
        self.declare_leaf(path, LeafBehavior::Alias(target), Some(notice))
    }

    /// Declare a leaf that no longer has any effect.
    pub fn declare_retired(&mut self, path: &str) -> Result<LeafId> {
        let notice = format!(
            "'{path}' has been deprecated, has no effect and will be removed in the future."
        );
        self.declare_leaf(path, LeafBehavior::Retired, Some(notice))
    }

    /// Declare a function flag leaf writing `flag_name2flag_value[name]`.
    pub fn declare_function_flag(&mut self, name: &str, default: ConfigValue) -> Result<LeafId> {
        let flag = name.to_string();
        let expected = default.clone();
        let id = self.declare(name, move |desc, args| {
            let value = match (args.optional()?, &expected) {
                (None, ConfigValue::Bool(_)) => ConfigValue::Bool(true),
                (None, _) => return Err(args.invalid("expected 1 argument, got 0")),
                (Some(value), expected) => value.coerce_to(expected).ok_or_else(|| {
                    args.invalid(format!("expected {}, got {}", expected.kind(), value.kind()))
                })?,
            };
            desc.job_config.flag_name2flag_value.insert(flag.clone(), value);
            Ok(ConfigValue::Unit)
        })?;
        self.flag_defaults.insert(name.to_string(), default);
        Ok(id)
    }

    fn declare_leaf(
        &mut self,
        path: &str,
        behavior: LeafBehavior,
        notice: Option<String>,
    ) -> Result<LeafId> {
        let segments = split_path(path)?;

        // Conflicts can only sit on nodes that already exist, and those are
        // all visited before the first node is created.
        let mut node = AccessorId::ROOT;
        for (index, segment) in segments.iter().enumerate() {
            let existing = self.nodes[node.0].children.get(*segment).copied();
            node = match existing {
                Some(child) => child,
                None => self.push_node(node, segment),
            };
            let is_last = index + 1 == segments.len();
            let current = &self.nodes[node.0];
            if !is_last && current.leaf.is_some() {
                return Err(GlobalFnError::StructuralConflict {
                    path: path.to_string(),
                    reason: format!("'{}' is already a leaf", current.path),
                });
            }
            if is_last && current.leaf.is_some() {
                return Err(GlobalFnError::StructuralConflict {
                    path: path.to_string(),
                    reason: "path is already declared".into(),
                });
            }
            if is_last && !current.children.is_empty() {
                return Err(GlobalFnError::StructuralConflict {
                    path: path.to_string(),
                    reason: "path is reserved as a structural prefix".into(),
                });
            }
        }

        let id = LeafId(self.leaves.len());
        self.leaves.push(Leaf {
            path: path.to_string(),
            behavior,
            notice,
        });
        self.nodes[node.0].leaf = Some(id);
        Ok(id)
    }

    fn push_node(&mut self, parent: AccessorId, segment: &str) -> AccessorId {
        let id = AccessorId(self.nodes.len());
        let path = match self.nodes[parent.0].path.as_str() {
            "" => segment.to_string(),
            prefix => format!("{prefix}.{segment}"),
        };
        self.nodes.push(AccessorNode {
            path,
            parent: Some(parent),
            children: HashMap::new(),
            leaf: None,
        });
        self.nodes[parent.0].children.insert(segment.to_string(), id);
        id
    }

    /// Advance from `parent` to the accessor for `segment`.
    pub fn child(&self, parent: AccessorId, segment: &str) -> Result<AccessorId> {
        let node = self
            .nodes
            .get(parent.0)
            .ok_or_else(|| GlobalFnError::UnknownConfigField(segment.to_string()))?;
        node.children.get(segment).copied().ok_or_else(|| {
            GlobalFnError::UnknownConfigField(match node.path.as_str() {
                "" => segment.to_string(),
                prefix => format!("{prefix}.{segment}"),
            })
        })
    }

    /// Walk a dotted path from the root.
    pub fn resolve(&self, path: &str) -> Result<AccessorId> {
        split_path(path)?
            .into_iter()
            .try_fold(AccessorId::ROOT, |node, segment| self.child(node, segment))
    }

    pub fn path_of(&self, id: AccessorId) -> &str {
        self.nodes.get(id.0).map(|n| n.path.as_str()).unwrap_or_default()
    }

    /// Accessor one segment up; `None` for the root.
    pub fn parent(&self, id: AccessorId) -> Option<AccessorId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn is_leaf(&self, id: AccessorId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.leaf.is_some())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|id| self.is_leaf(id))
    }

    /// Number of synthesized accessors, root included.
    pub fn accessor_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_paths(&self) -> Vec<&str> {
        self.leaves.iter().map(|l| l.path.as_str()).collect()
    }

    pub fn function_flag_defaults(&self) -> &BTreeMap<String, ConfigValue> {
        &self.flag_defaults
    }

    /// Notices emitted so far, in emission order.
    pub fn deprecation_notices(&self) -> Vec<DeprecationNotice> {
        self.notices.lock().clone()
    }

    /// Run the leaf at `node` against `desc`.
    pub fn invoke(
        &self,
        node: AccessorId,
        desc: &mut FunctionDesc,
        values: &[ConfigValue],
        caller: &'static Location<'static>,
    ) -> Result<ConfigValue> {
        let accessor = self
            .nodes
            .get(node.0)
            .ok_or_else(|| GlobalFnError::UnknownConfigField(format!("<accessor {}>", node.0)))?;
        let leaf = accessor
            .leaf
            .ok_or_else(|| GlobalFnError::UnknownConfigField(accessor.path.clone()))?;
        self.apply(leaf, &accessor.path, desc, values, caller)
    }

    fn apply(
        &self,
        id: LeafId,
        path: &str,
        desc: &mut FunctionDesc,
        values: &[ConfigValue],
        caller: &'static Location<'static>,
    ) -> Result<ConfigValue> {
        let leaf = &self.leaves[id.0];
        if let Some(notice) = &leaf.notice {
            self.warn_once(id, &leaf.path, notice, caller);
        }
        match &leaf.behavior {
            LeafBehavior::Apply(behavior) => behavior(desc, &LeafArgs::new(path, values)),
            LeafBehavior::Alias(target) => self.apply(*target, path, desc, values, caller),
            LeafBehavior::Retired => Ok(ConfigValue::Unit),
        }
    }

    fn warn_once(&self, id: LeafId, path: &str, notice: &str, caller: &'static Location<'static>) {
        if !self.warned.lock().insert((id, caller)) {
            return;
        }
        tracing::warn!(path, location = %caller, "{}", notice);
        self.notices.lock().push(DeprecationNotice {
            path: path.to_string(),
            message: notice.to_string(),
            location: caller.to_string(),
        });
    }
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    for segment in &segments {
        if !is_valid_segment(segment) {
            return Err(GlobalFnError::InvalidPathSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(segments)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    starts_well
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && segment != RESERVED_SEGMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut FunctionDesc, _: &LeafArgs<'_>) -> Result<ConfigValue> {
        Ok(ConfigValue::Unit)
    }

    #[test]
    fn test_shared_prefix_reuses_accessor() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("a.b.x", noop).unwrap();
        let before = registry.accessor_count();
        registry.declare("a.b.y", noop).unwrap();

        // Only the new leaf node was added.
        assert_eq!(registry.accessor_count(), before + 1);
        let x = registry.resolve("a.b.x").unwrap();
        let y = registry.resolve("a.b.y").unwrap();
        assert_ne!(x, y);

        let from_x = registry.parent(x).unwrap();
        let from_y = registry.parent(y).unwrap();
        assert_eq!(from_x, from_y);
        assert_eq!(registry.path_of(from_x), "a.b");
        assert_eq!(registry.parent(from_x), registry.parent(from_y));
        assert_eq!(registry.parent(registry.parent(from_x).unwrap()), Some(AccessorId::ROOT));
    }

    #[test]
    fn test_leaf_under_leaf_is_structural_conflict() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("tensorrt", noop).unwrap();
        let err = registry.declare("tensorrt.use_fp16", noop).unwrap_err();
        assert!(matches!(err, GlobalFnError::StructuralConflict { .. }));
        // Nothing was synthesized for the rejected path.
        assert!(registry.resolve("tensorrt.use_fp16").is_err());
    }

    #[test]
    fn test_leaf_on_structural_prefix_is_conflict() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("train.primary_lr", noop).unwrap();
        let err = registry.declare("train", noop).unwrap_err();
        assert!(matches!(
            err,
            GlobalFnError::StructuralConflict { ref path, .. } if path == "train"
        ));
    }

    #[test]
    fn test_duplicate_declaration_is_conflict() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("enable_cudnn", noop).unwrap();
        assert!(matches!(
            registry.declare("enable_cudnn", noop),
            Err(GlobalFnError::StructuralConflict { .. })
        ));
    }

    #[test]
    fn test_invalid_segments() {
        let mut registry = ConfigPathRegistry::new();
        for path in ["", "a..b", "1st", "a.b-c", "function_desc.x"] {
            assert!(
                matches!(
                    registry.declare(path, noop),
                    Err(GlobalFnError::InvalidPathSegment { .. })
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_path_names_full_prefix() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("a.b", noop).unwrap();
        let err = registry.resolve("a.c").unwrap_err();
        assert!(matches!(err, GlobalFnError::UnknownConfigField(ref p) if p == "a.c"));
    }

    #[test]
    fn test_invoking_intermediate_is_unknown_field() {
        let mut registry = ConfigPathRegistry::new();
        registry.declare("a.b", noop).unwrap();
        let node = registry.resolve("a").unwrap();
        let mut desc = FunctionDesc::new();
        let err = registry
            .invoke(node, &mut desc, &[], Location::caller())
            .unwrap_err();
        assert!(matches!(err, GlobalFnError::UnknownConfigField(ref p) if p == "a"));
    }

    #[test]
    fn test_builtin_table_declares() {
        let registry = ConfigPathRegistry::with_builtin_leaves().unwrap();
        assert!(registry.contains("tensorrt.use_fp16"));
        assert!(registry.contains("static_mem_alloc_policy_white_list.add"));
        assert!(registry.contains("enable_stage_partition"));
        assert!(!registry.contains("tensorrt"));
    }
}
