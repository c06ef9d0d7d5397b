// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Flatten nested community packet trees into canonical id mappings.
// Author: Lukas Bower

//! Hierarchical source adapter.
//!
//! The community source nests packet names under category and code keys,
//! e.g. `{"1": {"2": "Foo"}}`. Key tokens are either decimal or hex; the
//! base is detected once from the root keys and applied at every depth.

use crate::error::{json_kind, HierarchyError};
use crate::ids::{CanonicalMapping, PacketId};
use log::warn;
use serde_json::Value;

/// Metadata key that never denotes a child node.
pub const RESERVED_KEY: &str = "name";

/// Numeral system used by a tree's key tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBase {
    Decimal,
    Hexadecimal,
}

impl KeyBase {
    /// A tree is hex as soon as any key other than `"0"` has a leading zero.
    pub fn detect<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        if keys
            .into_iter()
            .any(|key| key != "0" && key.starts_with('0'))
        {
            KeyBase::Hexadecimal
        } else {
            KeyBase::Decimal
        }
    }

    #[must_use]
    pub fn radix(self) -> u32 {
        match self {
            KeyBase::Decimal => 10,
            KeyBase::Hexadecimal => 16,
        }
    }

    fn label(self) -> &'static str {
        match self {
            KeyBase::Decimal => "decimal",
            KeyBase::Hexadecimal => "hexadecimal",
        }
    }

    fn parse_component(self, parent: &str, key: &str) -> Result<u64, HierarchyError> {
        let value =
            u64::from_str_radix(key, self.radix()).map_err(|_| HierarchyError::MalformedKey {
                parent: parent.to_owned(),
                key: key.to_owned(),
                radix: self.label(),
            })?;
        if value > u64::from(u8::MAX) {
            return Err(HierarchyError::ComponentOutOfRange {
                parent: parent.to_owned(),
                key: key.to_owned(),
                value,
            });
        }
        Ok(value)
    }
}

/// Decoded community tree: a packet name or a keyed set of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawHierarchy {
    Leaf(String),
    Node(Vec<(String, RawHierarchy)>),
}

impl RawHierarchy {
    /// Convert a decoded JSON document, keeping key order.
    ///
    /// Reserved metadata entries are dropped whatever their shape.
    pub fn from_json(value: &Value) -> Result<Self, HierarchyError> {
        match value {
            Value::Object(_) => Self::convert(value, "root", "root"),
            other => Err(HierarchyError::RootNotMapping {
                kind: json_kind(other),
            }),
        }
    }

    fn convert(value: &Value, parent: &str, key: &str) -> Result<Self, HierarchyError> {
        match value {
            Value::String(name) => Ok(RawHierarchy::Leaf(name.clone())),
            Value::Object(map) => {
                let path = child_path(parent, key);
                let mut children = Vec::with_capacity(map.len());
                for (child_key, child) in map {
                    if child_key == RESERVED_KEY {
                        continue;
                    }
                    children.push((child_key.clone(), Self::convert(child, &path, child_key)?));
                }
                Ok(RawHierarchy::Node(children))
            }
            other => Err(HierarchyError::UnexpectedValue {
                parent: parent.to_owned(),
                key: key.to_owned(),
                kind: json_kind(other),
            }),
        }
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        let children: &[(String, RawHierarchy)] = match self {
            RawHierarchy::Leaf(_) => &[],
            RawHierarchy::Node(children) => children,
        };
        children.iter().map(|(key, _)| key.as_str())
    }
}

/// Flatten a community tree into `id -> name` pairs.
///
/// Each level contributes one byte: `child = (parent << 8) | component`.
/// Sibling paths that collide on the same id keep the last one seen.
pub fn flatten(tree: &RawHierarchy) -> Result<CanonicalMapping, HierarchyError> {
    flatten_with_base(tree, KeyBase::detect(tree.keys()))
}

/// Flatten with an explicit key base instead of detecting it from the root.
pub fn flatten_with_base(
    tree: &RawHierarchy,
    base: KeyBase,
) -> Result<CanonicalMapping, HierarchyError> {
    let RawHierarchy::Node(children) = tree else {
        return Err(HierarchyError::RootNotMapping { kind: "string" });
    };
    let mut mapping = CanonicalMapping::new();
    walk(children, base, 0, "root", &mut mapping)?;
    Ok(mapping)
}

/// Decode and flatten a JSON tree in one step.
pub fn flatten_json(value: &Value) -> Result<CanonicalMapping, HierarchyError> {
    flatten(&RawHierarchy::from_json(value)?)
}

fn walk(
    children: &[(String, RawHierarchy)],
    base: KeyBase,
    parent_id: u64,
    parent: &str,
    mapping: &mut CanonicalMapping,
) -> Result<(), HierarchyError> {
    for (key, child) in children {
        if key == RESERVED_KEY {
            continue;
        }
        let id = (parent_id << 8) | base.parse_component(parent, key)?;
        match child {
            RawHierarchy::Leaf(name) => {
                let code = u16::try_from(id).map_err(|_| HierarchyError::IdOutOfRange { id })?;
                let packet = PacketId::new(code);
                if let Some(previous) = mapping.insert(packet, name.clone()) {
                    warn!("packet {packet} redefined: {previous:?} replaced by {name:?}");
                }
            }
            RawHierarchy::Node(grandchildren) => {
                if id >> (u64::BITS - 8) != 0 {
                    return Err(HierarchyError::IdOutOfRange { id });
                }
                walk(grandchildren, base, id, &child_path(parent, key), mapping)?;
            }
        }
    }
    Ok(())
}

fn child_path(parent: &str, key: &str) -> String {
    if parent == "root" && key == "root" {
        parent.to_owned()
    } else if parent == "root" {
        key.to_owned()
    } else {
        format!("{parent}/{key}")
    }
}
