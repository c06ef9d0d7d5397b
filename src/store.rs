// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Persist canonical mappings as diff-friendly JSON documents.
// Author: Lukas Bower

use crate::error::{json_kind, StoreError};
use crate::ids::{CanonicalMapping, PacketId};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::path::Path;

const INDENT: &[u8] = b"    ";

/// Render `mapping` with sorted keys, 4-space indentation and a final newline.
pub fn to_json(mapping: &CanonicalMapping) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    mapping
        .serialize(&mut serializer)
        .context("failed to serialise packet mapping")?;
    buf.push(b'\n');
    String::from_utf8(buf).context("serialised packet mapping is not UTF-8")
}

/// Read a persisted mapping, requiring 4-hex-digit keys and string values.
pub fn from_json(text: &str, file: &Path) -> Result<CanonicalMapping> {
    let value: Value = serde_json::from_str(text)
        .with_context(|| format!("invalid JSON in {}", file.display()))?;
    Ok(from_value(&value, file)?)
}

pub fn from_value(value: &Value, file: &Path) -> Result<CanonicalMapping, StoreError> {
    let Value::Object(entries) = value else {
        return Err(StoreError::NotAnObject {
            file: file.to_path_buf(),
            kind: json_kind(value),
        });
    };
    let mut mapping = CanonicalMapping::new();
    for (key, name) in entries {
        let id: PacketId = key.parse().map_err(|_| StoreError::InvalidKey {
            file: file.to_path_buf(),
            key: key.clone(),
        })?;
        let Value::String(name) = name else {
            return Err(StoreError::InvalidValue {
                file: file.to_path_buf(),
                key: key.clone(),
                kind: json_kind(name),
            });
        };
        mapping.insert(id, name.clone());
    }
    Ok(mapping)
}

pub fn save(mapping: &CanonicalMapping, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = to_json(mapping)?;
    fs::write(path, contents)
        .with_context(|| format!("failed to write packet mapping {}", path.display()))
}

pub fn load(path: &Path) -> Result<CanonicalMapping> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read packet mapping {}", path.display()))?;
    from_json(&text, path)
}
