// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Look up packet names across the four persisted canonical mappings.
// Author: Lukas Bower

use crate::ids::{CanonicalMapping, PacketId};
use crate::logical::LogicalFile;
use crate::pipeline::mapping_path;
use crate::store;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// All canonical mappings, keyed by logical file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketRegistry {
    tables: HashMap<LogicalFile, CanonicalMapping>,
}

impl PacketRegistry {
    /// Load `<dir>/<file>.json` for every logical file.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut tables = HashMap::new();
        for file in LogicalFile::ALL {
            tables.insert(file, store::load(&mapping_path(dir, file))?);
        }
        Ok(Self { tables })
    }

    /// Load a single object whose keys are the logical file stems.
    pub fn from_bundle(bundle: &Value) -> Result<Self> {
        let object = bundle
            .as_object()
            .ok_or_else(|| anyhow!("packet bundle must be a JSON object"))?;
        let mut tables = HashMap::new();
        for file in LogicalFile::ALL {
            let entry = object
                .get(file.stem())
                .ok_or_else(|| anyhow!("packet bundle is missing {file}"))?;
            let mapping = store::from_value(entry, Path::new(file.stem()))
                .with_context(|| format!("invalid {file} table in packet bundle"))?;
            tables.insert(file, mapping);
        }
        Ok(Self { tables })
    }

    pub fn insert(&mut self, file: LogicalFile, mapping: CanonicalMapping) {
        self.tables.insert(file, mapping);
    }

    #[must_use]
    pub fn get(&self, file: LogicalFile, code: u16) -> Option<&str> {
        self.tables.get(&file)?.get(PacketId::new(code))
    }

    /// Display name for a packet, or an empty string when unknown.
    #[must_use]
    pub fn known_name(&self, file: LogicalFile, code: u16) -> String {
        self.get(file, code).map(known_name).unwrap_or_default()
    }

    #[must_use]
    pub fn table(&self, file: LogicalFile) -> Option<&CanonicalMapping> {
        self.tables.get(&file)
    }
}

/// Normalise a raw name into UpperCamelCase letters.
///
/// `"player_login"` and `"player login"` both become `"PlayerLogin"`; digits
/// and punctuation are dropped.
#[must_use]
pub fn known_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for part in raw.split(['_', ' ']) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
        }
        name.extend(chars.filter(char::is_ascii_alphabetic));
    }
    name
}
