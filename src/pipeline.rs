// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Reconcile both sources per logical file and persist the results.
// Author: Lukas Bower

use crate::fetch::DocumentSource;
use crate::hierarchy;
use crate::ids::CanonicalMapping;
use crate::logical::LogicalFile;
use crate::merge;
use crate::store;
use crate::structural;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use std::path::{Path, PathBuf};

/// Which mapping to produce for each logical file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceSelection {
    /// Filtered community tree overlaid with the reference implementation.
    #[default]
    Merged,
    /// Raw flattened community tree.
    Hierarchical,
    /// Raw reference implementation extraction.
    Structural,
}

pub fn hierarchical_mapping(
    source: &dyn DocumentSource,
    file: LogicalFile,
) -> Result<CanonicalMapping> {
    let tree = source.hierarchical_tree(file)?;
    Ok(hierarchy::flatten_json(&tree)?)
}

pub fn structural_mapping(
    source: &dyn DocumentSource,
    file: LogicalFile,
) -> Result<CanonicalMapping> {
    let text = source.structural_text(file)?;
    Ok(structural::extract_packets(&text)?)
}

/// Canonical mapping for `file`: the reference implementation wins collisions.
pub fn reconcile(source: &dyn DocumentSource, file: LogicalFile) -> Result<CanonicalMapping> {
    let base = hierarchical_mapping(source, file)?;
    let overlay = structural_mapping(source, file)?;
    let (base_len, overlay_len) = (base.len(), overlay.len());
    let merged = merge::merge(base, overlay);
    info!(
        "{file}: {} packets ({base_len} community, {overlay_len} reference)",
        merged.len()
    );
    Ok(merged)
}

pub fn build(
    source: &dyn DocumentSource,
    file: LogicalFile,
    selection: SourceSelection,
) -> Result<CanonicalMapping> {
    let mapping = match selection {
        SourceSelection::Merged => reconcile(source, file),
        SourceSelection::Hierarchical => hierarchical_mapping(source, file),
        SourceSelection::Structural => structural_mapping(source, file),
    };
    mapping.with_context(|| format!("failed to build {file}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub selection: SourceSelection,
    pub files: Vec<LogicalFile>,
}

impl ExportOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            selection: SourceSelection::default(),
            files: LogicalFile::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file: LogicalFile,
    pub path: PathBuf,
    pub packets: usize,
}

/// Build every requested file, then write them all.
///
/// Nothing is written unless every file was built.
pub fn export_all(source: &dyn DocumentSource, options: &ExportOptions) -> Result<Vec<ExportedFile>> {
    let mappings = options
        .files
        .iter()
        .map(|&file| build(source, file, options.selection).map(|mapping| (file, mapping)))
        .collect::<Result<Vec<_>>>()?;

    mappings
        .into_iter()
        .map(|(file, mapping)| {
            let path = mapping_path(&options.out_dir, file);
            store::save(&mapping, &path)?;
            Ok(ExportedFile {
                file,
                path,
                packets: mapping.len(),
            })
        })
        .collect()
}

#[must_use]
pub fn mapping_path(dir: &Path, file: LogicalFile) -> PathBuf {
    dir.join(file.file_name())
}
