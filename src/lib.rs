// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Build the canonical packet name registry and compile it into tables.
// Author: Lukas Bower
#![forbid(unsafe_code)]

//! Packet name registry builder.
//!
//! Two upstream sources describe the same wire protocol: a community-kept
//! nested JSON tree and the class declarations of a reference
//! implementation. [`hierarchy`] and [`structural`] normalise both into a
//! [`CanonicalMapping`] per [`LogicalFile`], [`mod@merge`] reconciles them, and
//! [`mod@compile`] turns the persisted mappings into static lookup tables.

pub mod compile;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hierarchy;
pub mod ids;
pub mod logical;
pub mod merge;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod structural;

pub use compile::{compile, compile_files, CompileOptions, TableFormat, TableInput, WriteMode};
pub use config::SourceConfig;
pub use error::{CompileError, HierarchyError, RetrievalError, StoreError, SyntaxError};
pub use fetch::{DirectorySource, DocumentSource, HttpSource};
pub use ids::{CanonicalMapping, PacketId};
pub use logical::{Bound, LogicalFile, Side};
pub use pipeline::{export_all, reconcile, ExportOptions, SourceSelection};
pub use registry::PacketRegistry;
