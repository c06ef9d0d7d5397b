// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Error taxonomy for retrieval, normalisation and table compilation.
// Author: Lukas Bower

use std::path::PathBuf;
use thiserror::Error;

/// Fetching a source document failed; aborts processing of that file.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("failed to read {location}")]
    Read {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{location} is not valid JSON")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A hierarchical source tree that cannot be flattened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("malformed hierarchy: key {key:?} under {parent} is not a {radix} integer")]
    MalformedKey {
        parent: String,
        key: String,
        radix: &'static str,
    },
    #[error("malformed hierarchy: key {key:?} under {parent} is {value}, outside 0..=255")]
    ComponentOutOfRange {
        parent: String,
        key: String,
        value: u64,
    },
    #[error("malformed hierarchy: composite id {id:#x} does not fit in four hex digits")]
    IdOutOfRange { id: u64 },
    #[error("malformed hierarchy: key {key:?} under {parent} holds a {kind}, expected a name or a mapping")]
    UnexpectedValue {
        parent: String,
        key: String,
        kind: &'static str,
    },
    #[error("malformed hierarchy: root is a {kind}, expected a mapping")]
    RootNotMapping { kind: &'static str },
}

/// Source text the structural lexer cannot tokenise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error on line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Validation failure that aborts a table compile before any output exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{file}: expected packets to be a mapping of strings to strings, got {kind} instead")]
    InvalidInputShape { file: String, kind: String },
    #[error("table {table}: keys and values cannot contain {character:?}: key={key:?} value={value:?}")]
    IllegalCharacter {
        table: String,
        key: String,
        value: String,
        character: char,
    },
    #[error("{file}: table name {name:?} is not a valid identifier")]
    InvalidTableName { file: String, name: String },
    #[error("table {name} is defined more than once")]
    DuplicateTable { name: String },
}

/// A persisted canonical mapping that does not hold valid packet ids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{}: key {key:?} is not a 4-digit lowercase hex packet id", file.display())]
    InvalidKey { file: PathBuf, key: String },
    #[error("{}: value for {key} is a {kind}, expected a string", file.display())]
    InvalidValue {
        file: PathBuf,
        key: String,
        kind: &'static str,
    },
    #[error("{}: expected a JSON object, got {kind}", file.display())]
    NotAnObject { file: PathBuf, kind: &'static str },
}

/// Human name of a JSON value kind, used in shape errors.
#[must_use]
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
