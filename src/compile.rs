// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate canonical mappings and emit static lookup table sources.
// Author: Lukas Bower

//! Table compiler.
//!
//! Every input is validated before anything is rendered, and the artefact is
//! only written once the whole set is valid, so a failed run never leaves a
//! partial table behind.

use crate::error::{json_kind, CompileError};
use crate::ids::CanonicalMapping;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::info;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace enclosing every generated table.
pub const NAMESPACE: &str = "pktnames";
const ILLEGAL_CHARACTER: char = '"';
const CPP_MAP_TYPE: &str = "std::unordered_map<const char*, std::string>";
const RUST_MAP_TYPE: &str = "LazyLock<HashMap<&str, &str>>";

const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

const RUST_KEYWORDS: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Language of the generated artefact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    #[default]
    Cpp,
    Rust,
}

impl TableFormat {
    /// Whether `name` is a keyword of the emitted language.
    #[must_use]
    pub fn is_keyword(self, name: &str) -> bool {
        let keywords = match self {
            TableFormat::Cpp => CPP_KEYWORDS,
            TableFormat::Rust => RUST_KEYWORDS,
        };
        keywords.contains(&name)
    }
}

/// One mapping to compile, as loaded from its source document.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInput {
    /// Where the data came from, used in error messages.
    pub file: String,
    pub name: String,
    pub data: Value,
}

impl TableInput {
    /// Load a persisted mapping; the table is named after the file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let data = serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        Ok(Self {
            file: path.display().to_string(),
            name: table_name(path),
            data,
        })
    }

    pub fn from_mapping(name: impl Into<String>, mapping: &CanonicalMapping) -> Self {
        let name = name.into();
        let data = Value::Object(
            mapping
                .iter()
                .map(|(id, packet)| (id.to_string(), Value::String(packet.to_owned())))
                .collect(),
        );
        Self {
            file: name.clone(),
            name,
            data,
        }
    }
}

/// Base name of `path` without its extension.
#[must_use]
pub fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A validated table, entries in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<'a> {
    pub name: &'a str,
    pub entries: Vec<(&'a str, &'a str)>,
}

/// Check that `input` is a flat string-to-string mapping safe to embed.
pub fn validate(input: &TableInput) -> Result<Table<'_>, CompileError> {
    if !is_identifier(&input.name) {
        return Err(CompileError::InvalidTableName {
            file: input.file.clone(),
            name: input.name.clone(),
        });
    }
    let Value::Object(map) = &input.data else {
        return Err(CompileError::InvalidInputShape {
            file: input.file.clone(),
            kind: json_kind(&input.data).to_owned(),
        });
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Value::String(value) = value else {
            return Err(CompileError::InvalidInputShape {
                file: input.file.clone(),
                kind: format!("{} value {value} at key {key:?}", json_kind(value)),
            });
        };
        if key.contains(ILLEGAL_CHARACTER) || value.contains(ILLEGAL_CHARACTER) {
            return Err(CompileError::IllegalCharacter {
                table: input.name.clone(),
                key: key.clone(),
                value: value.clone(),
                character: ILLEGAL_CHARACTER,
            });
        }
        entries.push((key.as_str(), value.as_str()));
    }
    Ok(Table {
        name: &input.name,
        entries,
    })
}

/// Validate every input, then render all tables into one artefact.
pub fn compile(inputs: &[TableInput], format: TableFormat) -> Result<String, CompileError> {
    let mut seen = BTreeSet::new();
    let mut tables = Vec::with_capacity(inputs.len());
    for input in inputs {
        let table = validate(input)?;
        if format.is_keyword(table.name) {
            return Err(CompileError::InvalidTableName {
                file: input.file.clone(),
                name: input.name.clone(),
            });
        }
        if !seen.insert(table.name) {
            return Err(CompileError::DuplicateTable {
                name: table.name.to_owned(),
            });
        }
        tables.push(table);
    }
    Ok(match format {
        TableFormat::Cpp => render_cpp(&tables),
        TableFormat::Rust => render_rust(&tables),
    })
}

fn render_cpp(tables: &[Table<'_>]) -> String {
    let mut out = format!("#include <string>\n#include <unordered_map>\n\nnamespace {NAMESPACE} {{\n");
    for table in tables {
        let _ = writeln!(out, "static {CPP_MAP_TYPE} {} = {{", table.name);
        for (key, value) in &table.entries {
            let (key, value) = (cpp_escape(key), cpp_escape(value));
            let _ = writeln!(out, "    {{ \"{key}\", \"{value}\" }},");
        }
        out.push_str("};\n\n");
    }
    out.push_str("}\n");
    out
}

fn render_rust(tables: &[Table<'_>]) -> String {
    let mut out = format!(
        "// @generated by pktnames; do not edit.\n\n#[allow(non_upper_case_globals)]\npub mod {NAMESPACE} {{\n"
    );
    out.push_str("use std::collections::HashMap;\nuse std::sync::LazyLock;\n\n");
    for table in tables {
        let _ = writeln!(
            out,
            "pub static {}: {RUST_MAP_TYPE} = LazyLock::new(|| {{\n    HashMap::from([",
            table.name
        );
        for (key, value) in &table.entries {
            let _ = writeln!(out, "        ({key:?}, {value:?}),");
        }
        out.push_str("    ])\n});\n\n");
    }
    out.push_str("}\n");
    out
}

/// Escape backslashes and control characters. Octal escapes are fixed width
/// so a following digit is never absorbed.
fn cpp_escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c == '\\' || c.is_ascii_control()) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(escaped, "\\{:03o}", u32::from(c));
            }
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Regenerate the artefact on disk.
    Write,
    /// Fail when the artefact on disk differs from a fresh compile.
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub format: TableFormat,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub output: PathBuf,
    /// Table name and entry count, in input order.
    pub tables: Vec<(String, usize)>,
    pub sha256: String,
}

impl CompiledArtifact {
    pub fn summary(&self) -> String {
        let tables = self
            .tables
            .iter()
            .map(|(name, count)| format!("{name}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} ({tables}) sha256={}",
            self.output.display(),
            self.sha256
        )
    }
}

/// Compile persisted mapping files into one artefact at `options.output`.
pub fn compile_files(options: &CompileOptions) -> Result<CompiledArtifact> {
    if options.inputs.is_empty() {
        bail!("no input mappings given");
    }
    let inputs = options
        .inputs
        .iter()
        .map(|path| TableInput::from_path(path))
        .collect::<Result<Vec<_>>>()?;
    let rendered = compile(&inputs, options.format)?;
    let artifact = CompiledArtifact {
        output: options.output.clone(),
        tables: inputs
            .iter()
            .map(|input| {
                let count = input.data.as_object().map_or(0, serde_json::Map::len);
                (input.name.clone(), count)
            })
            .collect(),
        sha256: hash_bytes(rendered.as_bytes()),
    };

    match options.mode {
        WriteMode::Write => {
            if let Some(parent) = options
                .output
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&options.output, &rendered).with_context(|| {
                format!("failed to write packet tables {}", options.output.display())
            })?;
            info!("wrote {}", artifact.summary());
        }
        WriteMode::Check => {
            let existing = fs::read(&options.output).with_context(|| {
                format!("failed to read packet tables {}", options.output.display())
            })?;
            if existing != rendered.as_bytes() {
                bail!(
                    "{} is out of date (expected sha256 {}, found {})",
                    options.output.display(),
                    artifact.sha256,
                    hash_bytes(&existing)
                );
            }
            info!("{} is up to date", options.output.display());
        }
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(name: &str, data: Value) -> TableInput {
        TableInput {
            file: format!("{name}.json"),
            name: name.to_owned(),
            data,
        }
    }

    #[test]
    fn renders_cpp_tables_in_namespace() {
        let rendered = compile(
            &[
                input("clientbound", json!({"0001": "Foo", "0102": "Bar"})),
                input("serverbound", json!({})),
            ],
            TableFormat::Cpp,
        )
        .unwrap();
        let expected = concat!(
            "#include <string>\n",
            "#include <unordered_map>\n",
            "\n",
            "namespace pktnames {\n",
            "static std::unordered_map<const char*, std::string> clientbound = {\n",
            "    { \"0001\", \"Foo\" },\n",
            "    { \"0102\", \"Bar\" },\n",
            "};\n",
            "\n",
            "static std::unordered_map<const char*, std::string> serverbound = {\n",
            "};\n",
            "\n",
            "}\n",
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn renders_rust_tables() {
        let rendered = compile(
            &[
                input("clientbound", json!({"0001": "Foo", "0102": "Bar"})),
                input("serverbound", json!({})),
            ],
            TableFormat::Rust,
        )
        .unwrap();
        let expected = concat!(
            "// @generated by pktnames; do not edit.\n",
            "\n",
            "#[allow(non_upper_case_globals)]\n",
            "pub mod pktnames {\n",
            "use std::collections::HashMap;\n",
            "use std::sync::LazyLock;\n",
            "\n",
            "pub static clientbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {\n",
            "    HashMap::from([\n",
            "        (\"0001\", \"Foo\"),\n",
            "        (\"0102\", \"Bar\"),\n",
            "    ])\n",
            "});\n",
            "\n",
            "pub static serverbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {\n",
            "    HashMap::from([\n",
            "    ])\n",
            "});\n",
            "\n",
            "}\n",
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn rust_literals_are_escaped() {
        let rendered = compile(
            &[input("clientbound", json!({"0001": "Path\\b", "0002": "Tab\there"}))],
            TableFormat::Rust,
        )
        .unwrap();
        assert!(rendered.contains(r#"        ("0001", "Path\\b"),"#), "{rendered}");
        assert!(rendered.contains(r#"        ("0002", "Tab\there"),"#), "{rendered}");
    }

    #[test]
    fn cpp_literals_escape_backslashes_only_when_present() {
        let rendered = compile(
            &[input(
                "clientbound",
                json!({"0001": "Foo\\", "0002": "Bell\u{7}1", "0003": "Plain"}),
            )],
            TableFormat::Cpp,
        )
        .unwrap();
        assert!(rendered.contains(r#"    { "0001", "Foo\\" },"#), "{rendered}");
        assert!(rendered.contains(r#"    { "0002", "Bell\0071" },"#), "{rendered}");
        assert!(rendered.contains(r#"    { "0003", "Plain" },"#), "{rendered}");
    }

    #[test]
    fn rejects_keywords_of_the_emitted_language() {
        let err = compile(&[input("type", json!({}))], TableFormat::Rust).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidTableName {
                file: "type.json".to_owned(),
                name: "type".to_owned(),
            }
        );
        assert!(compile(&[input("type", json!({}))], TableFormat::Cpp).is_ok());

        let err = compile(&[input("class", json!({}))], TableFormat::Cpp).unwrap_err();
        assert!(matches!(err, CompileError::InvalidTableName { .. }));
        assert!(compile(&[input("class", json!({}))], TableFormat::Rust).is_ok());
    }

    #[test]
    fn keeps_input_key_order() {
        let data: Value = serde_json::from_str(r#"{"0102": "B", "0001": "A"}"#).unwrap();
        let rendered = compile(&[input("t", data)], TableFormat::Cpp).unwrap();
        let b = rendered.find("\"0102\"").unwrap();
        let a = rendered.find("\"0001\"").unwrap();
        assert!(b < a);
    }

    #[test]
    fn rejects_quote_in_value() {
        let err = compile(
            &[
                input("clientbound", json!({"0001": "Ok"})),
                input("serverbound", json!({"0002": "Foo\"Bar"})),
            ],
            TableFormat::Cpp,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::IllegalCharacter {
                table: "serverbound".to_owned(),
                key: "0002".to_owned(),
                value: "Foo\"Bar".to_owned(),
                character: '"',
            }
        );
    }

    #[test]
    fn rejects_quote_in_key() {
        let err = compile(&[input("t", json!({"00\"1": "Foo"}))], TableFormat::Cpp).unwrap_err();
        assert!(matches!(err, CompileError::IllegalCharacter { .. }));
    }

    #[test]
    fn rejects_non_mapping_input() {
        let err = compile(&[input("t", json!(["0001", "Foo"]))], TableFormat::Cpp).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidInputShape {
                file: "t.json".to_owned(),
                kind: "array".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_nested_values() {
        let err = compile(&[input("t", json!({"01": {"02": "Foo"}}))], TableFormat::Cpp)
            .unwrap_err();
        match err {
            CompileError::InvalidInputShape { file, kind } => {
                assert_eq!(file, "t.json");
                assert!(kind.starts_with("object value"));
                assert!(kind.contains("\"01\""));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_and_duplicate_names() {
        let err = compile(&[input("tribulle-clientbound", json!({}))], TableFormat::Cpp)
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidTableName { .. }));

        let err = compile(&[input("t", json!({})), input("t", json!({}))], TableFormat::Cpp)
            .unwrap_err();
        assert_eq!(err, CompileError::DuplicateTable { name: "t".to_owned() });
    }

    #[test]
    fn table_name_strips_directory_and_extension() {
        assert_eq!(
            table_name(Path::new("packets/tribulle_clientbound.json")),
            "tribulle_clientbound"
        );
    }

    #[test]
    fn from_mapping_uses_canonical_order() {
        let mapping: CanonicalMapping = [
            (crate::ids::PacketId::new(0x0200), "Second".to_owned()),
            (crate::ids::PacketId::new(0x0001), "First".to_owned()),
        ]
        .into_iter()
        .collect();
        let table = TableInput::from_mapping("clientbound", &mapping);
        let validated = validate(&table).unwrap();
        assert_eq!(validated.entries, [("0001", "First"), ("0200", "Second")]);
    }
}
