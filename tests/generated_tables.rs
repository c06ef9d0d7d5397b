// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Build the checked-in generated Rust tables and keep them in step with the compiler.
// Author: Lukas Bower

use pktnames::compile::{compile_files, CompileOptions, TableFormat, WriteMode};
use std::path::PathBuf;

mod generated {
    include!("fixtures/pktnames_tables.rs");
}

use generated::pktnames as tables;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(path)
}

#[test]
fn checked_in_tables_match_a_fresh_compile() {
    let options = CompileOptions {
        inputs: vec![
            fixture("clientbound.json"),
            fixture("tribulle_serverbound.json"),
        ],
        output: fixture("pktnames_tables.rs"),
        format: TableFormat::Rust,
        mode: WriteMode::Check,
    };
    let artifact = compile_files(&options).expect("generated tables are up to date");
    assert_eq!(
        artifact.tables,
        [
            ("clientbound".to_owned(), 2),
            ("tribulle_serverbound".to_owned(), 1)
        ]
    );
}

#[test]
fn generated_tables_answer_lookups() {
    assert_eq!(tables::clientbound.get("0101"), Some(&"Handshake"));
    assert_eq!(tables::clientbound.get("1a08"), Some(&"Path\\Login"));
    assert_eq!(tables::tribulle_serverbound.get("0010"), Some(&"Whisper"));
    assert_eq!(tables::tribulle_serverbound.get("0101"), None);
    assert_eq!(tables::clientbound.len(), 2);
}
