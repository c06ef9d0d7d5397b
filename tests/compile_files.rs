// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate table compilation determinism and failure behaviour on disk.
// Author: Lukas Bower

use pktnames::compile::{compile_files, hash_bytes, CompileOptions, TableFormat, WriteMode};
use pktnames::CompileError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_inputs(dir: &Path) -> Vec<PathBuf> {
    let clientbound = dir.join("clientbound.json");
    let tribulle = dir.join("tribulle_serverbound.json");
    fs::write(
        &clientbound,
        "{\n    \"1a08\": \"Login\",\n    \"0101\": \"Handshake\"\n}\n",
    )
    .expect("write clientbound");
    fs::write(&tribulle, "{}\n").expect("write tribulle");
    vec![clientbound, tribulle]
}

fn options(inputs: Vec<PathBuf>, output: PathBuf, mode: WriteMode) -> CompileOptions {
    CompileOptions {
        inputs,
        output,
        format: TableFormat::Cpp,
        mode,
    }
}

#[test]
fn compiles_header_in_input_order() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("generated").join("pktnames.hpp");
    let inputs = write_inputs(temp_dir.path());

    let artifact =
        compile_files(&options(inputs, output.clone(), WriteMode::Write)).expect("compile");
    let header = fs::read_to_string(&output).expect("read header");
    assert_eq!(
        header,
        concat!(
            "#include <string>\n",
            "#include <unordered_map>\n",
            "\n",
            "namespace pktnames {\n",
            "static std::unordered_map<const char*, std::string> clientbound = {\n",
            "    { \"1a08\", \"Login\" },\n",
            "    { \"0101\", \"Handshake\" },\n",
            "};\n",
            "\n",
            "static std::unordered_map<const char*, std::string> tribulle_serverbound = {\n",
            "};\n",
            "\n",
            "}\n",
        )
    );
    assert_eq!(
        artifact.tables,
        [
            ("clientbound".to_owned(), 2),
            ("tribulle_serverbound".to_owned(), 0)
        ]
    );
    assert_eq!(artifact.sha256, hash_bytes(header.as_bytes()));
}

#[test]
fn recompiling_is_byte_identical() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("pktnames.hpp");
    let inputs = write_inputs(temp_dir.path());
    let options = options(inputs, output.clone(), WriteMode::Write);

    let first = compile_files(&options).expect("first compile");
    let baseline = fs::read(&output).expect("read baseline");
    let second = compile_files(&options).expect("second compile");
    assert_eq!(first.sha256, second.sha256);
    assert_eq!(baseline, fs::read(&output).expect("read rerun"));
}

#[test]
fn check_mode_detects_stale_output() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("pktnames.hpp");
    let inputs = write_inputs(temp_dir.path());

    compile_files(&options(inputs.clone(), output.clone(), WriteMode::Write)).expect("compile");
    compile_files(&options(inputs.clone(), output.clone(), WriteMode::Check))
        .expect("fresh output passes check");

    fs::write(&inputs[1], "{\"0010\": \"Whisper\"}").expect("update input");
    let err = compile_files(&options(inputs, output.clone(), WriteMode::Check)).unwrap_err();
    assert!(err.to_string().contains("out of date"), "{err}");
    assert!(!fs::read_to_string(&output)
        .expect("read header")
        .contains("Whisper"));
}

#[test]
fn invalid_input_writes_nothing() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("pktnames.hpp");
    let mut inputs = write_inputs(temp_dir.path());
    let quoted = temp_dir.path().join("serverbound.json");
    fs::write(&quoted, r#"{"0101": "Say \"hi\""}"#).expect("write quoted");
    inputs.push(quoted);

    let err = compile_files(&options(inputs, output.clone(), WriteMode::Write)).unwrap_err();
    match err.downcast_ref::<CompileError>() {
        Some(CompileError::IllegalCharacter { table, key, .. }) => {
            assert_eq!(table, "serverbound");
            assert_eq!(key, "0101");
        }
        other => panic!("unexpected error: {other:?} ({err:#})"),
    }
    assert!(!output.exists());
}

#[test]
fn non_mapping_input_is_rejected() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("pktnames.hpp");
    let list = temp_dir.path().join("clientbound.json");
    fs::write(&list, "[\"Login\"]").expect("write list");

    let err = compile_files(&options(vec![list], output.clone(), WriteMode::Write)).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<CompileError>(),
            Some(CompileError::InvalidInputShape { kind, .. }) if kind == "array"
        ),
        "{err:#}"
    );
    assert!(!output.exists());
}

#[test]
fn rust_tables_share_the_namespace() {
    let temp_dir = TempDir::new().expect("tempdir");
    let output = temp_dir.path().join("pktnames.rs");
    let inputs = write_inputs(temp_dir.path());
    let mut options = options(inputs, output.clone(), WriteMode::Write);
    options.format = TableFormat::Rust;

    compile_files(&options).expect("compile");
    let source = fs::read_to_string(&output).expect("read source");
    assert!(source.contains("pub mod pktnames {\n"));
    assert!(source.contains(concat!(
        "pub static clientbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {\n",
        "    HashMap::from([\n",
        "        (\"1a08\", \"Login\"),\n",
        "        (\"0101\", \"Handshake\"),\n",
        "    ])\n",
    )));
    assert!(source.contains(
        "pub static tribulle_serverbound: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {\n    HashMap::from([\n    ])\n"
    ));
}
