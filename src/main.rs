// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: CLI entry point for fetching, merging and compiling packet names.
// Author: Lukas Bower
#![forbid(unsafe_code)]

//! CLI entry point for the packet name registry builder.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;
use pktnames::compile::{compile_files, CompileOptions, TableFormat, WriteMode};
use pktnames::fetch::{DirectorySource, DocumentSource, HttpSource};
use pktnames::pipeline::{export_all, ExportOptions, SourceSelection};
use pktnames::{LogicalFile, PacketRegistry, SourceConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Packet name registry builder")]
struct Cli {
    /// Log debug detail, including skipped declarations.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch both sources and write one canonical mapping per packet file.
    Fetch(FetchArgs),
    /// Compile canonical mappings into a static table source.
    Compile(CompileArgs),
    /// Print the known name of a packet.
    Lookup(LookupArgs),
}

#[derive(Debug, Parser)]
struct FetchArgs {
    /// Source locations TOML (built-in defaults when omitted).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Read a local mirror instead of fetching over HTTP.
    #[arg(long, value_name = "DIR")]
    mirror: Option<PathBuf>,
    /// Directory receiving the mapping files.
    #[arg(long, default_value = "packets")]
    out_dir: PathBuf,
    /// Which mapping to export.
    #[arg(long, value_enum, default_value_t = SourceSelection::Merged)]
    source: SourceSelection,
    /// Restrict to these packet files (all four by default).
    #[arg(long = "file", value_name = "NAME")]
    files: Vec<LogicalFile>,
}

#[derive(Debug, Parser)]
struct CompileArgs {
    /// Canonical mapping JSON files; each becomes a table named after its stem.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Generated table source path.
    #[arg(short, long)]
    output: PathBuf,
    /// Language of the generated tables.
    #[arg(long, value_enum, default_value_t = TableFormat::Cpp)]
    format: TableFormat,
    /// Verify the output is up to date instead of writing it.
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Parser)]
struct LookupArgs {
    /// Directory holding the canonical mapping files.
    #[arg(long, default_value = "packets")]
    dir: PathBuf,
    /// Packet file, e.g. clientbound or tribulle_serverbound.
    file: LogicalFile,
    /// Packet code as four hex digits, e.g. 1a08.
    id: pktnames::PacketId,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Fetch(args) => fetch(args),
        Command::Compile(args) => compile(args),
        Command::Lookup(args) => lookup(args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn fetch(args: FetchArgs) -> Result<()> {
    let source: Box<dyn DocumentSource> = match args.mirror {
        Some(root) => Box::new(DirectorySource::new(root)),
        None => {
            let config = match args.config.as_deref() {
                Some(path) => SourceConfig::load(path)?,
                None => SourceConfig::default(),
            };
            Box::new(HttpSource::new(config))
        }
    };
    let mut options = ExportOptions::new(args.out_dir);
    options.selection = args.source;
    if !args.files.is_empty() {
        options.files = args.files;
    }
    for exported in export_all(source.as_ref(), &options)? {
        println!(
            "pktnames: wrote {} ({} packets)",
            exported.path.display(),
            exported.packets
        );
    }
    Ok(())
}

fn compile(args: CompileArgs) -> Result<()> {
    let options = CompileOptions {
        inputs: args.inputs,
        output: args.output,
        format: args.format,
        mode: if args.check {
            WriteMode::Check
        } else {
            WriteMode::Write
        },
    };
    let artifact = compile_files(&options)?;
    let verb = if args.check { "checked" } else { "wrote" };
    println!("pktnames: {verb} {}", artifact.summary());
    Ok(())
}

fn lookup(args: LookupArgs) -> Result<()> {
    let registry = PacketRegistry::load_dir(&args.dir)
        .with_context(|| format!("failed to load packet names from {}", args.dir.display()))?;
    match registry.get(args.file, args.id.code()) {
        Some(name) => {
            println!("{name}");
            Ok(())
        }
        None => anyhow::bail!("{} {} is not a known packet", args.file, args.id),
    }
}
