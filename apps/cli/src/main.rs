// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: parse a directory of COBie sheets.
//!
//! Loads every sheet file in the directory, resolves references, optionally
//! runs the derivation passes, and prints a record count per page followed
//! by the diagnostics.
//!
//! Usage:
//!   cobie-lite <sheet-dir> [--config file.toml] [--export dir] [--json file] [--derive]

use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use cobie_lite_core::{CobieParser, CsvExporter, Flags, ParseOptions, SheetKind};

mod config;

use config::{CliConfig, LogFormat};

#[derive(Debug, Default, PartialEq)]
struct Args {
    sheet_dir: String,
    config: Option<String>,
    export: Option<String>,
    json: Option<String>,
    derive: bool,
}

enum Command {
    Run(Args),
    Help,
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    if first == "--help" || first == "-h" {
        return Ok(Command::Help);
    }

    let mut parsed = Args {
        sheet_dir: first.clone(),
        ..Default::default()
    };
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        let mut value = |flag: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?),
            "--export" => parsed.export = Some(value("--export")?),
            "--json" => parsed.json = Some(value("--json")?),
            "--derive" => parsed.derive = true,
            other => return Err(format!("Unknown option: {other}")),
        }
    }
    Ok(Command::Run(parsed))
}

fn print_usage() {
    println!("Usage: cobie-lite <sheet-dir> [options]");
    println!();
    println!("Options:");
    println!("  --config <file>   Parse options (TOML); defaults to $COBIE_CONFIG");
    println!("  --export <dir>    Write one CSV file per page to <dir>");
    println!("  --json <file>     Write a JSON snapshot of the resolved store");
    println!("  --derive          Run the space, level, area and system derivations");
}

fn load_options(path: Option<&str>) -> Result<ParseOptions> {
    let Some(path) = path else {
        return Ok(ParseOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading options from {path}"))?;
    ParseOptions::from_toml(&text).with_context(|| format!("parsing options from {path}"))
}

fn run(args: Args, config: &CliConfig) -> Result<usize> {
    let mut options = load_options(args.config.as_deref().or(config.config_path.as_deref()))?;
    if args.derive {
        options.flags.insert(
            Flags::PROMOTE_COMPONENTS | Flags::PROMOTE_SPACES | Flags::INFER_LEVELS | Flags::INFER_SYSTEMS,
        );
    }

    let mut parser = CobieParser::new(options)?;
    let stats = parser
        .parse_directory(&args.sheet_dir)
        .with_context(|| format!("loading sheets from {}", args.sheet_dir))?;
    let visited = parser.resolve();
    let derived = if args.derive { parser.run_derivations() } else { 0 };
    tracing::info!(
        rows = stats.rows,
        admitted = stats.admitted,
        merged = stats.merged,
        visited,
        derived,
        "parse complete"
    );

    if let Some(dir) = &args.export {
        let mut exporter = CsvExporter::new();
        let rows = parser
            .export(&mut exporter, dir)
            .with_context(|| format!("exporting to {dir}"))?;
        tracing::info!(rows, destination = %dir, "export complete");
    }
    if let Some(path) = &args.json {
        let json = parser.store().to_json()?;
        fs::write(path, json).with_context(|| format!("writing snapshot to {path}"))?;
    }

    for kind in SheetKind::ALL {
        if let Some(page) = parser.store().page(kind) {
            println!("{:<16} {:>6}", kind.as_str(), page.len());
        }
    }
    for diagnostic in parser.diagnostics().entries() {
        match config.log_format {
            LogFormat::Json => println!("{}", serde_json::to_string(diagnostic)?),
            LogFormat::Pretty => println!("{:?}: {}", diagnostic.severity, diagnostic),
        }
    }
    let errors = parser.error_count();
    println!("{errors} error(s)");
    Ok(errors)
}

fn main() -> ExitCode {
    let config = CliConfig::from_env();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(args, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
