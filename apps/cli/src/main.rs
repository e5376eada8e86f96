// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pitchline - roof measurement sheets from top-down roof drawings.
//!
//! Usage:
//!   pitchline sheet <drawing.json> [--output <sheet.json>]
//!   pitchline fill <drawing.json> <sheet.json> [--output <sheet.json>] [--summary <summary.json>]
//!   pitchline summary <drawing.json> <sheet.json>
//!
//! Every command accepts `--config <file.json>` to override the engine
//! settings read from `PITCHLINE_*` environment variables.

use std::path::PathBuf;

use anyhow::{bail, Context};

mod commands;
mod config;

use commands::Command;
use config::Config;

/// Command line after option parsing.
#[derive(Debug, PartialEq)]
struct Invocation {
    command: Command,
    config_file: Option<PathBuf>,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage();
        return;
    }

    let config = Config::from_env();
    init_tracing(config.log_json);

    if let Err(err) = parse_args(&args).and_then(|inv| execute(inv, config)) {
        tracing::error!(error = %err, "command failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,pitchline=debug".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn execute(invocation: Invocation, mut config: Config) -> anyhow::Result<()> {
    if let Some(path) = &invocation.config_file {
        config = config.with_file(path)?;
    }
    tracing::debug!(command = ?invocation.command, engine = ?config.engine, "running");
    commands::run(&invocation.command, &config)
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut output: Option<PathBuf> = None;
    let mut summary: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;

    let name = args.first().context("missing command")?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--output" | "--summary" | "--config") => {
                i += 1;
                let value = args
                    .get(i)
                    .map(PathBuf::from)
                    .with_context(|| format!("{flag} needs a path"))?;
                match flag {
                    "--output" => output = Some(value),
                    "--summary" => summary = Some(value),
                    _ => config_file = Some(value),
                }
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => positional.push(PathBuf::from(other)),
        }
        i += 1;
    }

    let command = match (name.as_str(), positional.as_slice()) {
        ("sheet", [drawing]) if summary.is_none() => Command::Sheet {
            drawing: drawing.clone(),
            output,
        },
        ("fill", [drawing, sheet]) => Command::Fill {
            drawing: drawing.clone(),
            sheet: sheet.clone(),
            output,
            summary,
        },
        ("summary", [drawing, sheet]) if output.is_none() && summary.is_none() => Command::Summary {
            drawing: drawing.clone(),
            sheet: sheet.clone(),
        },
        ("sheet" | "fill" | "summary", _) => {
            bail!("wrong arguments for '{name}', see --help")
        }
        (other, _) => bail!("unknown command: {other}"),
    };

    Ok(Invocation {
        command,
        config_file,
    })
}

fn print_usage() {
    println!("Pitchline - roof measurement sheets from top-down roof drawings");
    println!();
    println!("Usage:");
    println!("  pitchline sheet <drawing.json> [--output <sheet.json>]");
    println!("  pitchline fill <drawing.json> <sheet.json> [--output <sheet.json>] [--summary <summary.json>]");
    println!("  pitchline summary <drawing.json> <sheet.json>");
    println!();
    println!("Options:");
    println!("  --config <file.json>   Engine settings (drawing + calibration)");
    println!();
    println!("Environment:");
    println!("  PITCHLINE_EPSILON, PITCHLINE_ARC_SAMPLES, PITCHLINE_WASTE_FACTOR,");
    println!("  PITCHLINE_PROJECTION (inclined-plane | fall-line), PITCHLINE_STRICT_TOPOLOGY,");
    println!("  PITCHLINE_OUTPUT_DIR, PITCHLINE_LOG_JSON, RUST_LOG");
}
