use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ercscope_core::config::CheckConfig;
use ercscope_core::report::{model::ToolInfo, render};
use ercscope_core::{InspectRequest, inspect};

mod args;

/// Exit status when no report could be produced.
const EXIT_ANALYSIS_ERROR: u8 = 2;

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: args::Args) -> Result<u8> {
    let tool = ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: args.commit.clone(),
    };

    let mut config = CheckConfig {
        solc: args.solc,
        solc_args: args.solc_args,
        ..CheckConfig::default()
    };
    config.library_prefixes.extend(args.library_prefixes);
    debug!(?config, "configuration");

    let request = InspectRequest {
        source: args.source,
        contract: args.contract,
        standard: args.standard,
    };
    let report = inspect(&request, &config, tool)?;

    let output = match args.format {
        args::OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
        args::OutputFormat::Text => render::render_text(&report),
    };

    match args.out {
        Some(path) => std::fs::write(&path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }

    Ok(u8::try_from(report.verdict.exit_code).unwrap_or(EXIT_ANALYSIS_ERROR))
}

fn main() -> ExitCode {
    let args = args::Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ANALYSIS_ERROR)
        }
    }
}
