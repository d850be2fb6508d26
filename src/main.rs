/// keyhunt: recover embedded AES keys from obfuscated JavaScript.
///
/// Reads an already-simplified source file (upstream passes handle literal
/// normalization, control-flow unflattening, proxy inlining, and string
/// table inlining), statically re-derives candidate key strings, and prints
/// a report. Exits non-zero when no valid key is found.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use keyhunt::{ExtractionOptions, run_extraction};
use tracing::debug;

#[derive(Parser)]
#[command(name = "keyhunt")]
#[command(about = "Static AES key recovery from obfuscated JavaScript", long_about = None)]
#[command(version)]
struct Cli {
    /// JavaScript file to analyze (output of the simplification passes)
    input: PathBuf,

    /// Collect every candidate from every strategy instead of stopping at
    /// the first valid key
    #[arg(long)]
    exhaustive: bool,

    /// Emit the structured report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    debug!(bytes = source.len(), "loaded input source");

    let options = ExtractionOptions {
        exhaustive: cli.exhaustive,
    };
    let report = run_extraction(&source, &options)
        .with_context(|| format!("key extraction failed for {}", cli.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    if report.keys.is_empty() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// warn+ to stderr unless RUST_LOG overrides.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
