//! CLI: Analyze a Blueprint text dump and print pseudo-code.
//!
//! Reads the copy/paste text of Blueprint nodes from a file (or stdin when no
//! path is given) and prints markdown, or the logical AST as JSON.
//!
//! Usage: `bpga [OPTIONS] [path-to-dump]`
//! Example: bpga --verbose BP_Door.txt
//!
//! Set RUST_LOG=bpga=debug for per-phase logging on stderr.

use bpga::{
    analyze_blueprint_text_with_options, BpgaError, CompileOptions, MarkdownGenerator, Result,
};
use clap::Parser;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Analyze a Blueprint text dump.
#[derive(Parser, Debug)]
#[command(name = "bpga", version)]
#[command(after_help = r#"Examples:
  bpga BP_Door.txt
  bpga --json BP_Door.txt > door.json
  cat EventGraph.txt | bpga --verbose"#)]
struct Args {
    /// Detailed output: types, node names and the diagnostics section
    #[arg(short, long)]
    verbose: bool,

    /// Print the logical AST as JSON instead of markdown
    #[arg(long)]
    json: bool,

    /// JSON file with analysis and format options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the traversal step budget
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,

    /// Path to the Blueprint text dump (reads stdin when omitted)
    #[arg(value_name = "path-to-dump")]
    path: Option<PathBuf>,
}

fn load_options(args: &Args) -> Result<CompileOptions> {
    let mut options = match &args.config {
        Some(path) => CompileOptions::from_json(&fs::read_to_string(path)?)?,
        None if args.verbose => CompileOptions::verbose(),
        None => CompileOptions::default(),
    };
    if args.verbose {
        options.format.show_diagnostics = true;
    }
    if let Some(max_steps) = args.max_steps {
        options.analysis.max_steps = max_steps;
    }
    Ok(options)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let options = load_options(args)?;
    let text = read_input(args.path.as_ref())?;
    let output = analyze_blueprint_text_with_options(&text, &options.analysis)?;

    for diagnostic in &output.diagnostics {
        tracing::debug!("[BPGA] {}", diagnostic);
    }

    if args.json {
        serde_json::to_string_pretty(&output).map_err(BpgaError::from)
    } else {
        Ok(MarkdownGenerator::new(options.format).generate(&output))
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(rendered) => print!("{}", rendered),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
