//! docdrift: check a skill bundle for drift between its documentation and
//! its scripts, and write a JSON conflict report.
//!
//! `docdrift ./my-skill ./conflict-report.json`

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docdrift::{analyze, AnalyzerOptions, Bundle, BundleLayout, ModeSelection, SegmentMode};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Plain text for .txt documentation, markdown otherwise
    Auto,
    Markdown,
    /// PDF-derived plain text
    Plain,
}

#[derive(Parser)]
#[command(
    name = "docdrift",
    about = "Detect conflicts between skill documentation and its implementation"
)]
struct Cli {
    /// Skill bundle directory
    bundle: PathBuf,

    /// Where to write the JSON report
    output: PathBuf,

    /// Documentation file inside the bundle
    #[arg(long, default_value = "SKILL.md")]
    doc_file: String,

    /// Source directory inside the bundle
    #[arg(long, default_value = "scripts")]
    scripts_dir: String,

    /// Reference directory inside the bundle
    #[arg(long, default_value = "references")]
    references_dir: String,

    /// How to segment the documentation
    #[arg(long, value_enum, default_value = "auto")]
    mode: Mode,

    /// Number of conflicts echoed to stdout
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let layout = BundleLayout {
        doc_file: cli.doc_file.clone(),
        scripts_dir: cli.scripts_dir.clone(),
        references_dir: cli.references_dir.clone(),
    };
    let bundle = Bundle::load(&cli.bundle, &layout)?;

    let options = AnalyzerOptions {
        mode: match cli.mode {
            Mode::Auto => ModeSelection::Auto,
            Mode::Markdown => ModeSelection::Fixed(SegmentMode::Markdown),
            Mode::Plain => ModeSelection::Fixed(SegmentMode::Plain),
        },
        ..AnalyzerOptions::default()
    };
    let result = analyze(&bundle, &options, chrono::Utc::now());

    let json = result
        .report()
        .to_json()
        .context("failed to serialize report")?;
    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(&cli.output, json + "\n")
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    let total = result.statistics.total_conflicts;
    if total == 0 {
        println!("No conflicts found in skill '{}'", result.skill_name);
    } else {
        println!("Found {total} conflicts in skill '{}'", result.skill_name);
        for conflict in result.conflicts.iter().take(cli.top) {
            println!("  {conflict}");
        }
        if total > cli.top {
            println!("  ... and {} more", total - cli.top);
        }
    }
    println!("Report saved to: {}", cli.output.display());
    Ok(())
}
