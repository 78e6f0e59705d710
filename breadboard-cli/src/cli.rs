//! Command-line interface: argument parsing, logging setup and exit codes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands;

pub const EXIT_ERROR: u8 = 1;

/// Breadboard exercise tool: generate, grade and check plate compositions
#[derive(Parser)]
#[command(name = "breadboard")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a random composition from a prototype list
    Generate(GenerateArgs),
    /// Grade a solution composition against a reference
    Compare(CompareArgs),
    /// Report plates that overlap or do not fit the grid
    Check(CheckArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// JSON list of `{type, quantity, properties}` prototypes
    pub prototypes: PathBuf,

    /// Output file; stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "10", value_parser = clap::value_parser!(i32).range(1..=256))]
    pub cols: i32,

    #[arg(long, default_value = "10", value_parser = clap::value_parser!(i32).range(1..=256))]
    pub rows: i32,

    /// Seed for a reproducible composition
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON `{size_mid, size_deviation, attempts_max}`; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub size_mid: Option<u32>,

    #[arg(long)]
    pub size_deviation: Option<u32>,

    /// Placement attempts per plate
    #[arg(long)]
    pub attempts: Option<u32>,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Reference composition (or bare plate list)
    pub reference: PathBuf,

    /// Solution composition (or bare plate list)
    pub solution: PathBuf,

    /// Print the match report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Composition file
    pub composition: PathBuf,

    /// Print the findings as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Generate(args) => commands::generate(args),
        Commands::Compare(args) => commands::compare(args),
        Commands::Check(args) => commands::check(args),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
