use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_protein_library::config::ConfigLoader;
use kira_protein_library::error::KiraError;
use kira_protein_library::output::{ConsoleOutput, JsonOutput, OutputMode};
use kira_protein_library::pipeline::{ConfigSummary, Pipeline};
use kira_protein_library::store::Store;

#[derive(Parser)]
#[command(name = "kira-pl")]
#[command(about = "Build a curated protein library table from overview, taxonomy and InterProScan data")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the pipeline and write table_library_complete.csv")]
    Build(BuildArgs),
    #[command(about = "Validate the configuration without loading tables")]
    Check(CheckArgs),
}

#[derive(Args)]
struct BuildArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    outdir: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    if error.is_config() {
        2
    } else if error.is_schema() {
        3
    } else {
        1
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Build(args) => run_build(args, output_mode),
        Commands::Check(args) => run_check(args, output_mode),
    }
}

fn run_build(args: BuildArgs, output_mode: OutputMode) -> miette::Result<()> {
    let resolved = ConfigLoader::resolve(args.config.as_deref())?;
    let store = match args.outdir {
        Some(outdir) => Store::new_with_root(outdir),
        None => Store::new()?,
    };
    let pipeline = Pipeline::new(resolved, store);

    match output_mode {
        OutputMode::NonInteractive => {
            let report = pipeline.run(&JsonOutput)?;
            JsonOutput::print_report(&report).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let report = pipeline.run(&ConsoleOutput)?;
            ConsoleOutput::print_report(&report);
        }
    }
    Ok(())
}

fn run_check(args: CheckArgs, output_mode: OutputMode) -> miette::Result<()> {
    let resolved = ConfigLoader::resolve(args.config.as_deref())?;
    let summary = ConfigSummary::from(&resolved);
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_config(&summary).into_diagnostic()?,
        OutputMode::Interactive => ConsoleOutput::print_config(&summary),
    }
    Ok(())
}
