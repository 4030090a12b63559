//! CLI Adapter.

mod brief;
mod generate;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::configuration::load_config;
use crate::domain::samples::sample_brief;
use crate::domain::{AppError, ReportVariant, build_prompt};
use brief::BriefArgs;
use generate::GenerateArgs;

#[derive(Parser)]
#[command(name = "strategy-maker")]
#[command(version)]
#[command(
    about = "Generate marketing strategies from campaign briefs",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to ./strategy-maker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generation endpoint
    #[clap(visible_alias = "s")]
    Serve {
        /// Socket address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Generate a strategy report for a brief
    #[clap(visible_alias = "g")]
    Generate(GenerateArgs),
    /// Print the generation prompt for a brief without sending it
    #[clap(visible_alias = "p")]
    Prompt {
        #[command(flatten)]
        brief: BriefArgs,
        /// Sections to request (defaults to generator.report)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,
    },
    /// Print a built-in sample brief as JSON
    Sample {
        /// Sample index (wraps around)
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Basic,
    Extended,
}

impl From<VariantArg> for ReportVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Basic => ReportVariant::Basic,
            VariantArg::Extended => ReportVariant::Extended,
        }
    }
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result: Result<i32, AppError> = match cli.command {
        Commands::Serve { bind } => serve::run_serve(bind, config_path),
        Commands::Generate(args) => generate::run_generate(args, config_path),
        Commands::Prompt { brief, variant } => run_prompt(&brief, variant, config_path),
        Commands::Sample { index } => run_sample(index),
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn run_prompt(
    brief: &BriefArgs,
    variant: Option<VariantArg>,
    config_path: Option<&Path>,
) -> Result<i32, AppError> {
    let Some(input) = brief.resolve()? else {
        return Ok(0);
    };
    let variant = match variant {
        Some(value) => value.into(),
        None => load_config(config_path)?.generator.report,
    };
    println!("{}", build_prompt(&input, variant)?);
    Ok(0)
}

fn run_sample(index: usize) -> Result<i32, AppError> {
    let json = serde_json::to_string_pretty(&sample_brief(index))
        .map_err(|e| AppError::parse_error("sample brief", e))?;
    println!("{}", json);
    Ok(0)
}
