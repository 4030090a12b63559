//! `generate` command: send a brief to the endpoint and export the report.

use std::path::{Path, PathBuf};

use clap::Args;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::brief::BriefArgs;
use crate::app::client::GenerationClient;
use crate::app::export::{copy_markdown, write_html, write_markdown, write_pdf};
use crate::app::session::{Report, Session};
use crate::domain::configuration::load_config;
use crate::domain::{AppError, GenerationError};
use crate::services::{ArboardClipboard, HttpStrategyEndpoint};

/// Exit code used when the user cancels an in-flight request.
const CANCELLED_EXIT_CODE: i32 = 130;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub brief: BriefArgs,
    /// Generation endpoint URL (overrides client.endpoint_url)
    #[arg(long)]
    pub endpoint: Option<Url>,
    /// Write the Markdown report (default when no other output is chosen)
    #[arg(long)]
    pub markdown: bool,
    /// Write the one-page PDF summary
    #[arg(long)]
    pub pdf: bool,
    /// Write a standalone HTML page
    #[arg(long)]
    pub html: bool,
    /// Copy the Markdown report to the clipboard
    #[arg(long)]
    pub copy: bool,
    /// Print the strategy document JSON to stdout
    #[arg(long)]
    pub json: bool,
    /// Directory for written reports
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl GenerateArgs {
    fn wants_markdown(&self) -> bool {
        self.markdown || !(self.pdf || self.html || self.copy || self.json)
    }
}

pub fn run_generate(args: GenerateArgs, config_path: Option<&Path>) -> Result<i32, AppError> {
    let Some(input) = args.brief.resolve()? else {
        println!("Cancelled");
        return Ok(0);
    };

    let mut config = load_config(config_path)?;
    if let Some(endpoint) = args.endpoint.clone() {
        config.client.endpoint_url = endpoint;
    }
    config.client.validate()?;
    let endpoint = HttpStrategyEndpoint::new(&config.client)?;

    let runtime = super::runtime()?;
    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watcher.cancel();
            }
        });

        let mut session = Session::new(GenerationClient::new(endpoint));
        eprintln!("⏳ Generating strategy via {}", config.client.endpoint_url);
        let report = match session.submit(input, &cancel).await {
            Ok(report) => report,
            Err(GenerationError::Cancelled) => {
                eprintln!("Generation cancelled");
                return Ok(CANCELLED_EXIT_CODE);
            }
            Err(err) => return Err(AppError::from(err)),
        };
        export_report(report, &args)
    })
}

fn export_report(report: &Report, args: &GenerateArgs) -> Result<i32, AppError> {
    if let Some(notice) = report.notice() {
        eprintln!("⚠️  {}", notice);
    }

    if args.wants_markdown() || args.pdf || args.html {
        std::fs::create_dir_all(&args.out_dir)?;
    }

    let mut exit_code = 0;
    if args.wants_markdown() {
        let path = write_markdown(report, &args.out_dir)?;
        println!("✅ Wrote {}", path.display());
    }
    if args.pdf {
        match write_pdf(report, &args.out_dir) {
            Ok(path) => println!("✅ Wrote {}", path.display()),
            Err(err) => {
                eprintln!("Error: {}", err);
                exit_code = 1;
            }
        }
    }
    if args.html {
        let path = write_html(report, &args.out_dir)?;
        println!("✅ Wrote {}", path.display());
    }
    if args.copy {
        let mut clipboard = ArboardClipboard::new()?;
        copy_markdown(report, &mut clipboard)?;
        println!("✅ Copied report to clipboard");
    }
    if args.json {
        println!("{}", report.document.to_json_pretty());
    }
    Ok(exit_code)
}
