use anyhow::{Context, Result};
use clap::Parser;
use rthread::{init_tracing_once, ApiOptions, Credentials, ExportFormat, RedditApi, ScrapeError, ScrapeOptions, ThreadScraper};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rthread", about = "Fetch Reddit threads with all their comments and export them")]
struct Cli {
    /// Reddit thread URLs to scrape
    #[arg(long, num_args = 1.., required = true)]
    urls: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Console)]
    format: ExportFormat,

    /// Path to the credentials JSON file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Directory for JSON/CSV files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Truncate bodies in console output to this many characters
    #[arg(long, default_value_t = 500)]
    preview_chars: usize,

    /// Skip the combined file when several threads succeed
    #[arg(long)]
    no_combined: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

fn run(cli: Cli) -> Result<bool> {
    let credentials = Credentials::load(&cli.config).context("could not load credentials")?;
    tracing::info!(config = %cli.config.display(), client_id = %credentials.client_id, "Credentials loaded");

    let api = RedditApi::new(credentials, ApiOptions::default())?;
    let opts = ScrapeOptions::default()
        .with_output_dir(&cli.output_dir)
        .with_format(cli.format)
        .with_preview_chars(cli.preview_chars)
        .with_combined(!cli.no_combined)
        .with_progress(cli.progress);

    // Per-URL failures are already logged by the scraper.
    let report = ThreadScraper::new(api).options(opts).run(&cli.urls)?;
    Ok(!report.all_failed())
}

fn main() -> ExitCode {
    init_tracing_once();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("error: every thread URL failed");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {error}");
            for cause in error.chain().skip(1) {
                eprintln!("  because: {cause}");
            }
            if let Some(ScrapeError::Authentication(_)) = error.downcast_ref::<ScrapeError>() {
                eprintln!("  hint: check client_id/client_secret in the credentials file");
            }
            ExitCode::FAILURE
        }
    }
}
