use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gritaudit::commands::run_audit;
use gritaudit::config::{AuditConfig, ConfigOverrides};
use gritaudit::lifecycle;

#[derive(Parser, Debug)]
#[command(
    name = "gritaudit",
    about = "Audit storefront pages with Lighthouse and an HTML scan, then write JSON/HTML reports",
    version
)]
struct Cli {
    /// Page to audit (repeatable). Replaces GRITAUDIT_PAGES
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,
    /// File with one URL per line; `#` starts a comment
    #[arg(long, value_name = "PATH")]
    pages_file: Option<PathBuf>,
    /// Directory for gritaudit-report.json and gritaudit-report.html
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Spreadsheet webhook receiving one summary row per page
    #[arg(long, value_name = "URL")]
    webhook_url: Option<String>,
    /// Skip the webhook push even if one is configured
    #[arg(long, conflicts_with = "webhook_url")]
    no_webhook: bool,
    /// Abort the run if a single page takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    page_timeout: Option<u64>,
    /// Chrome/Chromium executable used by Lighthouse
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,
    /// Lighthouse CLI executable
    #[arg(long, value_name = "PATH")]
    lighthouse_path: Option<PathBuf>,
    /// Log filter when RUST_LOG is unset (e.g. info, debug)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl From<Cli> for ConfigOverrides {
    fn from(cli: Cli) -> Self {
        ConfigOverrides {
            pages: cli.urls,
            pages_file: cli.pages_file,
            output_dir: cli.output_dir,
            webhook_url: cli.webhook_url,
            disable_webhook: cli.no_webhook,
            page_timeout_secs: cli.page_timeout,
            chrome_path: cli.chrome_path,
            lighthouse_path: cli.lighthouse_path,
            log_level: cli.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AuditConfig::load(cli.into()) {
        Ok(config) => config,
        Err(e) => {
            // Logging needs the configured level, so config errors go straight to stderr.
            eprintln!("gritaudit: {}", e);
            return ExitCode::FAILURE;
        }
    };

    lifecycle::init_logging(&config.log_level);
    log::info!(
        "[MAIN] Auditing {} page(s) into {}",
        config.pages.len(),
        config.output_dir.display()
    );

    match run_audit(&config).await {
        Ok(outcome) => {
            log::info!(
                "[MAIN] Done: {} page(s), {} finding(s)",
                outcome.report.pages.len(),
                outcome.report.finding_count()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[MAIN] Audit failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
