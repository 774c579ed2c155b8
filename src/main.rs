mod auth;
mod body;
mod config;
mod error;
mod fetcher;
mod gmail;
mod llm;
mod notifier;
mod publisher;
mod report;
mod runner;
mod sheets;
mod slack;
mod summarizer;
#[cfg(test)]
mod testing;
mod window;

use clap::Parser;
use config::{Config, Secrets};
use error::BoxError;
use runner::{Collaborators, ReportConfig, ReportRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Summarize the overnight inbox into a Google Sheet and post a Slack digest.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// TOML config file; built-in defaults are used when it does not exist.
    #[arg(long, default_value = "daily_digest.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Secrets are checked before anything touches the network.
    let secrets = Secrets::from_env().inspect_err(|e| error!(error = %e, "Startup failed"))?;
    let cfg = Config::load(&cli.config)?;
    let report_cfg = ReportConfig::from_section(&cfg.report)?;
    info!(config = %cli.config.display(), channel = %report_cfg.slack_channel, "Configuration loaded");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let google = Arc::new(auth::GoogleAuth::new(&cfg.google).await?);
    let mail = gmail::GmailClient::new(http.clone(), google.clone());
    let sheets = sheets::SheetsClient::new(http.clone(), google);
    let chat = slack::SlackClient::new(http, &cfg.slack.base_url, secrets.slack_bot_token);
    let llm = llm::ChatCompletionClient::new(&cfg.llm, secrets.llm_api_key)?;

    let mut runner = ReportRunner::new(
        report_cfg,
        Collaborators {
            mail: &mail,
            llm: &llm,
            sheets: &sheets,
            chat: &chat,
        },
    );

    match runner.run().await {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                listed = summary.fetch.listed,
                skipped = summary.fetch.skipped,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!(state = %runner.state(), "Run aborted");
            Err(e.into())
        }
    }
}
