//! sheetwatch CLI
//!
//! Polls configured spreadsheet ranges and sends SMS alerts when threshold
//! conditions start being satisfied.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sheetwatch::{
    AlertDispatcher, Config, GoogleSheetsClient, SheetsConfig, VonageConfig, VonageSms, Watcher,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sheetwatch")]
#[command(about = "Watch spreadsheet ranges and send SMS alerts on threshold transitions")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "./config.json")]
    config: PathBuf,

    /// Google Sheets API key
    #[arg(long, env = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,

    /// Vonage API key
    #[arg(long, env = "VONAGE_API_KEY")]
    vonage_api_key: Option<String>,

    /// Vonage API secret
    #[arg(long, env = "VONAGE_API_SECRET")]
    vonage_api_secret: Option<String>,

    /// Run a single polling sweep and exit
    #[arg(long)]
    once: bool,

    /// Render alerts without sending them (Vonage credentials not required)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log level via RUST_LOG, default info.
    // Example: RUST_LOG=sheetwatch=debug sheetwatch --config ./config.json
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sheetwatch=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    info!(
        config = %cli.config.display(),
        sources = config.spreadsheets.len(),
        monitors = config.monitor_count(),
        "config loaded"
    );

    let Some(google_api_key) = cli.google_api_key else {
        bail!("missing Google API key (--google-api-key or GOOGLE_API_KEY)");
    };
    let client = GoogleSheetsClient::new(SheetsConfig {
        api_key: google_api_key,
        ..SheetsConfig::default()
    })
    .context("failed to create Google Sheets client")?;

    let (vonage_api_key, vonage_api_secret) = if cli.dry_run {
        (
            cli.vonage_api_key.unwrap_or_default(),
            cli.vonage_api_secret.unwrap_or_default(),
        )
    } else {
        let Some(key) = cli.vonage_api_key else {
            bail!("missing Vonage API key (--vonage-api-key or VONAGE_API_KEY)");
        };
        let Some(secret) = cli.vonage_api_secret else {
            bail!("missing Vonage API secret (--vonage-api-secret or VONAGE_API_SECRET)");
        };
        (key, secret)
    };
    let transport = VonageSms::new(VonageConfig {
        api_key: vonage_api_key,
        api_secret: vonage_api_secret,
        ..VonageConfig::default()
    })
    .context("failed to create Vonage SMS client")?;

    let dispatcher = AlertDispatcher::new(transport).with_dry_run(cli.dry_run);
    let mut watcher = Watcher::new(&config, client, dispatcher);

    if cli.once {
        let report = watcher.sweep(chrono::Utc::now()).await;
        if report.sources > 0 && report.auth_failures == report.sources {
            bail!("authentication rejected for every configured source; check credentials");
        }
        info!(
            monitors_evaluated = report.monitors_evaluated,
            fetch_failures = report.fetch_failures,
            alerts_sent = report.alerts_sent,
            "single sweep complete"
        );
        return Ok(());
    }

    watcher
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
