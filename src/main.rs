use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use log::info;
use std::io::Write;
use std::path::PathBuf;

use birthday_board::calendar::GoogleCalendarClient;
use birthday_board::config::{self, AppConfig};
use birthday_board::credentials::{CredentialSource, EnvOrFileCredentials};
use birthday_board::runner;

/// Render upcoming Google Calendar birthdays into a static HTML page
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Path to config file (built-in defaults when omitted)
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Output HTML file, overrides the config
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,

    /// Write a sample config file to this path and exit
    #[clap(long, value_parser)]
    sample_config: Option<PathBuf>,
}

fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    info!("birthday_board v{} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();

    if let Some(path) = &args.sample_config {
        config::generate_sample_config(path)?;
        info!("Wrote sample config to {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => config::load_config(path).context("Failed to load configuration")?,
        None => AppConfig::default(),
    };
    if let Some(output) = args.output {
        config.output.path = output;
    }

    println!("Fetching birthdays...");

    let key = EnvOrFileCredentials::from_config(&config.credentials)
        .service_account_key()
        .context("Failed to load Google credentials")?;

    let client = GoogleCalendarClient::authorize(key, config.calendar.calendar_id.clone())
        .await
        .context("Failed to authorize with Google Calendar")?;

    info!("Reading calendar {}", client.calendar_id());
    runner::run_once(&client, &config, Utc::now()).await?;

    Ok(())
}
