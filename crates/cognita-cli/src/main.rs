//! Cognita replay tool entry point.

use std::error::Error;
use std::sync::Arc;

use cognita_cli::config::AppConfig;
use cognita_cli::flow_file::FlowDocument;
use cognita_cli::runner::{ReplayOptions, replay};
use cognita_core::clock::SystemClock;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber. Logs go to stderr so stdout carries
    // only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting Cognita replay");

    let config = AppConfig::from_env()?;
    tracing::info!(
        flow_file = %config.flow_file.display(),
        locale = %config.locale,
        seed = config.seed,
        "configuration loaded"
    );

    let document = FlowDocument::load(&config.flow_file).await?;
    let options = ReplayOptions::from(&config);
    let report = match replay(&document, &options, Arc::new(SystemClock)).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "replay failed");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
