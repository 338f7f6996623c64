use anyhow::{Context, Result};
use log::{info, warn};
use nuforc_enrich::{weather, FailurePolicy, TimelineClient};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let key = std::env::var("VIRTUAL_CROSSING_KEY")
        .context("VIRTUAL_CROSSING_KEY is not set")?;
    let client = TimelineClient::builder().key(key).build();

    let report = weather::job::run(
        &client,
        Path::new(weather::job::LOCATION_FILE),
        Path::new(weather::job::OUTPUT_FILE),
        FailurePolicy::SkipAndRecord,
    )
    .await?;

    info!(
        "{} rows written to {} ({} keys ok)",
        report.rows,
        weather::job::OUTPUT_FILE,
        report.keys_ok
    );
    for record in &report.errors {
        warn!("skipped {}", record);
    }
    Ok(())
}
