use anyhow::Result;
use log::info;
use nuforc_enrich::{population, FailurePolicy, ReleaseTables};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = ReleaseTables::builder().build();

    let report = population::job::run(
        &client,
        population::job::YEARS,
        Path::new(population::job::OUTPUT_FILE),
        FailurePolicy::FailFast,
    )
    .await?;

    info!(
        "{} rows written to {} ({} years ok)",
        report.rows,
        population::job::OUTPUT_FILE,
        report.years_ok
    );
    Ok(())
}
