//! The population pull loop: one release-table page per year, reduced and
//! mirrored to disk as it accumulates.

use crate::output::{OutputError, TsvSink};
use crate::policy::{ErrorRecord, FailurePolicy};
use crate::population::error::PopulationError;
use crate::population::fred::ReleaseTables;
use crate::population::table::population_frame;
use log::{error, info, warn};
use std::future::Future;
use std::ops::RangeInclusive;
use std::path::Path;

/// Inclusive range of years the job covers.
pub const YEARS: RangeInclusive<i32> = 2000..=2020;
/// Where the (state, population, year) rows end up.
pub const OUTPUT_FILE: &str = "data/population.tsv";

/// What one run produced.
#[derive(Debug)]
pub struct PopulationReport {
    /// Total rows mirrored to the output file.
    pub rows: usize,
    /// Years fetched and reduced without error.
    pub years_ok: usize,
    /// Years skipped under [`FailurePolicy::SkipAndRecord`].
    pub errors: Vec<ErrorRecord<i32, PopulationError>>,
}

/// Runs the whole job: fetch, reduce, and append one year at a time under
/// `policy`. Local I/O failures while writing the output are always fatal;
/// everything else is a per-year failure handled by the policy.
pub async fn run(
    client: &ReleaseTables,
    years: RangeInclusive<i32>,
    output: &Path,
    policy: FailurePolicy,
) -> Result<PopulationReport, PopulationError> {
    run_years(years, output, policy, |year| client.table_page(year)).await
}

/// The loop itself, generic over the fetch step so the policy semantics can
/// be exercised with canned pages.
pub(crate) async fn run_years<I, F, Fut>(
    years: I,
    output: &Path,
    policy: FailurePolicy,
    mut fetch: F,
) -> Result<PopulationReport, PopulationError>
where
    I: IntoIterator<Item = i32>,
    F: FnMut(i32) -> Fut,
    Fut: Future<Output = Result<String, PopulationError>>,
{
    let mut sink = TsvSink::new(output);
    let mut errors: Vec<ErrorRecord<i32, PopulationError>> = Vec::new();
    let mut years_ok = 0usize;

    for year in years {
        info!("{}", year);

        let reduced = match fetch(year).await {
            Ok(page) => population_frame(&page, year),
            Err(err) => Err(err),
        };
        let frame = match reduced {
            Ok(frame) => frame,
            Err(err) => match policy {
                FailurePolicy::FailFast => return Err(err),
                FailurePolicy::SkipAndRecord => {
                    error!("skipping {}: {}", year, err);
                    errors.push(ErrorRecord { key: year, error: err });
                    continue;
                }
            },
        };

        if frame.height() == 0 {
            warn!("no table rows for {}", year);
            years_ok += 1;
            continue;
        }

        match sink.append(frame) {
            Ok(()) => years_ok += 1,
            Err(err @ OutputError::RowAppend(_)) => match policy {
                FailurePolicy::FailFast => return Err(err.into()),
                FailurePolicy::SkipAndRecord => {
                    error!("skipping {}: {}", year, err);
                    errors.push(ErrorRecord {
                        key: year,
                        error: err.into(),
                    });
                }
            },
            Err(err) => return Err(err.into()),
        }
    }

    Ok(PopulationReport {
        rows: sink.height(),
        years_ok,
        errors,
    })
}
