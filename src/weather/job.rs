//! The weather pull loop: read keys, fetch and flatten each one in order,
//! mirror the accumulated rows to disk.

use crate::output::{OutputError, TsvSink};
use crate::policy::{ErrorRecord, FailurePolicy};
use crate::weather::api::TimelineClient;
use crate::weather::error::WeatherError;
use crate::weather::flatten::timeline_frame;
use crate::weather::input::{read_locations, GeoDate};
use log::{error, info, warn};
use serde_json::Value;
use std::future::Future;
use std::path::Path;

/// Two-column headerless TSV of (loc, date) pairs driving the pull.
pub const LOCATION_FILE: &str = "data/nuforc/processed/geodate.tsv";
/// Where the flattened day rows end up.
pub const OUTPUT_FILE: &str = "data/weather/raw/weather_dump.tsv";

/// What one run produced.
#[derive(Debug)]
pub struct WeatherReport {
    /// Total rows mirrored to the output file.
    pub rows: usize,
    /// Keys fetched and flattened without error, including keys whose
    /// response held no day entries.
    pub keys_ok: usize,
    /// Keys skipped under [`FailurePolicy::SkipAndRecord`], with the error
    /// that sank each one.
    pub errors: Vec<ErrorRecord<GeoDate, WeatherError>>,
}

/// Runs the whole job: load the location file, then fetch, flatten, and
/// append one key at a time under `policy`.
///
/// A malformed location file fails before any request is issued. Local I/O
/// failures while writing the output are always fatal; everything else is a
/// per-key failure handled by the policy.
pub async fn run(
    client: &TimelineClient,
    locations: &Path,
    output: &Path,
    policy: FailurePolicy,
) -> Result<WeatherReport, WeatherError> {
    let keys = read_locations(locations)?;
    info!(
        "{} location/date pairs from {}",
        keys.len(),
        locations.display()
    );
    run_keys(keys, output, policy, |key| async move {
        client.timeline(&key.loc, key.date, key.date).await
    })
    .await
}

/// The loop itself, generic over the fetch step so the policy semantics can
/// be exercised with canned responses.
pub(crate) async fn run_keys<F, Fut>(
    keys: Vec<GeoDate>,
    output: &Path,
    policy: FailurePolicy,
    mut fetch: F,
) -> Result<WeatherReport, WeatherError>
where
    F: FnMut(GeoDate) -> Fut,
    Fut: Future<Output = Result<Value, WeatherError>>,
{
    let mut sink = TsvSink::new(output);
    let mut errors: Vec<ErrorRecord<GeoDate, WeatherError>> = Vec::new();
    let mut keys_ok = 0usize;

    for (index, key) in keys.into_iter().enumerate() {
        info!("{} {}", index, key);

        let flattened = match fetch(key.clone()).await {
            Ok(payload) => timeline_frame(&key.loc, &payload),
            Err(err) => Err(err),
        };
        let frame = match flattened {
            Ok(frame) => frame,
            Err(err) => match policy {
                FailurePolicy::FailFast => return Err(err),
                FailurePolicy::SkipAndRecord => {
                    error!("skipping {}: {}", key, err);
                    errors.push(ErrorRecord { key, error: err });
                    continue;
                }
            },
        };

        if frame.height() == 0 {
            // The key fetched and flattened cleanly; the remote has no day
            // entries for it. Counted as a success, surfaced in the log.
            warn!("no day entries for {}", key);
            keys_ok += 1;
            continue;
        }

        match sink.append(frame) {
            Ok(()) => keys_ok += 1,
            Err(err @ OutputError::RowAppend(_)) => match policy {
                FailurePolicy::FailFast => return Err(err.into()),
                FailurePolicy::SkipAndRecord => {
                    error!("skipping {}: {}", key, err);
                    errors.push(ErrorRecord {
                        key,
                        error: err.into(),
                    });
                }
            },
            Err(err) => return Err(err.into()),
        }
    }

    Ok(WeatherReport {
        rows: sink.height(),
        keys_ok,
        errors,
    })
}
