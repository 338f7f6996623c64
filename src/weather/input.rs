//! Reads the (location, date) pairs that drive the weather pull.

use crate::weather::error::WeatherError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;
use std::path::Path;

/// One unit of input: a locale string the API resolves (e.g. `Chicago,IL`)
/// and the day to pull. The date is used as both ends of the request window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoDate {
    pub loc: String,
    pub date: NaiveDate,
}

impl fmt::Display for GeoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.loc, self.date)
    }
}

/// Loads the two-column, tab-separated, headerless location file.
///
/// Any malformation (missing file, wrong column count, empty cell, a date
/// that is not `YYYY-MM-DD`) fails the run before any request is issued.
pub fn read_locations(path: &Path) -> Result<Vec<GeoDate>, WeatherError> {
    let read_err = |e| WeatherError::InputRead(path.to_path_buf(), e);

    let mut df = CsvReadOptions::default()
        .with_has_header(false)
        // Force every column to string; dates are validated with chrono below.
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(b'\t'))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(read_err)?
        .finish()
        .map_err(read_err)?;

    if df.width() != 2 {
        return Err(WeatherError::InputShape {
            path: path.to_path_buf(),
            expected: 2,
            found: df.width(),
        });
    }
    df.set_column_names(["loc", "date"]).map_err(read_err)?;

    let locs = df.column("loc").map_err(read_err)?.str().map_err(read_err)?;
    let dates = df.column("date").map_err(read_err)?.str().map_err(read_err)?;

    let mut keys = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let loc = locs.get(row).ok_or_else(|| WeatherError::InputCell {
            path: path.to_path_buf(),
            row,
            column: "loc",
        })?;
        let raw_date = dates.get(row).ok_or_else(|| WeatherError::InputCell {
            path: path.to_path_buf(),
            row,
            column: "date",
        })?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|source| {
            WeatherError::InputDate {
                path: path.to_path_buf(),
                row,
                value: raw_date.to_string(),
                source,
            }
        })?;
        keys.push(GeoDate {
            loc: loc.to_string(),
            date,
        });
    }
    Ok(keys)
}
