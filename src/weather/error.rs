use crate::output::OutputError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to read location file '{0}'")]
    InputRead(PathBuf, #[source] polars::error::PolarsError),

    #[error("Location file '{path}' has {found} columns, expected {expected}")]
    InputShape {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Location file '{path}' row {row}: empty {column} cell")]
    InputCell {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("Location file '{path}' row {row}: invalid date '{value}'")]
    InputDate {
        path: PathBuf,
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode timeline response body for {0}")]
    BodyDecode(String, #[source] reqwest::Error),

    #[error("Timeline response for '{0}' is not a JSON object")]
    NotAnObject(String),

    #[error("Timeline response for '{0}' has no 'days' array")]
    MissingDays(String),

    #[error("Timeline response for '{loc}': day entry {index} is not an object")]
    MalformedDay { loc: String, index: usize },

    #[error("Failed to assemble rows for '{loc}'")]
    Frame {
        loc: String,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}
