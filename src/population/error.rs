use crate::output::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read release table page body for {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Release table page for {year} contains no table")]
    NoTable { year: i32 },

    #[error("Release table for {year} has no '{column}' column")]
    MissingColumn { year: i32, column: String },

    #[error("Failed to assemble rows for {year}")]
    Frame {
        year: i32,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}
