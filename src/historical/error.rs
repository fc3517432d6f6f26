use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    Body(String, #[source] reqwest::Error),

    #[error("Failed to parse historical data response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response contains an invalid date key '{0}', expected YYYYMMDD")]
    InvalidDateKey(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Duplicate observation for {0}")]
    DuplicateDate(NaiveDate),
}
