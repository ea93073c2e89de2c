//! Error types for CardLink

use thiserror::Error;

/// Notice shown to the user when a card could not be generated
pub const FETCH_FAILED_NOTICE: &str = "Couldn't fetch link metadata";

/// Errors that can occur while fetching link metadata
#[derive(Debug, Error)]
pub enum CardError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Server did not answer in time
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Server answered with something other than 200 OK
    #[error("Bad response: status code was {0}")]
    BadStatus(u16),

    /// Response is not a document we can read metadata from
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// Page has neither og:title nor <title>
    #[error("No title found in page metadata")]
    MissingTitle,

    /// Selected text is not a link
    #[error("Not a URL: {0}")]
    NotAUrl(String),

    /// Fetcher-specific error
    #[error("Fetcher error: {0}")]
    FetcherError(String),
}

impl CardError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CardError::Timeout
        } else if err.is_connect() {
            CardError::ConnectError(err)
        } else {
            CardError::RequestError(err.to_string())
        }
    }
}
