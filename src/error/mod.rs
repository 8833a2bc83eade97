use thiserror::Error;

/// Failure to fetch a page. Surfaced to the caller unchanged; nothing in this
/// crate retries.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error fetching {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    /// Classify a transport error, separating timeouts from other failures.
    pub fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout { url: url.into() }
        } else {
            FetchError::Network {
                url: url.into(),
                source: e,
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// The URL the failed request was made for, when one was known.
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Network { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. } => Some(url),
            FetchError::Client(_) => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

pub type FetchResult<T> = Result<T, FetchError>;
