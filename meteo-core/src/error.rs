use thiserror::Error;

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkCause {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkCause::Timeout
        } else if err.is_connect() {
            NetworkCause::Connect(err.to_string())
        } else {
            NetworkCause::Other(err.to_string())
        }
    }
}

/// Failure of a single fetch. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] NetworkCause),

    #[error("weather service returned HTTP {0}")]
    Http(u16),

    #[error("unparsable response body: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.into())
    }
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network(NetworkCause::Timeout))
    }
}
