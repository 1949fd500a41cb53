//! Error types for the upstream relay

use axum::http::StatusCode;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or relaying an upstream stream
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream answered with a non-success, non-redirect status
    #[error("Upstream rejected the request with status {status}")]
    Rejected { status: u16 },

    /// Connection-level failure reaching the upstream
    #[error("Upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Upstream connect or request timeout
    #[error("Upstream request timed out")]
    Timeout,

    /// Read failure on an already-open upstream body
    #[error("Upstream read failed: {0}")]
    Read(#[source] reqwest::Error),

    /// Redirect chain exceeded the hop bound
    #[error("Redirect limit exceeded after {hops} hops")]
    TooManyRedirects { hops: usize },

    /// Redirect response without a Location header
    #[error("Redirect response carried no Location header")]
    MissingLocation,

    /// Source URL (or a redirect target) did not parse
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client construction failed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    /// Client-visible status for this failure, valid only while no response
    /// headers have been sent yet. Timeouts map to 504, everything else
    /// upstream-shaped maps to 502.
    pub fn client_status(&self) -> StatusCode {
        match self {
            Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}
