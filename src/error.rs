use thiserror::Error;

/// Errors raised while fetching and paginating catalog pages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure (DNS, TLS, timeout, connection reset...)
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A CSS selector from the configuration could not be parsed.
    #[error("invalid {field} selector {selector:?}: {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised by the output sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Service-account credential missing, malformed or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any failure reported by the spreadsheet API.
    #[error("spreadsheet API error: {0}")]
    Api(String),
}
