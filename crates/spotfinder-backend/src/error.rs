use thiserror::Error;

/// Errors returned by the backend client and change feed.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The insert succeeded but the backend echoed no row back.
    #[error("backend returned no row for {context}")]
    EmptyResponse { context: String },
}

/// Why the current position could not be determined.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    Denied,

    #[error("position lookup failed: {0}")]
    Lookup(#[from] BackendError),

    #[error("position provider returned an invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}
