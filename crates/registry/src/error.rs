use thiserror::Error;

/// Failure modes of a single registry fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout, 408/429 or 5xx. Retried by the request policy.
    #[error("transient registry failure: {0}")]
    Transient(String),

    /// The registry holds no document under this key (404/410).
    #[error("registry has no document at {0}")]
    NotFound(String),

    /// Any other non-success status. Not retried.
    #[error("registry answered {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A 2xx whose body is not a JSON document.
    #[error("malformed document from {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error("invalid registry reference '{0}'")]
    InvalidReference(String),

    #[error("invalid request policy: {0}")]
    InvalidPolicy(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}
