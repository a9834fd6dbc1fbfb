//! Error types for RepoMedic core.

use std::{error::Error, fmt, io};

/// Error type for RepoMedic core operations.
#[derive(Debug)]
pub enum RepoMedicError {
    /// An underlying I/O error.
    Io(io::Error),
    /// The HTTP transport failed before a response was received.
    Http(reqwest::Error),
    /// A remote service answered with a non-success status.
    Api {
        /// Name of the remote service (e.g. "github").
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },
    /// A payload could not be decoded.
    Decode(serde_json::Error),
    /// The URL does not point at a GitHub repository.
    InvalidUrl(String),
    /// Required configuration is missing or malformed.
    Config(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for RepoMedicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Api {
                service,
                status,
                body,
            } => write!(f, "{service} api error ({status}): {body}"),
            Self::Decode(err) => write!(f, "decode error: {err}"),
            Self::InvalidUrl(url) => write!(f, "invalid GitHub URL: {url}"),
            Self::Config(message) => write!(f, "configuration error: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for RepoMedicError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RepoMedicError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<reqwest::Error> for RepoMedicError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for RepoMedicError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Convenience result type for RepoMedic core.
pub type Result<T> = std::result::Result<T, RepoMedicError>;

/// Turn a non-success HTTP response into [`RepoMedicError::Api`].
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepoMedicError::Api {
        service,
        status: status.as_u16(),
        body,
    })
}
