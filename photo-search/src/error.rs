use thiserror::Error;

/// Result type for photo-search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the photo API or preparing a request.
///
/// Flows never surface these to the user directly: they are logged and collapsed into
/// a single static message per flow (see [`crate::search`] and [`crate::upload`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connection, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the selected file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input that cannot be turned into a valid request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status carried by the error, if the gateway produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_code_and_message() {
        let err = Error::Status {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Unexpected status 500: Internal Server Error");
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let err = Error::InvalidInput("bad header".to_string());
        assert_eq!(err.status(), None);

        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("I/O error"));
    }
}
