use thiserror::Error;

/// Top-level error type for the `statecraft-api` crate.
///
/// Every failure a single request can produce: transport, status contract,
/// and JSON encoding. `statecraft-core` maps these into reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Status contract ─────────────────────────────────────────────
    /// The server answered 404 for this path.
    ///
    /// Kept apart from [`Error::Status`] so callers can treat a vanished
    /// resource as deleted rather than failed.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Any status other than the one the verb expects (and other than 404).
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or joining error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The credential string cannot be used as a header value.
    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the request never got an answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished() {
        let err = Error::NotFound {
            path: "v2/engine/asset/assets/abc/".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn status_error_keeps_code_and_body() {
        let err = Error::Status {
            status: 409,
            body: "name already taken".into(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "Unexpected HTTP status 409: name already taken"
        );
    }
}
