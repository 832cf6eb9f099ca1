// ── Core error types ──
//
// Errors surfaced by the reconciliation engine. Transport failures from
// `statecraft-api` are translated by the `From` impl below; validation and
// capability failures originate here and are raised before any request.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote state ─────────────────────────────────────────────────
    /// The remote object does not exist.
    ///
    /// `Reconciler::read` turns this into `Observed::Absent` and
    /// `Reconciler::delete` into success; it only reaches callers from
    /// paths where absence is a real failure (import, update).
    #[error("{resource_type} not found: {identifier}")]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    /// The API answered with an unexpected status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        status: u16,
        /// Raw response text, for diagnosis.
        body: String,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The attribute bag does not satisfy the schema.
    #[error("Invalid attribute '{attribute}': {message}")]
    Validation { attribute: String, message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} on {resource_type}")]
    Unsupported {
        operation: String,
        resource_type: String,
    },

    /// Create was requested for an instance that already has an identity.
    #[error("{resource_type} already has identity {identifier}; refusing to create")]
    IdentityConflict {
        resource_type: String,
        identifier: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error reports a missing remote object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this error was raised locally, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<statecraft_api::Error> for CoreError {
    fn from(err: statecraft_api::Error) -> Self {
        match err {
            statecraft_api::Error::NotFound { path } => CoreError::NotFound {
                resource_type: "resource".into(),
                identifier: path,
            },
            statecraft_api::Error::Status { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.clone()
                },
                status,
                body,
            },
            statecraft_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        message: e.to_string(),
                    }
                } else if let Some(status) = e.status() {
                    CoreError::Api {
                        message: e.to_string(),
                        status: status.as_u16(),
                        body: String::new(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            statecraft_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            statecraft_api::Error::InvalidCredential { message } => CoreError::Config { message },
            statecraft_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            statecraft_api::Error::Serialization(e) => CoreError::Serialization {
                message: e.to_string(),
            },
            statecraft_api::Error::Deserialization { message, body: _ } => {
                CoreError::Serialization { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_becomes_api_error_with_body() {
        let err = CoreError::from(statecraft_api::Error::Status {
            status: 500,
            body: "boom".into(),
        });
        match err {
            CoreError::Api {
                message,
                status,
                body,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
                assert_eq!(body, "boom");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn not_found_stays_distinguished() {
        let err = CoreError::from(statecraft_api::Error::NotFound {
            path: "v2/engine/asset/assets/x/".into(),
        });
        assert!(err.is_not_found());
    }

    #[test]
    fn deserialization_becomes_serialization() {
        let err = CoreError::from(statecraft_api::Error::Deserialization {
            message: "expected value".into(),
            body: "{".into(),
        });
        assert!(matches!(err, CoreError::Serialization { .. }));
        assert!(!err.is_validation());
    }
}
