// Transport seam and shared HTTP client configuration.
//
// `Transport` is the only surface the reconciliation engine talks to.
// `TransportConfig` owns the reqwest builder logic (TLS, timeout, default
// headers) so every client is built the same way.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderMap;
use strum::{Display, EnumIter};

use crate::error::Error;

/// Header carrying the pre-formatted credential string by default.
pub const DEFAULT_CREDENTIAL_HEADER: &str = "Authorization";

// ── Method ──────────────────────────────────────────────────────────

/// HTTP verbs the remote API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The one status code that counts as success for this verb.
    ///
    /// POST creates (201), DELETE answers with no content (204),
    /// everything else answers 200.
    pub fn expected_status(self) -> u16 {
        match self {
            Self::Post => 201,
            Self::Delete => 204,
            Self::Get | Self::Put | Self::Patch => 200,
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

// ── Transport trait ─────────────────────────────────────────────────

/// A single request/response exchange against the remote API.
///
/// `path` is relative to the configured base URL. Returns the response body,
/// or `None` when the server sent no content. Implementations make exactly
/// one attempt: no retries, no caching.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;
}

impl<T: Transport> Transport for &T {
    fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send {
        (**self).execute(path, method, body)
    }
}

// ── Client configuration ────────────────────────────────────────────

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed test deployments).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Name of the header that carries the credential string.
    pub credential_header: String,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            credential_header: DEFAULT_CREDENTIAL_HEADER.into(),
            user_agent: concat!("statecraft/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying the given default headers.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn expected_status_per_verb() {
        let expected: Vec<(Method, u16)> = Method::iter().map(|m| (m, m.expected_status())).collect();
        assert_eq!(
            expected,
            vec![
                (Method::Get, 200),
                (Method::Post, 201),
                (Method::Put, 200),
                (Method::Patch, 200),
                (Method::Delete, 204),
            ]
        );
    }

    #[test]
    fn method_displays_as_http_verb() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
