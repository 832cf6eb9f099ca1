// Async HTTP client for the remote engine API.
//
// Auth: a single header carrying a pre-formatted credential string.
// Bodies: JSON in both directions.
// Success: exactly one status per verb (see `Method::expected_status`).

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{Method, Transport, TransportConfig};

/// Async client for the engine REST API.
///
/// Stateless apart from the underlying connection pool: every
/// [`Transport::execute`] call is a single request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, a credential string, and a transport config.
    ///
    /// The credential is injected as a sensitive default header on every
    /// request, under `transport.credential_header`.
    pub fn from_credential(
        base_url: &str,
        credential: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let name = HeaderName::from_bytes(transport.credential_header.as_bytes()).map_err(|e| {
            Error::InvalidCredential {
                message: format!("invalid credential header name: {e}"),
            }
        })?;
        let mut value = HeaderValue::from_str(credential.expose_secret()).map_err(|e| {
            Error::InvalidCredential {
                message: format!("invalid credential header value: {e}"),
            }
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends in `/` so relative joins append rather
    /// than replace the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"v2/engine/asset/assets/"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(
        method: Method,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<Option<String>, Error> {
        let status = resp.status().as_u16();

        if status == method.expected_status() {
            let body = resp.text().await?;
            return Ok(if body.is_empty() { None } else { Some(body) });
        }

        debug!(%method, path, status, "unexpected status");

        if status == 404 {
            return Err(Error::NotFound {
                path: path.to_owned(),
            });
        }

        let body = error_body(resp.text().await);
        Err(Error::Status { status, body })
    }
}

/// Body text of a failed request. A body that cannot be read still yields
/// a status error, with the read failure as its text.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| {
        debug!(error = %e, "failed to read error response body");
        format!("<unreadable response body: {e}>")
    })
}

impl Transport for ApiClient {
    async fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
    ) -> Result<Option<String>, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut request = self.http.request(method.to_reqwest(), url);
        if let Some(payload) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload);
        }

        let resp = request.send().await?;
        Self::handle_response(method, path, resp).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            ApiClient::from_reqwest("https://engine.example.com/api", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://engine.example.com/api/");
    }

    #[test]
    fn relative_paths_append_to_base() {
        let client =
            ApiClient::from_reqwest("https://engine.example.com/api/", reqwest::Client::new())
                .unwrap();
        let url = client.url("/v2/engine/asset/assets/abc/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://engine.example.com/api/v2/engine/asset/assets/abc/"
        );
    }

    #[test]
    fn unreadable_error_body_is_reported() {
        assert_eq!(error_body::<String>(Ok("boom".into())), "boom");
        let body = error_body(Err("connection reset"));
        assert_eq!(body, "<unreadable response body: connection reset>");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ApiClient::from_reqwest("not a url", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn header_value_with_newline_is_rejected() {
        let secret = SecretString::from("Token abc\ndef".to_owned());
        let result = ApiClient::from_credential(
            "https://engine.example.com",
            &secret,
            &TransportConfig::default(),
        );
        assert!(matches!(result, Err(Error::InvalidCredential { .. })));
    }
}
