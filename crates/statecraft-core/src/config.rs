// ── Provider connection configuration ──
//
// Describes how to reach the engine API. Resolved once at startup (see
// `statecraft-config`) and passed in explicitly; core never reads config
// files or environment variables itself.

use std::time::Duration;

use secrecy::SecretString;
use statecraft_api::{ApiClient, DEFAULT_CREDENTIAL_HEADER, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Everything needed to build a client for one workspace.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base URL (e.g. `https://engine.example.com/api/`).
    pub hostname: Url,
    /// Pre-formatted credential string, sent verbatim.
    pub token: SecretString,
    /// Header the credential is sent in.
    pub credential_header: String,
    pub timeout: Duration,
    pub tls: TlsMode,
}

impl ProviderConfig {
    pub fn new(hostname: Url, token: SecretString) -> Self {
        Self {
            hostname,
            token,
            credential_header: DEFAULT_CREDENTIAL_HEADER.into(),
            timeout: Duration::from_secs(30),
            tls: TlsMode::System,
        }
    }

    fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            credential_header: self.credential_header.clone(),
            ..TransportConfig::default()
        }
    }
}

/// Build the API client described by `config`.
pub fn connect(config: &ProviderConfig) -> Result<ApiClient, CoreError> {
    ApiClient::from_credential(config.hostname.as_str(), &config.token, &config.transport())
        .map_err(CoreError::from)
}
