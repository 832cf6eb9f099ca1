// ── Secret domain types ──

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::common::expose_secret;

/// Writable fields of a secret. The value is only ever sent, never read.
#[derive(Debug, Serialize)]
pub struct SecretParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "expose_secret")]
    pub value: SecretString,
}

/// A secret as returned by the API: metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Incremented by the server each time the value is replaced.
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn params_serialize_exposes_value_but_debug_does_not() {
        let params = SecretParams {
            name: "db".into(),
            description: None,
            value: SecretString::from("hunter2".to_owned()),
        };
        let body = serde_json::to_string(&params).unwrap();
        assert!(body.contains("hunter2"));
        assert!(!format!("{params:?}").contains("hunter2"));
    }
}
