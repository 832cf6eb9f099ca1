// ── Common types shared across the domain model ──

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

/// Reference to another remote object by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A free-form JSON document, kept as its literal text.
///
/// Written to the wire as an embedded JSON value with the original bytes
/// (number literals, key order) untouched. Read from either an embedded
/// value or a string containing a JSON document, since the API returns both
/// depending on the endpoint.
#[derive(Clone)]
pub struct JsonDocument(Box<RawValue>);

impl JsonDocument {
    /// Check `text` is well-formed JSON and keep it as-is.
    ///
    /// Surrounding whitespace is dropped. Numbers are not range-checked, so
    /// literals like `1e400` survive.
    pub fn parse(text: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(text.into()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for JsonDocument {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for JsonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonDocument").field(&self.as_str()).finish()
    }
}

impl Serialize for JsonDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match Value::deserialize(deserializer)? {
            Value::String(text) => match Self::parse(text.clone()) {
                Ok(doc) => return Ok(doc),
                Err(_) => Value::String(text).to_string(),
            },
            other => other.to_string(),
        };
        Self::parse(text).map_err(serde::de::Error::custom)
    }
}

/// Serialize a secret by exposing it. Only used for request bodies.
pub(crate) fn expose_secret<S: Serializer>(
    secret: &secrecy::SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use secrecy::ExposeSecret;
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc: Option<JsonDocument>,
    }

    fn doc_text(h: &Holder) -> Option<&str> {
        h.doc.as_ref().map(JsonDocument::as_str)
    }

    #[test]
    fn reads_embedded_value() {
        let h: Holder = serde_json::from_value(json!({ "doc": { "a": 1 } })).unwrap();
        assert_eq!(doc_text(&h), Some(r#"{"a":1}"#));
    }

    #[test]
    fn reads_string_encoded_value_verbatim() {
        let h: Holder =
            serde_json::from_str(r#"{ "doc": "{\"b\": 12345678901234567890123, \"a\": 1e400}" }"#)
                .unwrap();
        assert_eq!(
            doc_text(&h),
            Some(r#"{"b": 12345678901234567890123, "a": 1e400}"#)
        );
    }

    #[test]
    fn keeps_plain_strings_as_string_documents() {
        let h: Holder = serde_json::from_value(json!({ "doc": "hello" })).unwrap();
        assert_eq!(doc_text(&h), Some(r#""hello""#));
    }

    #[test]
    fn absent_and_null_are_none() {
        let h: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(h.doc, None);
        let h: Holder = serde_json::from_value(json!({ "doc": null })).unwrap();
        assert_eq!(h.doc, None);
    }

    #[test]
    fn writes_literal_text_as_embedded_value() {
        let h = Holder {
            doc: Some(JsonDocument::parse(r#"{"v":12345678901234567890123,"w":1e400}"#).unwrap()),
        };
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            r#"{"doc":{"v":12345678901234567890123,"w":1e400}}"#
        );
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(JsonDocument::parse("{\"a\":").is_err());
        assert!(JsonDocument::parse("").is_err());
    }
}
