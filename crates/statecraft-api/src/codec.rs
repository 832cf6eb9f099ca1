// JSON request/response encoding.
//
// Kept next to the client so every body crossing the wire goes through the
// same error mapping.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

const PREVIEW_LEN: usize = 200;

/// Serialize a request payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(Error::Serialization)
}

/// Deserialize a response body, keeping the raw text on failure.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(PREVIEW_LEN).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

/// Deserialize a body that must be present (e.g. a GET or POST response).
pub fn decode_required<T: DeserializeOwned>(body: Option<String>) -> Result<T, Error> {
    match body {
        Some(text) => decode(&text),
        None => Err(Error::Deserialization {
            message: "expected a JSON response body, got none".into(),
            body: String::new(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[test]
    fn decode_failure_keeps_body() {
        let err = decode::<Thing>("{\"id\": 5}").unwrap_err();
        match err {
            Error::Deserialization { message, body } => {
                assert!(message.contains("body preview"));
                assert_eq!(body, "{\"id\": 5}");
            }
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[test]
    fn missing_body_is_an_error() {
        let result = decode_required::<Thing>(None);
        assert!(matches!(result, Err(Error::Deserialization { .. })));
    }

    #[test]
    fn decode_required_reads_present_body() {
        let thing: Thing = decode_required(Some("{\"id\":\"abc123\"}".into())).unwrap();
        assert_eq!(thing, Thing { id: "abc123".into() });
    }
}
