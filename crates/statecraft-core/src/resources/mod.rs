// ── Resource type instantiations ──
//
// One `ResourceType` impl per remote type. The shared helpers here cover the
// field conversions every type repeats: free-form JSON attributes, nullable
// strings, and nested reference lists.

mod alert;
mod asset;
mod component;
mod dashboard;
mod secret;

use crate::attr::{AttrValue, AttributeBag};
use crate::equivalence::nullable_string;
use crate::error::CoreError;
use crate::model::JsonDocument;

/// A JSON-typed attribute. The configured text goes on the wire verbatim.
pub(crate) fn json_attribute(
    bag: &AttributeBag,
    name: &str,
) -> Result<Option<JsonDocument>, CoreError> {
    match bag.opt_string(name)?.and_then(nullable_string) {
        None => Ok(None),
        Some(raw) => JsonDocument::parse(raw)
            .map(Some)
            .map_err(|e| CoreError::validation(name, format!("malformed JSON: {e}"))),
    }
}

/// Render a server-returned document back into a JSON-typed attribute.
pub(crate) fn json_value(doc: Option<&JsonDocument>) -> Option<AttrValue> {
    doc.map(|d| AttrValue::String(d.as_str().to_owned()))
}

/// An optional string attribute, with `""` meaning unset.
pub(crate) fn opt_text(bag: &AttributeBag, name: &str) -> Result<Option<String>, CoreError> {
    Ok(bag.opt_string(name)?.and_then(nullable_string))
}

/// Map each nested bag of a list attribute through `f`, keeping order.
pub(crate) fn nested<T>(
    bag: &AttributeBag,
    name: &str,
    f: impl Fn(&AttributeBag) -> Result<T, CoreError>,
) -> Result<Vec<T>, CoreError> {
    bag.objects(name)?.into_iter().map(f).collect()
}

/// Insert a collection attribute only when it has elements.
pub(crate) fn insert_items(bag: &mut AttributeBag, name: &str, value: AttrValue) {
    if value.as_items().is_some_and(|items| !items.is_empty()) {
        bag.insert(name, value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_attribute_keeps_configured_text() {
        let raw = r#"{"b": [1, 2], "a": 12345678901234567890123, "w": 1e400}"#;
        let bag = AttributeBag::new().with("config", raw);
        let doc = json_attribute(&bag, "config").unwrap().unwrap();
        assert_eq!(doc.as_str(), raw);
    }

    #[test]
    fn json_attribute_empty_is_absent() {
        let bag = AttributeBag::new().with("config", "");
        assert_eq!(json_attribute(&bag, "config").unwrap(), None);
        assert_eq!(json_attribute(&AttributeBag::new(), "config").unwrap(), None);
    }

    #[test]
    fn json_attribute_malformed_is_validation_error() {
        let bag = AttributeBag::new().with("config", "{\"a\":");
        let err = json_attribute(&bag, "config").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn insert_items_skips_empty_collections() {
        let mut bag = AttributeBag::new();
        insert_items(&mut bag, "tags", AttrValue::set(Vec::<String>::new()));
        assert!(!bag.contains("tags"));
        insert_items(&mut bag, "tags", AttrValue::set(["a"]));
        assert!(bag.contains("tags"));
    }
}
