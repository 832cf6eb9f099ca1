//! Structural equality for semi-structured attribute values.
//!
//! The remote API re-serializes JSON documents it stores (key order,
//! whitespace, number formatting), so a read immediately after a write can
//! return text that differs from what was configured while meaning the same
//! thing. Drift detection compares such values here instead of by string.

use std::collections::HashMap;

use serde_json::value::RawValue;

/// Whether two JSON documents are structurally equal.
///
/// Object key order and whitespace are ignored; array order is significant.
/// Numbers compare by value, so `1` and `1.0` are equal, and integers of any
/// size compare exactly. Returns `false` if either side fails to parse.
pub fn equivalent_json(a: &str, b: &str) -> bool {
    match (
        serde_json::from_str::<&RawValue>(a),
        serde_json::from_str::<&RawValue>(b),
    ) {
        (Ok(left), Ok(right)) => raw_equivalent(left.get(), right.get()),
        _ => false,
    }
}

// Operates on literal text so number literals never pass through `f64`
// before they have to.
fn raw_equivalent(a: &str, b: &str) -> bool {
    match (a.as_bytes().first(), b.as_bytes().first()) {
        (Some(b'{'), Some(b'{')) => match (members(a), members(b)) {
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|(key, x)| {
                        ys.get(key).is_some_and(|y| raw_equivalent(x.get(), y.get()))
                    })
            }
            _ => false,
        },
        (Some(b'['), Some(b'[')) => match (elements(a), elements(b)) {
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(&ys).all(|(x, y)| raw_equivalent(x.get(), y.get()))
            }
            _ => false,
        },
        (Some(b'"'), Some(b'"')) => {
            match (
                serde_json::from_str::<String>(a),
                serde_json::from_str::<String>(b),
            ) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        (Some(x), Some(y)) if is_number_start(*x) && is_number_start(*y) => {
            numbers_equivalent(a, b)
        }
        _ => a == b,
    }
}

fn members(text: &str) -> Option<HashMap<String, &RawValue>> {
    serde_json::from_str(text).ok()
}

fn elements(text: &str) -> Option<Vec<&RawValue>> {
    serde_json::from_str(text).ok()
}

fn is_number_start(byte: u8) -> bool {
    byte == b'-' || byte.is_ascii_digit()
}

fn is_integer_literal(text: &str) -> bool {
    !text.contains(['.', 'e', 'E'])
}

#[allow(clippy::float_cmp)]
fn numbers_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if is_integer_literal(a) && is_integer_literal(b) {
        // JSON integers have no leading zeros, so beyond i128 the text is
        // the value.
        return match (a.parse::<i128>(), b.parse::<i128>()) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        };
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) if x.is_finite() && y.is_finite() => x == y,
        _ => false,
    }
}

/// Map an empty configured string to "absent".
///
/// Used wherever the API distinguishes an unset field from an empty one.
pub fn nullable_string(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

/// Render a JSON document in canonical compact form (sorted keys).
///
/// Number literals are kept as written.
pub fn normalize_json(raw: &str) -> Result<String, serde_json::Error> {
    let value: &RawValue = serde_json::from_str(raw)?;
    canonical(value.get())
}

fn canonical(text: &str) -> Result<String, serde_json::Error> {
    match text.as_bytes().first() {
        Some(b'{') => {
            let map: HashMap<String, &RawValue> = serde_json::from_str(text)?;
            let mut entries: Vec<(String, &RawValue)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let fields = entries
                .into_iter()
                .map(|(key, value)| {
                    Ok(format!(
                        "{}:{}",
                        serde_json::to_string(&key)?,
                        canonical(value.get())?
                    ))
                })
                .collect::<Result<Vec<String>, serde_json::Error>>()?;
            Ok(format!("{{{}}}", fields.join(",")))
        }
        Some(b'[') => {
            let items: Vec<&RawValue> = serde_json::from_str(text)?;
            let rendered = items
                .into_iter()
                .map(|item| canonical(item.get()))
                .collect::<Result<Vec<String>, serde_json::Error>>()?;
            Ok(format!("[{}]", rendered.join(",")))
        }
        Some(b'"') => serde_json::to_string(&serde_json::from_str::<String>(text)?),
        _ => Ok(text.to_owned()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn key_order_is_ignored() {
        assert!(equivalent_json(r#"{"a":1,"b":2}"#, r#"{"b":2,"a":1}"#));
    }

    #[test]
    fn whitespace_is_ignored() {
        assert!(equivalent_json(
            r#"{"type": "Point", "coordinates": [1, 2]}"#,
            r#"{"coordinates":[1,2],"type":"Point"}"#
        ));
    }

    #[test]
    fn array_order_matters() {
        assert!(!equivalent_json("[1,2]", "[2,1]"));
    }

    #[test]
    fn parse_failure_is_not_equal() {
        assert!(!equivalent_json("{", "{}"));
        assert!(!equivalent_json("{}", "{"));
        assert!(!equivalent_json("", ""));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(equivalent_json(r#"{"x":1}"#, r#"{"x":1.0}"#));
        assert!(!equivalent_json(r#"{"x":1}"#, r#"{"x":1.5}"#));
    }

    #[test]
    fn nested_difference_is_detected() {
        assert!(!equivalent_json(
            r#"{"a":{"b":[1,{"c":true}]}}"#,
            r#"{"a":{"b":[1,{"c":false}]}}"#
        ));
    }

    #[test]
    fn extra_key_is_a_difference() {
        assert!(!equivalent_json(r#"{"a":1}"#, r#"{"a":1,"b":null}"#));
    }

    #[test]
    fn nullable_string_maps_empty_to_absent() {
        assert_eq!(nullable_string(""), None);
        assert_eq!(nullable_string("x"), Some("x".to_owned()));
    }

    #[test]
    fn normalize_sorts_keys_and_compacts() {
        let out = normalize_json("{ \"b\": [1, 2], \"a\": {\"d\": 1, \"c\": \"q\"} }").unwrap();
        assert_eq!(out, r#"{"a":{"c":"q","d":1},"b":[1,2]}"#);
    }

    #[test]
    fn large_integers_compare_exactly() {
        assert!(equivalent_json(
            r#"{"v":12345678901234567890123}"#,
            r#"{ "v": 12345678901234567890123 }"#
        ));
        assert!(!equivalent_json(
            r#"{"v":12345678901234567890123}"#,
            r#"{"v":12345678901234567890124}"#
        ));
    }

    #[test]
    fn out_of_range_literals_compare_by_text() {
        assert!(equivalent_json(r#"{"w":1e400}"#, r#"{"w": 1e400}"#));
        assert!(!equivalent_json(r#"{"w":1e400}"#, r#"{"w":2e400}"#));
    }

    #[test]
    fn escaped_strings_compare_decoded() {
        assert!(equivalent_json(r#"{"a":"\u0041"}"#, r#"{"a":"A"}"#));
    }

    #[test]
    fn normalize_keeps_number_literals() {
        let out = normalize_json(r#"{ "w": 1e400, "v": 12345678901234567890123 }"#).unwrap();
        assert_eq!(out, r#"{"v":12345678901234567890123,"w":1e400}"#);
    }

    #[test]
    fn normalize_rejects_malformed() {
        assert!(normalize_json("{\"a\":").is_err());
    }
}
