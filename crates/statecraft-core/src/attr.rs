// ── Declarative attribute bag ──
//
// The flat, dynamically-typed representation of a resource exchanged with
// the configuration host. Values are scalars, ordered lists, unordered sets,
// or nested bags. Typed accessors return `CoreError::Validation` when a value
// has the wrong shape, so mapping code can use `?` throughout.

use std::fmt;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Attribute that carries the remote identity in every bag.
pub const ID: &str = "id";

// ── AttrValue ───────────────────────────────────────────────────────

/// A single attribute value.
///
/// `Set` keeps its elements in insertion order so enumeration is
/// deterministic, but compares without regard to order.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<AttrValue>),
    Set(Vec<AttrValue>),
    Object(AttributeBag),
}

impl AttrValue {
    /// Build a set, dropping duplicate elements.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        let mut out: Vec<AttrValue> = Vec::new();
        for item in items {
            let item = item.into();
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats accept integer values too.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&AttributeBag> {
        match self {
            Self::Object(bag) => Some(bag),
            _ => None,
        }
    }

    /// Elements of a list or set, in stored order.
    pub fn as_items(&self) -> Option<&[AttrValue]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Human-readable name of this value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
        }
    }
}

/// Order-insensitive multiset comparison.
fn same_elements(a: &[AttrValue], b: &[AttrValue]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        let hit = b
            .iter()
            .enumerate()
            .find(|(i, y)| !used.get(*i).copied().unwrap_or(true) && x == *y);
        match hit {
            Some((i, _)) => {
                if let Some(slot) = used.get_mut(i) {
                    *slot = true;
                }
                true
            }
            None => false,
        }
    })
}

impl PartialEq for AttrValue {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => same_elements(a, b),
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            other => match serde_json::to_string(other) {
                Ok(text) => f.write_str(&text),
                Err(_) => f.write_str(other.kind()),
            },
        }
    }
}

impl TryFrom<Value> for AttrValue {
    type Error = String;

    /// JSON arrays become lists; `Schema::coerce` turns them into sets
    /// where the schema says so.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err("null is not a valid attribute value".into()),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(format!("number {n} is out of range"))
                }
            }
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(map) => AttributeBag::try_from(map).map(Self::Object),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(D::Error::custom)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<AttributeBag> for AttrValue {
    fn from(bag: AttributeBag) -> Self {
        Self::Object(bag)
    }
}

// ── AttributeBag ────────────────────────────────────────────────────

/// Mapping from attribute name to value, in insertion order.
///
/// Absent attributes are simply missing; there is no null value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeBag(IndexMap<String, AttrValue>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt<V: Into<AttrValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            self.insert(name, v);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded remote identity, if non-empty.
    pub fn id(&self) -> Option<&str> {
        self.get(ID).and_then(AttrValue::as_str).filter(|s| !s.is_empty())
    }

    // ── Typed accessors ──────────────────────────────────────────────

    fn wrong_shape(name: &str, expected: &str, got: &AttrValue) -> CoreError {
        CoreError::validation(name, format!("expected {expected}, got {}", got.kind()))
    }

    fn required(&self, name: &str) -> Result<&AttrValue, CoreError> {
        self.get(name)
            .ok_or_else(|| CoreError::validation(name, "is required"))
    }

    pub fn string(&self, name: &str) -> Result<&str, CoreError> {
        let value = self.required(name)?;
        value
            .as_str()
            .ok_or_else(|| Self::wrong_shape(name, "string", value))
    }

    pub fn opt_string(&self, name: &str) -> Result<Option<&str>, CoreError> {
        self.get(name)
            .map(|v| v.as_str().ok_or_else(|| Self::wrong_shape(name, "string", v)))
            .transpose()
    }

    pub fn int(&self, name: &str) -> Result<i64, CoreError> {
        let value = self.required(name)?;
        value
            .as_i64()
            .ok_or_else(|| Self::wrong_shape(name, "int", value))
    }

    pub fn opt_int(&self, name: &str) -> Result<Option<i64>, CoreError> {
        self.get(name)
            .map(|v| v.as_i64().ok_or_else(|| Self::wrong_shape(name, "int", v)))
            .transpose()
    }

    pub fn float(&self, name: &str) -> Result<f64, CoreError> {
        let value = self.required(name)?;
        value
            .as_f64()
            .ok_or_else(|| Self::wrong_shape(name, "float", value))
    }

    pub fn opt_float(&self, name: &str) -> Result<Option<f64>, CoreError> {
        self.get(name)
            .map(|v| v.as_f64().ok_or_else(|| Self::wrong_shape(name, "float", v)))
            .transpose()
    }

    pub fn bool(&self, name: &str) -> Result<bool, CoreError> {
        let value = self.required(name)?;
        value
            .as_bool()
            .ok_or_else(|| Self::wrong_shape(name, "bool", value))
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, CoreError> {
        self.get(name)
            .map(|v| v.as_bool().ok_or_else(|| Self::wrong_shape(name, "bool", v)))
            .transpose()
    }

    /// Elements of an ordered list. Missing means empty.
    pub fn list(&self, name: &str) -> Result<&[AttrValue], CoreError> {
        match self.get(name) {
            None => Ok(&[]),
            Some(AttrValue::List(items)) => Ok(items),
            Some(other) => Err(Self::wrong_shape(name, "list", other)),
        }
    }

    /// Elements of an unordered set, in the set's enumeration order.
    ///
    /// A list is accepted too, since bags decoded from JSON carry sets as
    /// arrays until coerced.
    pub fn set(&self, name: &str) -> Result<&[AttrValue], CoreError> {
        match self.get(name) {
            None => Ok(&[]),
            Some(AttrValue::Set(items) | AttrValue::List(items)) => Ok(items),
            Some(other) => Err(Self::wrong_shape(name, "set", other)),
        }
    }

    /// A list of strings, in order.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>, CoreError> {
        Self::strings(name, self.list(name)?)
    }

    /// A set of strings, in enumeration order.
    pub fn string_set(&self, name: &str) -> Result<Vec<String>, CoreError> {
        Self::strings(name, self.set(name)?)
    }

    fn strings(name: &str, items: &[AttrValue]) -> Result<Vec<String>, CoreError> {
        items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| Self::wrong_shape(name, "string element", v))
            })
            .collect()
    }

    /// Nested bags held by a list or set attribute.
    pub fn objects(&self, name: &str) -> Result<Vec<&AttributeBag>, CoreError> {
        let items = match self.get(name) {
            None => return Ok(Vec::new()),
            Some(v) => v
                .as_items()
                .ok_or_else(|| Self::wrong_shape(name, "list of objects", v))?,
        };
        items
            .iter()
            .map(|v| {
                v.as_object()
                    .ok_or_else(|| Self::wrong_shape(name, "object element", v))
            })
            .collect()
    }

    /// An at-most-one collection of nested bags, as an optional object.
    ///
    /// Zero elements is absent, one is present, more is a validation error.
    /// A bare object is accepted as the single element.
    pub fn single_object(&self, name: &str) -> Result<Option<&AttributeBag>, CoreError> {
        if let Some(AttrValue::Object(bag)) = self.get(name) {
            return Ok(Some(bag));
        }
        let mut objects = self.objects(name)?;
        match objects.len() {
            0 => Ok(None),
            1 => Ok(objects.pop()),
            n => Err(CoreError::validation(
                name,
                format!("at most one element allowed, got {n}"),
            )),
        }
    }
}

impl TryFrom<serde_json::Map<String, Value>> for AttributeBag {
    type Error = String;

    /// Nulls are dropped: an attribute set to null is an absent attribute.
    fn try_from(map: serde_json::Map<String, Value>) -> Result<Self, Self::Error> {
        let mut bag = Self::new();
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            let value = AttrValue::try_from(value).map_err(|e| format!("{key}: {e}"))?;
            bag.0.insert(key, value);
        }
        Ok(bag)
    }
}

impl<'de> Deserialize<'de> for AttributeBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Self::try_from(map).map_err(D::Error::custom)
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample() -> AttributeBag {
        AttributeBag::new()
            .with("name", "Pump-1")
            .with("count", 3)
            .with("ratio", 0.5)
            .with("enabled", true)
            .with("tags", AttrValue::set(["b", "a"]))
            .with("order", AttrValue::list(["x", "y"]))
    }

    #[test]
    fn typed_accessors_read_values() {
        let bag = sample();
        assert_eq!(bag.string("name").unwrap(), "Pump-1");
        assert_eq!(bag.int("count").unwrap(), 3);
        assert!((bag.float("ratio").unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(bag.bool("enabled").unwrap());
        assert_eq!(bag.string_set("tags").unwrap(), vec!["b", "a"]);
        assert_eq!(bag.string_list("order").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn missing_required_is_validation_error() {
        let err = sample().string("description").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn wrong_shape_is_validation_error() {
        let err = sample().int("name").unwrap_err();
        assert!(
            matches!(err, CoreError::Validation { ref attribute, ref message }
                if attribute == "name" && message.contains("expected int, got string")),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn optional_accessors_tolerate_absence() {
        let bag = sample();
        assert_eq!(bag.opt_string("missing").unwrap(), None);
        assert_eq!(bag.opt_int("missing").unwrap(), None);
        assert!(bag.list("missing").unwrap().is_empty());
    }

    #[test]
    fn float_accepts_integer() {
        let bag = AttributeBag::new().with("value", 10);
        assert!((bag.float("value").unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sets_compare_without_order() {
        assert_eq!(AttrValue::set(["a", "b"]), AttrValue::set(["b", "a"]));
        assert_ne!(AttrValue::list(["a", "b"]), AttrValue::list(["b", "a"]));
        assert_ne!(AttrValue::set(["a", "a"]), AttrValue::set(["a", "b"]));
    }

    #[test]
    fn set_constructor_drops_duplicates() {
        let set = AttrValue::set(["a", "b", "a"]);
        assert_eq!(set.as_items().unwrap().len(), 2);
    }

    #[test]
    fn single_object_handles_zero_one_many() {
        let one = AttributeBag::new().with("id", "k1");
        let bag = AttributeBag::new()
            .with("none", AttrValue::List(vec![]))
            .with("one", AttrValue::list([one.clone()]))
            .with("two", AttrValue::list([one.clone(), one.clone()]));

        assert_eq!(bag.single_object("none").unwrap(), None);
        assert_eq!(bag.single_object("absent").unwrap(), None);
        assert_eq!(bag.single_object("one").unwrap(), Some(&one));
        assert!(bag.single_object("two").unwrap_err().is_validation());
    }

    #[test]
    fn id_ignores_empty_string() {
        assert_eq!(AttributeBag::new().with("id", "").id(), None);
        assert_eq!(AttributeBag::new().with("id", "abc").id(), Some("abc"));
    }

    #[test]
    fn deserializes_from_json_dropping_nulls() {
        let bag: AttributeBag = serde_json::from_value(json!({
            "name": "Pump-1",
            "description": null,
            "kind": [{ "id": "k1" }],
            "weight": 2.5
        }))
        .unwrap();

        assert!(!bag.contains("description"));
        assert_eq!(bag.string("name").unwrap(), "Pump-1");
        assert_eq!(
            bag.single_object("kind").unwrap().unwrap().string("id").unwrap(),
            "k1"
        );
        assert_eq!(bag.get("weight"), Some(&AttrValue::Float(2.5)));
    }

    #[test]
    fn serializes_to_plain_json() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Pump-1",
                "count": 3,
                "ratio": 0.5,
                "enabled": true,
                "tags": ["b", "a"],
                "order": ["x", "y"]
            })
        );
    }

    #[test]
    fn null_inside_list_is_rejected() {
        let result: Result<AttributeBag, _> = serde_json::from_value(json!({ "tags": ["a", null] }));
        assert!(result.is_err());
    }
}
