// ── Attribute schema ──
//
// Declares, per resource type, which attributes exist, whether the
// configuration or the server owns them, and their shape. The engine uses a
// schema three ways: to validate a bag before any request, to coerce bags
// decoded from JSON, and to compute drift between configuration and state.

use std::fmt;

use indexmap::IndexMap;
use serde_json::value::RawValue;

use crate::attr::{AttrValue, AttributeBag};
use crate::equivalence::equivalent_json;
use crate::error::CoreError;

// ── Declarations ────────────────────────────────────────────────────

/// Who supplies an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Must be configured before create.
    Required,
    /// May be configured; unset means unset.
    Optional,
    /// Assigned by the server; never configured.
    Computed,
    /// May be configured; when unset the server's value is kept.
    OptionalComputed,
}

/// Declared shape of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Int,
    Float,
    Bool,
    /// A string holding a free-form JSON document.
    Json,
    List(Box<Shape>),
    Set(Box<Shape>),
    Object(Schema),
}

impl Shape {
    pub fn list(inner: Shape) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn set(inner: Shape) -> Self {
        Self::Set(Box::new(inner))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Json => "JSON string",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub shape: Shape,
    pub mode: Mode,
    /// Upper bound on list/set length. `Some(1)` models an optional
    /// singular nested object.
    pub max_items: Option<usize>,
    /// Value is masked when changes are displayed.
    pub sensitive: bool,
    /// The API accepts the value but never returns it.
    pub write_only: bool,
    pub description: &'static str,
}

impl Attribute {
    fn new(shape: Shape, mode: Mode) -> Self {
        Self {
            shape,
            mode,
            max_items: None,
            sensitive: false,
            write_only: false,
            description: "",
        }
    }

    pub fn required(shape: Shape) -> Self {
        Self::new(shape, Mode::Required)
    }

    pub fn optional(shape: Shape) -> Self {
        Self::new(shape, Mode::Optional)
    }

    pub fn computed(shape: Shape) -> Self {
        Self::new(shape, Mode::Computed)
    }

    pub fn optional_computed(shape: Shape) -> Self {
        Self::new(shape, Mode::OptionalComputed)
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn describe(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }
}

/// The declared attributes of a resource type (or of a nested block).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: IndexMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Check a configured bag against this schema.
    ///
    /// Fails on unknown attributes, missing required attributes, configured
    /// computed attributes, shape mismatches, `max_items` overflow, and
    /// malformed JSON strings.
    pub fn validate(&self, bag: &AttributeBag) -> Result<(), CoreError> {
        self.validate_at("", bag)
    }

    fn validate_at(&self, prefix: &str, bag: &AttributeBag) -> Result<(), CoreError> {
        for name in bag.keys() {
            if !self.attributes.contains_key(name) {
                return Err(CoreError::validation(
                    join_path(prefix, name),
                    "unknown attribute",
                ));
            }
        }

        for (name, attribute) in &self.attributes {
            let path = join_path(prefix, name);
            match (attribute.mode, bag.get(name)) {
                (Mode::Required, None) => {
                    return Err(CoreError::validation(path, "is required"));
                }
                (Mode::Computed, Some(_)) => {
                    return Err(CoreError::validation(
                        path,
                        "is computed by the server and cannot be configured",
                    ));
                }
                (_, Some(value)) => check_value(&path, attribute, &attribute.shape, value)?,
                (_, None) => {}
            }
        }
        Ok(())
    }

    // ── Coercion ─────────────────────────────────────────────────────

    /// Reinterpret values decoded from JSON according to declared shapes:
    /// arrays declared as sets become sets, integers declared as floats
    /// become floats. Mismatches are left for [`Schema::validate`].
    pub fn coerce(&self, bag: &AttributeBag) -> AttributeBag {
        bag.iter()
            .map(|(name, value)| {
                let coerced = match self.get(name) {
                    Some(attribute) => coerce_value(&attribute.shape, value),
                    None => value.clone(),
                };
                (name.to_owned(), coerced)
            })
            .collect()
    }

    // ── Drift ────────────────────────────────────────────────────────

    /// Attribute-level differences between configuration and observed state.
    ///
    /// Computed and write-only attributes are never reported. An unset
    /// optional+computed attribute accepts whatever the server holds.
    /// An absent value equals an empty string or an empty collection, since
    /// empty strings are never sent to the API.
    pub fn diff(&self, config: &AttributeBag, state: &AttributeBag) -> Vec<AttributeChange> {
        let mut changes = Vec::new();

        for (name, attribute) in &self.attributes {
            if attribute.mode == Mode::Computed || attribute.write_only {
                continue;
            }

            let desired = config.get(name).filter(|v| !is_unset(v));
            let actual = state.get(name).filter(|v| !is_unset(v));

            let differs = match (desired, actual) {
                (None, None) => false,
                (None, Some(_)) => attribute.mode != Mode::OptionalComputed,
                (Some(_), None) => true,
                (Some(d), Some(a)) => !values_match(&attribute.shape, d, a),
            };

            if differs {
                changes.push(AttributeChange {
                    attribute: (*name).to_owned(),
                    before: actual.cloned(),
                    after: desired.cloned(),
                    sensitive: attribute.sensitive,
                });
            }
        }

        changes
    }

    /// Copy write-only values from configuration into an observed bag, since
    /// the server will never report them back.
    pub fn carry_write_only(&self, config: &AttributeBag, observed: &mut AttributeBag) {
        for (name, attribute) in &self.attributes {
            if !attribute.write_only {
                continue;
            }
            if let Some(value) = config.get(name) {
                observed.insert(*name, value.clone());
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn is_unset(value: &AttrValue) -> bool {
    match value {
        AttrValue::String(s) => s.is_empty(),
        other => other.as_items().is_some_and(<[AttrValue]>::is_empty),
    }
}

fn check_value(
    path: &str,
    attribute: &Attribute,
    shape: &Shape,
    value: &AttrValue,
) -> Result<(), CoreError> {
    let mismatch = || {
        CoreError::validation(
            path,
            format!("expected {}, got {}", shape.name(), value.kind()),
        )
    };

    match (shape, value) {
        (Shape::String, AttrValue::String(_))
        | (Shape::Int, AttrValue::Int(_))
        | (Shape::Float, AttrValue::Float(_) | AttrValue::Int(_))
        | (Shape::Bool, AttrValue::Bool(_)) => Ok(()),
        (Shape::Json, AttrValue::String(raw)) => serde_json::from_str::<&RawValue>(raw)
            .map(|_| ())
            .map_err(|e| CoreError::validation(path, format!("malformed JSON: {e}"))),
        (Shape::List(inner), AttrValue::List(items))
        | (Shape::Set(inner), AttrValue::Set(items) | AttrValue::List(items)) => {
            if let Some(max) = attribute.max_items {
                if items.len() > max {
                    return Err(CoreError::validation(
                        path,
                        format!("at most {max} element(s) allowed, got {}", items.len()),
                    ));
                }
            }
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                check_element(&item_path, inner, item)?;
            }
            Ok(())
        }
        (Shape::Object(schema), AttrValue::Object(bag)) => schema.validate_at(path, bag),
        _ => Err(mismatch()),
    }
}

/// Elements carry no per-element mode or bound of their own.
fn check_element(path: &str, shape: &Shape, value: &AttrValue) -> Result<(), CoreError> {
    let element = Attribute::optional(shape.clone());
    check_value(path, &element, shape, value)
}

fn coerce_value(shape: &Shape, value: &AttrValue) -> AttrValue {
    match (shape, value) {
        (Shape::Float, AttrValue::Int(_)) => value
            .as_f64()
            .map_or_else(|| value.clone(), AttrValue::Float),
        (Shape::Set(inner), AttrValue::List(items) | AttrValue::Set(items)) => {
            AttrValue::set(items.iter().map(|v| coerce_value(inner, v)))
        }
        (Shape::List(inner), AttrValue::List(items)) => {
            AttrValue::List(items.iter().map(|v| coerce_value(inner, v)).collect())
        }
        (Shape::Object(schema), AttrValue::Object(bag)) => AttrValue::Object(schema.coerce(bag)),
        _ => value.clone(),
    }
}

/// Semantic equality under a declared shape.
#[allow(clippy::float_cmp)]
fn values_match(shape: &Shape, a: &AttrValue, b: &AttrValue) -> bool {
    match shape {
        Shape::Json => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => equivalent_json(x, y),
            _ => false,
        },
        Shape::Float => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        Shape::List(inner) => match (a.as_items(), b.as_items()) {
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_match(inner, x, y))
            }
            _ => false,
        },
        Shape::Set(inner) => match (a.as_items(), b.as_items()) {
            (Some(xs), Some(ys)) => sets_match(inner, xs, ys),
            _ => false,
        },
        Shape::Object(schema) => match (a.as_object(), b.as_object()) {
            (Some(x), Some(y)) => schema.diff(x, y).is_empty(),
            _ => false,
        },
        Shape::String | Shape::Int | Shape::Bool => a == b,
    }
}

fn sets_match(inner: &Shape, xs: &[AttrValue], ys: &[AttrValue]) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut taken = vec![false; ys.len()];
    for x in xs {
        let slot = ys
            .iter()
            .enumerate()
            .position(|(i, y)| !taken.get(i).copied().unwrap_or(true) && values_match(inner, x, y));
        match slot.and_then(|i| taken.get_mut(i)) {
            Some(flag) => *flag = true,
            None => return false,
        }
    }
    true
}

// ── Changes ─────────────────────────────────────────────────────────

/// One attribute whose configured value differs from observed state.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub attribute: String,
    /// Observed value (`None` = not present remotely).
    pub before: Option<AttrValue>,
    /// Configured value (`None` = to be cleared).
    pub after: Option<AttrValue>,
    pub sensitive: bool,
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |v: &AttrValue| {
            if self.sensitive {
                "(sensitive)".to_owned()
            } else {
                v.to_string()
            }
        };
        match (&self.before, &self.after) {
            (None, Some(after)) => write!(f, "+ {} = {}", self.attribute, render(after)),
            (Some(before), None) => write!(f, "- {} = {}", self.attribute, render(before)),
            (Some(before), Some(after)) => write!(
                f,
                "~ {}: {} -> {}",
                self.attribute,
                render(before),
                render(after)
            ),
            (None, None) => write!(f, "  {}", self.attribute),
        }
    }
}
