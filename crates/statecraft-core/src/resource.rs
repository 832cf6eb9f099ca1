// ── Resource capability trait ──
//
// Everything the reconciler needs to know about one resource type: where it
// lives, which lifecycle operations it supports, its schema, and how to map
// between an attribute bag and its domain types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use statecraft_api::Method;
use strum::{Display, EnumIter};

use crate::attr::AttributeBag;
use crate::error::CoreError;
use crate::schema::Schema;

/// A lifecycle operation a resource type may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::Import,
    ];
}

/// A remote resource type the reconciler can manage.
///
/// Implemented once per type; [`crate::Reconciler`] is written against this
/// trait only.
pub trait ResourceType {
    /// Request body for create and update.
    type Params: Serialize + Send + Sync;
    /// Response body of create, read, and update.
    type Remote: DeserializeOwned + Send;

    /// Human-readable type name used in errors and logs.
    const NAME: &'static str;
    /// Collection path relative to the API base URL, with trailing slash.
    const PATH: &'static str;
    /// Verb used for updates: `Put` (full replace) or `Patch` (partial).
    const UPDATE_METHOD: Method = Method::Put;
    /// Operations this type supports. Anything else is rejected before
    /// dispatch.
    const OPERATIONS: &'static [Operation] = &Operation::ALL;

    fn schema() -> Schema;

    /// Map a validated bag onto the request body.
    fn to_domain(bag: &AttributeBag) -> Result<Self::Params, CoreError>;

    /// Map a response onto a bag, identity and computed fields included.
    fn to_attribute_bag(remote: Self::Remote) -> AttributeBag;

    fn remote_id(remote: &Self::Remote) -> &str;

    /// Path of one object. The id is encoded as a single segment.
    fn item_path(id: &str) -> String {
        format!("{}{}/", Self::PATH, encode_segment(id))
    }

    fn supports(operation: Operation) -> bool {
        Self::OPERATIONS.contains(&operation)
    }
}

/// Percent-encode an opaque identity for use as one path segment.
///
/// `/`, `?`, `#` and `%` are all escaped. The bare segments `.` and `..`
/// survive encoding unchanged and must be rejected by the caller.
pub fn encode_segment(id: &str) -> String {
    // byte_serialize writes space as `+` and escapes a literal `+`, so every
    // remaining `+` is a space.
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn all_lists_every_operation() {
        let iterated: Vec<Operation> = Operation::iter().collect();
        assert_eq!(iterated, Operation::ALL.to_vec());
    }

    #[test]
    fn encode_segment_escapes_path_syntax() {
        assert_eq!(encode_segment("abc123"), "abc123");
        assert_eq!(
            encode_segment("../../secret/secrets/s-1"),
            "..%2F..%2Fsecret%2Fsecrets%2Fs-1"
        );
        assert_eq!(encode_segment("a?b#c%d"), "a%3Fb%23c%25d");
        assert_eq!(encode_segment("a b+c"), "a%20b%2Bc");
    }

    #[test]
    fn operation_display_is_lowercase() {
        assert_eq!(Operation::Import.to_string(), "import");
    }
}
