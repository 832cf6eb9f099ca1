// ── Secret mapping ──
//
// The value is write-only: the API never returns it, so the observed bag
// leaves it out and drift detection skips it. Changing a secret means
// replacing it; there is no update.

use secrecy::SecretString;

use crate::attr::{AttributeBag, ID};
use crate::error::CoreError;
use crate::model::{Secret, SecretParams};
use crate::resource::{Operation, ResourceType};
use crate::schema::{Attribute, Schema, Shape};

use super::opt_text;

impl ResourceType for Secret {
    type Params = SecretParams;
    type Remote = Secret;

    const NAME: &'static str = "secret";
    const PATH: &'static str = "v2/engine/secret/secrets/";
    const OPERATIONS: &'static [Operation] = &[
        Operation::Create,
        Operation::Read,
        Operation::Delete,
        Operation::Import,
    ];

    fn schema() -> Schema {
        Schema::new()
            .attribute(ID, Attribute::computed(Shape::String))
            .attribute("name", Attribute::required(Shape::String))
            .attribute("description", Attribute::optional(Shape::String))
            .attribute(
                "value",
                Attribute::required(Shape::String).sensitive().write_only(),
            )
            .attribute("version", Attribute::computed(Shape::Int))
            .attribute("created_at", Attribute::computed(Shape::String))
    }

    fn to_domain(bag: &AttributeBag) -> Result<SecretParams, CoreError> {
        Ok(SecretParams {
            name: bag.string("name")?.to_owned(),
            description: opt_text(bag, "description")?,
            value: SecretString::from(bag.string("value")?.to_owned()),
        })
    }

    fn to_attribute_bag(secret: Secret) -> AttributeBag {
        let mut bag = AttributeBag::new()
            .with(ID, secret.id)
            .with("name", secret.name)
            .with("version", secret.version);
        bag.insert_opt("description", secret.description);
        bag.insert_opt("created_at", secret.created_at.map(|t| t.to_rfc3339()));
        bag
    }

    fn remote_id(secret: &Secret) -> &str {
        &secret.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn value_is_never_in_observed_state() {
        let state = Secret::to_attribute_bag(Secret {
            id: "s-1".into(),
            name: "db".into(),
            description: None,
            version: 3,
            created_at: None,
        });
        assert!(!state.contains("value"));
        assert_eq!(state.int("version").unwrap(), 3);
    }

    #[test]
    fn changed_value_is_not_drift() {
        let config = AttributeBag::new().with("name", "db").with("value", "new");
        let state = AttributeBag::new()
            .with(ID, "s-1")
            .with("name", "db")
            .with("value", "old")
            .with("version", 1);
        assert!(Secret::schema().diff(&config, &state).is_empty());
    }

    #[test]
    fn to_domain_wraps_value() {
        let bag = AttributeBag::new().with("name", "db").with("value", "hunter2");
        let params = Secret::to_domain(&bag).unwrap();
        assert_eq!(params.value.expose_secret(), "hunter2");
    }

    #[test]
    fn update_is_not_supported() {
        assert!(!Secret::supports(Operation::Update));
        assert!(Secret::supports(Operation::Import));
    }
}
