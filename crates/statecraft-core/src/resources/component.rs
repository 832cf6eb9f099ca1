// ── Component mapping ──

use crate::attr::{AttributeBag, ID};
use crate::error::CoreError;
use crate::model::{Component, ComponentParams};
use crate::resource::{Operation, ResourceType};
use crate::schema::{Attribute, Schema, Shape};

use super::{json_attribute, json_value, opt_text};

impl ResourceType for Component {
    type Params = ComponentParams;
    type Remote = Component;

    const NAME: &'static str = "component";
    const PATH: &'static str = "v2/engine/component/components/";
    const OPERATIONS: &'static [Operation] = &[
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    fn schema() -> Schema {
        Schema::new()
            .attribute(ID, Attribute::computed(Shape::String))
            .attribute("name", Attribute::required(Shape::String))
            .attribute("asset_id", Attribute::required(Shape::String))
            .attribute("kind", Attribute::required(Shape::String))
            .attribute("config", Attribute::optional(Shape::Json))
            .attribute("unit", Attribute::optional(Shape::String))
    }

    fn to_domain(bag: &AttributeBag) -> Result<ComponentParams, CoreError> {
        Ok(ComponentParams {
            name: bag.string("name")?.to_owned(),
            asset_id: bag.string("asset_id")?.to_owned(),
            kind: bag.string("kind")?.to_owned(),
            config: json_attribute(bag, "config")?,
            unit: opt_text(bag, "unit")?,
        })
    }

    fn to_attribute_bag(component: Component) -> AttributeBag {
        let params = component.params;
        let mut bag = AttributeBag::new()
            .with(ID, component.id)
            .with("name", params.name)
            .with("asset_id", params.asset_id)
            .with("kind", params.kind);
        bag.insert_opt("config", json_value(params.config.as_ref()));
        bag.insert_opt("unit", params.unit);
        bag
    }

    fn remote_id(component: &Component) -> &str {
        &component.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_is_not_supported() {
        assert!(Component::supports(Operation::Read));
        assert!(!Component::supports(Operation::Import));
    }

    #[test]
    fn item_path_appends_id() {
        assert_eq!(
            Component::item_path("c-9"),
            "v2/engine/component/components/c-9/"
        );
    }
}
