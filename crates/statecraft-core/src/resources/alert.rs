// ── Alert mapping ──

use std::str::FromStr;

use statecraft_api::Method;

use crate::attr::{AttrValue, AttributeBag, ID};
use crate::error::CoreError;
use crate::model::{Alert, AlertParams, Operator, Severity, Threshold};
use crate::resource::ResourceType;
use crate::schema::{Attribute, Schema, Shape};

use super::{insert_items, nested, opt_text};

fn threshold_schema() -> Schema {
    Schema::new()
        .attribute("level", Attribute::required(Shape::String))
        .attribute("operator", Attribute::required(Shape::String))
        .attribute("value", Attribute::required(Shape::Float))
}

fn parse_enum<T: FromStr>(item: &AttributeBag, name: &str) -> Result<T, CoreError> {
    let raw = item.string(name)?;
    T::from_str(raw).map_err(|_| CoreError::validation(name, format!("unknown value '{raw}'")))
}

fn threshold_from_bag(item: &AttributeBag) -> Result<Threshold, CoreError> {
    Ok(Threshold {
        level: parse_enum::<Severity>(item, "level")?,
        operator: parse_enum::<Operator>(item, "operator")?,
        value: item.float("value")?,
    })
}

impl ResourceType for Alert {
    type Params = AlertParams;
    type Remote = Alert;

    const NAME: &'static str = "alert";
    const PATH: &'static str = "v2/engine/alert/alerts/";
    const UPDATE_METHOD: Method = Method::Patch;

    fn schema() -> Schema {
        Schema::new()
            .attribute(ID, Attribute::computed(Shape::String))
            .attribute("name", Attribute::required(Shape::String))
            .attribute("asset_id", Attribute::required(Shape::String))
            .attribute(
                "enabled",
                Attribute::optional_computed(Shape::Bool).describe("Defaults to true"),
            )
            .attribute("unit", Attribute::optional(Shape::String))
            .attribute(
                "thresholds",
                Attribute::optional(Shape::list(Shape::Object(threshold_schema()))),
            )
            .attribute("recipients", Attribute::optional(Shape::set(Shape::String)))
            .attribute("state", Attribute::computed(Shape::String))
    }

    fn to_domain(bag: &AttributeBag) -> Result<AlertParams, CoreError> {
        Ok(AlertParams {
            name: bag.string("name")?.to_owned(),
            asset_id: bag.string("asset_id")?.to_owned(),
            enabled: bag.opt_bool("enabled")?,
            unit: opt_text(bag, "unit")?,
            thresholds: nested(bag, "thresholds", threshold_from_bag)?,
            recipients: bag.string_set("recipients")?,
        })
    }

    fn to_attribute_bag(alert: Alert) -> AttributeBag {
        let params = alert.params;
        let mut bag = AttributeBag::new()
            .with(ID, alert.id)
            .with("name", params.name)
            .with("asset_id", params.asset_id);
        bag.insert_opt("enabled", params.enabled);
        bag.insert_opt("unit", params.unit);
        insert_items(
            &mut bag,
            "thresholds",
            AttrValue::list(params.thresholds.into_iter().map(|t| {
                AttributeBag::new()
                    .with("level", t.level.to_string())
                    .with("operator", t.operator.to_string())
                    .with("value", t.value)
            })),
        );
        insert_items(&mut bag, "recipients", AttrValue::set(params.recipients));
        bag.insert_opt("state", alert.state);
        bag
    }

    fn remote_id(alert: &Alert) -> &str {
        &alert.id
    }
}
