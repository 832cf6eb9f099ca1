// ── Dashboard mapping ──

use crate::attr::{AttrValue, AttributeBag, ID};
use crate::error::CoreError;
use crate::model::{ChartItem, Dashboard, DashboardParams};
use crate::resource::ResourceType;
use crate::schema::{Attribute, Schema, Shape};

use super::{insert_items, json_attribute, json_value, nested, opt_text};

fn chart_item_schema() -> Schema {
    Schema::new()
        .attribute("title", Attribute::required(Shape::String))
        .attribute("chart_type", Attribute::required(Shape::String))
        .attribute("config", Attribute::optional(Shape::Json))
        .attribute("position", Attribute::optional(Shape::Int))
}

impl ResourceType for Dashboard {
    type Params = DashboardParams;
    type Remote = Dashboard;

    const NAME: &'static str = "dashboard";
    const PATH: &'static str = "v2/engine/dashboard/dashboards/";

    fn schema() -> Schema {
        Schema::new()
            .attribute(ID, Attribute::computed(Shape::String))
            .attribute("title", Attribute::required(Shape::String))
            .attribute("description", Attribute::optional(Shape::String))
            .attribute(
                "items",
                Attribute::optional(Shape::list(Shape::Object(chart_item_schema()))),
            )
            .attribute("owner", Attribute::computed(Shape::String))
    }

    fn to_domain(bag: &AttributeBag) -> Result<DashboardParams, CoreError> {
        Ok(DashboardParams {
            title: bag.string("title")?.to_owned(),
            description: opt_text(bag, "description")?,
            items: nested(bag, "items", |item| {
                Ok(ChartItem {
                    title: item.string("title")?.to_owned(),
                    chart_type: item.string("chart_type")?.to_owned(),
                    config: json_attribute(item, "config")?,
                    position: item.opt_int("position")?,
                })
            })?,
        })
    }

    fn to_attribute_bag(dashboard: Dashboard) -> AttributeBag {
        let params = dashboard.params;
        let mut bag = AttributeBag::new()
            .with(ID, dashboard.id)
            .with("title", params.title);
        bag.insert_opt("description", params.description);
        insert_items(
            &mut bag,
            "items",
            AttrValue::list(params.items.into_iter().map(|chart| {
                let mut item = AttributeBag::new()
                    .with("title", chart.title)
                    .with("chart_type", chart.chart_type);
                item.insert_opt("config", json_value(chart.config.as_ref()));
                item.insert_opt("position", chart.position);
                item
            })),
        );
        bag.insert_opt("owner", dashboard.owner);
        bag
    }

    fn remote_id(dashboard: &Dashboard) -> &str {
        &dashboard.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chart_items_keep_order_and_compare_config_structurally() {
        let config = AttributeBag::new().with("title", "Overview").with(
            "items",
            AttrValue::list([
                AttributeBag::new()
                    .with("title", "Pressure")
                    .with("chart_type", "line")
                    .with("config", r#"{"y": {"min": 0}, "x": "time"}"#),
                AttributeBag::new()
                    .with("title", "Flow")
                    .with("chart_type", "bar")
                    .with("position", 2),
            ]),
        );
        let params = Dashboard::to_domain(&config).unwrap();
        assert_eq!(params.items[0].title, "Pressure");
        assert_eq!(params.items[1].position, Some(2));

        let remote: Dashboard = serde_json::from_value(json!({
            "id": "d-1",
            "title": "Overview",
            "items": [
                { "title": "Pressure", "chart_type": "line",
                  "config": "{\"x\":\"time\",\"y\":{\"min\":0}}" },
                { "title": "Flow", "chart_type": "bar", "position": 2 },
            ],
            "owner": "ops",
        }))
        .unwrap();
        let state = Dashboard::to_attribute_bag(remote);
        assert_eq!(state.get("owner").and_then(AttrValue::as_str), Some("ops"));
        assert!(Dashboard::schema().diff(&config, &state).is_empty());
    }

    #[test]
    fn reordered_items_are_drift() {
        let first = AttributeBag::new().with("title", "A").with("chart_type", "line");
        let second = AttributeBag::new().with("title", "B").with("chart_type", "line");
        let config = AttributeBag::new()
            .with("title", "Overview")
            .with("items", AttrValue::list([first.clone(), second.clone()]));
        let state = AttributeBag::new()
            .with(ID, "d-1")
            .with("title", "Overview")
            .with("items", AttrValue::list([second, first]));
        let changes = Dashboard::schema().diff(&config, &state);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attribute, "items");
    }
}
