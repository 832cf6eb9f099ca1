// ── Asset mapping ──

use crate::attr::{AttrValue, AttributeBag, ID};
use crate::error::CoreError;
use crate::model::{Address, Asset, AssetParams, Reference, RelatedAsset};
use crate::resource::ResourceType;
use crate::schema::{Attribute, Schema, Shape};

use super::{insert_items, json_attribute, json_value, nested, opt_text};

fn related_asset_schema() -> Schema {
    Schema::new()
        .attribute("asset_id", Attribute::required(Shape::String))
        .attribute("relation", Attribute::optional(Shape::String))
}

fn reference_schema() -> Schema {
    Schema::new().attribute("id", Attribute::required(Shape::String))
}

fn address_schema() -> Schema {
    Schema::new()
        .attribute("street", Attribute::optional(Shape::String))
        .attribute("city", Attribute::required(Shape::String))
        .attribute("country", Attribute::required(Shape::String))
}

impl ResourceType for Asset {
    type Params = AssetParams;
    type Remote = Asset;

    const NAME: &'static str = "asset";
    const PATH: &'static str = "v2/engine/asset/assets/";

    fn schema() -> Schema {
        Schema::new()
            .attribute(ID, Attribute::computed(Shape::String))
            .attribute("name", Attribute::required(Shape::String))
            .attribute("description", Attribute::optional(Shape::String))
            .attribute(
                "geometry",
                Attribute::optional(Shape::Json).describe("GeoJSON geometry document"),
            )
            .attribute(
                "related_assets",
                Attribute::optional(Shape::list(Shape::Object(related_asset_schema()))),
            )
            .attribute(
                "kind",
                Attribute::optional(Shape::list(Shape::Object(reference_schema())))
                    .max_items(1)
                    .describe("Asset kind reference"),
            )
            .attribute("tags", Attribute::optional(Shape::set(Shape::String)))
            .attribute(
                "address",
                Attribute::optional(Shape::list(Shape::Object(address_schema()))).max_items(1),
            )
            .attribute("created_at", Attribute::computed(Shape::String))
            .attribute("updated_at", Attribute::computed(Shape::String))
    }

    fn to_domain(bag: &AttributeBag) -> Result<AssetParams, CoreError> {
        Ok(AssetParams {
            name: bag.string("name")?.to_owned(),
            description: opt_text(bag, "description")?,
            geometry: json_attribute(bag, "geometry")?,
            related_assets: nested(bag, "related_assets", |item| {
                Ok(RelatedAsset {
                    asset_id: item.string("asset_id")?.to_owned(),
                    relation: opt_text(item, "relation")?,
                })
            })?,
            kind: bag
                .single_object("kind")?
                .map(|item| item.string("id").map(Reference::new))
                .transpose()?,
            tags: bag.string_set("tags")?,
            address: bag
                .single_object("address")?
                .map(|item| {
                    Ok::<_, CoreError>(Address {
                        street: opt_text(item, "street")?,
                        city: item.string("city")?.to_owned(),
                        country: item.string("country")?.to_owned(),
                    })
                })
                .transpose()?,
        })
    }

    fn to_attribute_bag(asset: Asset) -> AttributeBag {
        let params = asset.params;
        let mut bag = AttributeBag::new()
            .with(ID, asset.id)
            .with("name", params.name);
        bag.insert_opt("description", params.description);
        bag.insert_opt("geometry", json_value(params.geometry.as_ref()));
        insert_items(
            &mut bag,
            "related_assets",
            AttrValue::list(params.related_assets.into_iter().map(|related| {
                let mut item = AttributeBag::new().with("asset_id", related.asset_id);
                item.insert_opt("relation", related.relation);
                item
            })),
        );
        if let Some(kind) = params.kind {
            bag.insert(
                "kind",
                AttrValue::list([AttributeBag::new().with("id", kind.id)]),
            );
        }
        insert_items(&mut bag, "tags", AttrValue::set(params.tags));
        if let Some(address) = params.address {
            let mut item = AttributeBag::new();
            item.insert_opt("street", address.street);
            item.insert("city", address.city);
            item.insert("country", address.country);
            bag.insert("address", AttrValue::list([item]));
        }
        bag.insert_opt("created_at", asset.created_at.map(|t| t.to_rfc3339()));
        bag.insert_opt("updated_at", asset.updated_at.map(|t| t.to_rfc3339()));
        bag
    }

    fn remote_id(asset: &Asset) -> &str {
        &asset.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::JsonDocument;

    fn config() -> AttributeBag {
        AttributeBag::new()
            .with("name", "Pump-1")
            .with("geometry", r#"{"type":"Point","coordinates":[1,2]}"#)
            .with(
                "related_assets",
                AttrValue::list([
                    AttributeBag::new().with("asset_id", "a-2").with("relation", "feeds"),
                    AttributeBag::new().with("asset_id", "a-3"),
                ]),
            )
            .with("kind", AttrValue::list([AttributeBag::new().with("id", "k-7")]))
            .with("tags", AttrValue::set(["water", "north"]))
    }

    #[test]
    fn to_domain_maps_nested_fields() {
        let params = Asset::to_domain(&config()).unwrap();
        assert_eq!(params.name, "Pump-1");
        assert_eq!(
            params.geometry.as_ref().map(JsonDocument::as_str),
            Some(r#"{"type":"Point","coordinates":[1,2]}"#)
        );
        assert_eq!(params.related_assets.len(), 2);
        assert_eq!(params.related_assets[0].relation.as_deref(), Some("feeds"));
        assert_eq!(params.related_assets[1].relation, None);
        assert_eq!(params.kind, Some(Reference::new("k-7")));
        assert_eq!(params.tags, vec!["water".to_owned(), "north".to_owned()]);
        assert_eq!(params.address, None);
    }

    #[test]
    fn empty_kind_list_is_absent() {
        let bag = config().with("kind", AttrValue::list(Vec::<AttributeBag>::new()));
        assert_eq!(Asset::to_domain(&bag).unwrap().kind, None);
    }

    #[test]
    fn round_trip_shows_no_drift() {
        let config = config();
        let params = Asset::to_domain(&config).unwrap();
        let remote = Asset {
            id: "abc123".into(),
            params,
            created_at: None,
            updated_at: None,
        };
        let state = Asset::to_attribute_bag(remote);
        assert_eq!(state.id(), Some("abc123"));
        assert!(Asset::schema().diff(&config, &state).is_empty());
    }

    #[test]
    fn schema_accepts_config() {
        Asset::schema().validate(&config()).unwrap();
    }

    #[test]
    fn address_maps_to_single_nested_object() {
        let bag = config().with(
            "address",
            AttrValue::list([AttributeBag::new()
                .with("city", "Bergen")
                .with("country", "NO")]),
        );
        let address = Asset::to_domain(&bag).unwrap().address.unwrap();
        assert_eq!(address.city, "Bergen");
        assert_eq!(address.street, None);
    }
}
