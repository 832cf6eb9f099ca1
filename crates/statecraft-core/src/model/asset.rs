// ── Asset domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{JsonDocument, Reference};

/// Writable fields of an asset.
///
/// Updates replace the whole object, so unset optional fields are sent as
/// explicit `null` to clear them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form GeoJSON document.
    #[serde(default)]
    pub geometry: Option<JsonDocument>,
    #[serde(default)]
    pub related_assets: Vec<RelatedAsset>,
    #[serde(default)]
    pub kind: Option<Reference>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedAsset {
    pub asset_id: String,
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    pub city: String,
    pub country: String,
}

/// An asset as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(flatten)]
    pub params: AssetParams,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_optional_fields_are_sent_as_null() {
        let params = AssetParams {
            name: "Pump-1".into(),
            description: None,
            geometry: None,
            related_assets: Vec::new(),
            kind: None,
            tags: Vec::new(),
            address: None,
        };
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Pump-1",
                "description": null,
                "geometry": null,
                "related_assets": [],
                "kind": null,
                "tags": [],
                "address": null,
            })
        );
    }

    #[test]
    fn remote_asset_decodes_with_string_geometry() {
        let asset: Asset = serde_json::from_value(json!({
            "id": "abc123",
            "name": "Pump-1",
            "geometry": "{\"coordinates\":[1,2],\"type\":\"Point\"}",
            "kind": { "id": "k-7" },
            "created_at": "2024-03-01T10:00:00Z",
        }))
        .unwrap();
        assert_eq!(asset.id, "abc123");
        assert_eq!(
            asset.params.geometry.as_ref().map(JsonDocument::as_str),
            Some(r#"{"coordinates":[1,2],"type":"Point"}"#)
        );
        assert_eq!(asset.params.kind, Some(Reference::new("k-7")));
        assert!(asset.created_at.is_some());
        assert!(asset.params.related_assets.is_empty());
    }
}
