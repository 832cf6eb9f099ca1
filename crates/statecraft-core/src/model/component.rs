// ── Component domain types ──

use serde::{Deserialize, Serialize};

use super::common::JsonDocument;

/// A measurable part of an asset (sensor, valve, meter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentParams {
    pub name: String,
    pub asset_id: String,
    pub kind: String,
    #[serde(default)]
    pub config: Option<JsonDocument>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(flatten)]
    pub params: ComponentParams,
}
