// ── Dashboard domain types ──

use serde::{Deserialize, Serialize};

use super::common::JsonDocument;

/// Unset optional fields are sent as `null`; updates are full replacements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardParams {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<ChartItem>,
}

/// One chart on a dashboard. Item order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartItem {
    pub title: String,
    pub chart_type: String,
    #[serde(default)]
    pub config: Option<JsonDocument>,
    #[serde(default)]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: String,
    #[serde(flatten)]
    pub params: DashboardParams,
    /// Account that created the dashboard.
    #[serde(default)]
    pub owner: Option<String>,
}
