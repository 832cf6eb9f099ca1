// ── Domain model ──
//
// Typed request and response shapes for each remote resource type. A
// `*Params` struct is what the API accepts on create and update; the
// matching remote struct is what it returns, identity and server-assigned
// fields included.

pub mod alert;
pub mod asset;
pub mod common;
pub mod component;
pub mod dashboard;
pub mod secret;

pub use alert::{Alert, AlertParams, Operator, Severity, Threshold};
pub use asset::{Address, Asset, AssetParams, RelatedAsset};
pub use common::{JsonDocument, Reference};
pub use component::{Component, ComponentParams};
pub use dashboard::{ChartItem, Dashboard, DashboardParams};
pub use secret::{Secret, SecretParams};
