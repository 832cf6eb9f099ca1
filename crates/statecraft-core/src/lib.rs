//! Generic resource reconciliation for the engine API.
//!
//! This crate owns the lifecycle logic that brings remote objects in line
//! with declarative configuration:
//!
//! - **[`Reconciler`]**: Create, Read, Update, Delete, Exists and Import,
//!   written once against [`ResourceType`]. Validation and capability checks
//!   run before any request; a remote 404 becomes [`Observed::Absent`] on
//!   read and success on delete.
//!
//! - **[`Instance<R>`]**: One managed resource: its recorded state, its
//!   [`Phase`], and `plan` / `apply` / `refresh` / `destroy` / `import`.
//!
//! - **[`AttributeBag`] and [`Schema`]**: The flat configuration
//!   representation, its declared shape, validation, and drift detection.
//!   JSON-valued attributes compare with [`equivalent_json`].
//!
//! - **Domain model** ([`model`]): Typed request/response shapes for
//!   assets, alerts, dashboards, components and secrets, each of which
//!   implements [`ResourceType`].

pub mod attr;
pub mod config;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod instance;
pub mod logging;
pub mod model;
pub mod resource;
mod resources;
pub mod schema;

pub use attr::{AttrValue, AttributeBag};
pub use config::{ProviderConfig, connect};
pub use engine::{Observed, Reconciler};
pub use equivalence::{equivalent_json, normalize_json, nullable_string};
pub use error::CoreError;
pub use instance::{ApplyOutcome, Instance, Phase, Plan};
pub use resource::{Operation, ResourceType};
pub use schema::{Attribute, AttributeChange, Mode, Schema, Shape};

// Re-export model types at the crate root for ergonomics.
pub use model::{Alert, Asset, Component, Dashboard, JsonDocument, Secret};

pub use statecraft_api::{DEFAULT_CREDENTIAL_HEADER, TlsMode};
