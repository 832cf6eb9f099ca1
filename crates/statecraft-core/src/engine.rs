// ── Reconciliation engine ──
//
// The CRUD lifecycle, written once against `ResourceType`. Every operation
// checks capability and validates input before touching the transport, then
// performs exactly one request. Nothing is retried: a failed create may or
// may not have taken effect remotely, and repeating it could duplicate it.

use statecraft_api::{Method, Transport, codec};
use tracing::{debug, info, warn};

use crate::attr::{AttributeBag, ID};
use crate::error::CoreError;
use crate::resource::{Operation, ResourceType};

/// Outcome of reading a resource by identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Present(AttributeBag),
    /// The remote object no longer exists. Callers should clear the
    /// recorded identity.
    Absent,
}

impl Observed {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn into_present(self) -> Option<AttributeBag> {
        match self {
            Self::Present(bag) => Some(bag),
            Self::Absent => None,
        }
    }
}

/// Drives lifecycle operations for any [`ResourceType`] over a transport.
///
/// Holds no state of its own beyond the transport, so one reconciler can
/// serve any number of resource instances concurrently.
#[derive(Debug, Clone)]
pub struct Reconciler<T> {
    transport: T,
}

impl<T: Transport> Reconciler<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    /// Create the remote object described by `config` and return the
    /// observed bag, server-assigned identity included.
    pub async fn create<R: ResourceType>(
        &self,
        config: &AttributeBag,
    ) -> Result<AttributeBag, CoreError> {
        ensure_supported::<R>(Operation::Create)?;
        if let Some(id) = config.id() {
            return Err(CoreError::IdentityConflict {
                resource_type: R::NAME.into(),
                identifier: id.to_owned(),
            });
        }
        let params = prepare::<R>(config)?;
        let body = codec::encode(&params)?;

        debug!(resource = R::NAME, "creating");
        let response = self
            .transport
            .execute(R::PATH, Method::Post, Some(body))
            .await?;
        let remote: R::Remote = codec::decode_required(response)?;

        let id = R::remote_id(&remote).to_owned();
        if id.is_empty() {
            return Err(CoreError::Serialization {
                message: format!("create {} response carried no identity", R::NAME),
            });
        }

        let mut observed = R::to_attribute_bag(remote);
        R::schema().carry_write_only(config, &mut observed);
        info!(resource = R::NAME, id = %id, "created");
        Ok(observed)
    }

    /// Fetch the current remote state. A missing object is
    /// [`Observed::Absent`], not an error.
    pub async fn read<R: ResourceType>(&self, id: &str) -> Result<Observed, CoreError> {
        ensure_supported::<R>(Operation::Read)?;
        self.fetch::<R>(id).await
    }

    /// Push `config` onto the existing object `id`, using the type's update
    /// verb, and return the observed bag.
    pub async fn update<R: ResourceType>(
        &self,
        id: &str,
        config: &AttributeBag,
    ) -> Result<AttributeBag, CoreError> {
        ensure_supported::<R>(Operation::Update)?;
        ensure_identity::<R>(id)?;
        let params = prepare::<R>(config)?;
        let body = codec::encode(&params)?;

        debug!(resource = R::NAME, id, method = %R::UPDATE_METHOD, "updating");
        let response = self
            .transport
            .execute(&R::item_path(id), R::UPDATE_METHOD, Some(body))
            .await
            .map_err(|e| not_found_as::<R>(e, id))?;
        let remote: R::Remote = codec::decode_required(response)?;

        let mut observed = R::to_attribute_bag(remote);
        R::schema().carry_write_only(config, &mut observed);
        info!(resource = R::NAME, id, "updated");
        Ok(observed)
    }

    /// Delete the object `id`. Deleting an object that is already gone
    /// succeeds.
    pub async fn delete<R: ResourceType>(&self, id: &str) -> Result<(), CoreError> {
        ensure_supported::<R>(Operation::Delete)?;
        ensure_identity::<R>(id)?;

        debug!(resource = R::NAME, id, "deleting");
        match self
            .transport
            .execute(&R::item_path(id), Method::Delete, None)
            .await
        {
            Ok(_) => {
                info!(resource = R::NAME, id, "deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!(resource = R::NAME, id, "already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the object `id` exists remotely.
    pub async fn exists<R: ResourceType>(&self, id: &str) -> Result<bool, CoreError> {
        ensure_supported::<R>(Operation::Read)?;
        Ok(!self.fetch::<R>(id).await?.is_absent())
    }

    /// Adopt an object that exists remotely but was not created here.
    ///
    /// Importing a missing object is `CoreError::NotFound`.
    pub async fn import<R: ResourceType>(&self, id: &str) -> Result<AttributeBag, CoreError> {
        ensure_supported::<R>(Operation::Import)?;
        match self.fetch::<R>(id).await? {
            Observed::Present(bag) => {
                info!(resource = R::NAME, id, "imported");
                Ok(bag)
            }
            Observed::Absent => Err(CoreError::NotFound {
                resource_type: R::NAME.into(),
                identifier: id.to_owned(),
            }),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn fetch<R: ResourceType>(&self, id: &str) -> Result<Observed, CoreError> {
        ensure_identity::<R>(id)?;

        debug!(resource = R::NAME, id, "reading");
        match self
            .transport
            .execute(&R::item_path(id), Method::Get, None)
            .await
        {
            Ok(response) => {
                let remote: R::Remote = codec::decode_required(response)?;
                Ok(Observed::Present(R::to_attribute_bag(remote)))
            }
            Err(e) if e.is_not_found() => {
                warn!(resource = R::NAME, id, "remote object is gone");
                Ok(Observed::Absent)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn ensure_supported<R: ResourceType>(operation: Operation) -> Result<(), CoreError> {
    if R::supports(operation) {
        Ok(())
    } else {
        Err(CoreError::Unsupported {
            operation: operation.to_string(),
            resource_type: R::NAME.into(),
        })
    }
}

fn ensure_identity<R: ResourceType>(id: &str) -> Result<(), CoreError> {
    match id {
        "" => Err(CoreError::validation(
            ID,
            format!("{} identity must not be empty", R::NAME),
        )),
        "." | ".." => Err(CoreError::validation(
            ID,
            format!("{} identity {id:?} is not addressable", R::NAME),
        )),
        _ => Ok(()),
    }
}

/// Configuration as it will be sent: coerced, validated, identity removed.
pub(crate) fn desired<R: ResourceType>(config: &AttributeBag) -> Result<AttributeBag, CoreError> {
    let schema = R::schema();
    let mut desired = schema.coerce(config);
    desired.remove(ID);
    schema.validate(&desired)?;
    Ok(desired)
}

fn prepare<R: ResourceType>(config: &AttributeBag) -> Result<R::Params, CoreError> {
    R::to_domain(&desired::<R>(config)?)
}

fn not_found_as<R: ResourceType>(err: statecraft_api::Error, id: &str) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            resource_type: R::NAME.into(),
            identifier: id.to_owned(),
        }
    } else {
        err.into()
    }
}
