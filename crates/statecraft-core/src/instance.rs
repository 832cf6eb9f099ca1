// ── Resource instance lifecycle ──
//
// Tracks one resource's recorded state and phase across lifecycle
// operations:
//
//   Absent → Creating → Present → Reading/Updating → Present → Deleting → Absent
//
// A failed operation restores the prior phase and leaves the recorded state
// untouched. The remote side is never rolled back.

use std::marker::PhantomData;

use statecraft_api::Transport;
use strum::Display;
use tracing::{info, warn};

use crate::attr::{AttributeBag, ID};
use crate::engine::{Observed, Reconciler, desired};
use crate::error::CoreError;
use crate::resource::{Operation, ResourceType};
use crate::schema::AttributeChange;

/// Where an instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Absent,
    Creating,
    Present,
    Reading,
    Updating,
    Deleting,
}

/// What `apply` would do, computed without a network call.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Create(Vec<AttributeChange>),
    Update(Vec<AttributeChange>),
    /// The type cannot be updated in place; it is deleted and re-created.
    Replace(Vec<AttributeChange>),
    NoChange,
}

impl Plan {
    pub fn changes(&self) -> &[AttributeChange] {
        match self {
            Self::Create(c) | Self::Update(c) | Self::Replace(c) => c,
            Self::NoChange => &[],
        }
    }
}

/// What `apply` did.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Created,
    Updated(Vec<AttributeChange>),
    Replaced(Vec<AttributeChange>),
    Unchanged,
}

/// One managed resource of type `R` and its recorded state.
#[derive(Debug, Clone)]
pub struct Instance<R> {
    phase: Phase,
    state: Option<AttributeBag>,
    _type: PhantomData<fn() -> R>,
}

impl<R: ResourceType> Default for Instance<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceType> Instance<R> {
    /// An instance with nothing recorded.
    pub fn new() -> Self {
        Self {
            phase: Phase::Absent,
            state: None,
            _type: PhantomData,
        }
    }

    /// Resume from previously recorded state. A bag without an identity is
    /// treated as nothing recorded.
    pub fn from_state(state: AttributeBag) -> Self {
        if state.id().is_some() {
            Self {
                phase: Phase::Present,
                state: Some(state),
                _type: PhantomData,
            }
        } else {
            Self::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&AttributeBag> {
        self.state.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.state.as_ref().and_then(AttributeBag::id)
    }

    // ── Planning ─────────────────────────────────────────────────────

    /// Changes `apply(config)` would make against the recorded state.
    ///
    /// Validates `config` but performs no request; drift made out of band
    /// only shows up after [`Instance::refresh`].
    pub fn plan(&self, config: &AttributeBag) -> Result<Plan, CoreError> {
        let schema = R::schema();
        let desired = desired::<R>(config)?;
        let Some(state) = self.state.as_ref() else {
            return Ok(Plan::Create(schema.diff(&desired, &AttributeBag::new())));
        };

        let changes = schema.diff(&desired, state);
        if changes.is_empty() {
            Ok(Plan::NoChange)
        } else if R::supports(Operation::Update) {
            Ok(Plan::Update(changes))
        } else {
            Ok(Plan::Replace(changes))
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Bring the remote object in line with `config`.
    pub async fn apply<T: Transport>(
        &mut self,
        reconciler: &Reconciler<T>,
        config: &AttributeBag,
    ) -> Result<ApplyOutcome, CoreError> {
        let desired = desired::<R>(config)?;
        match self.plan(config)? {
            Plan::NoChange => Ok(ApplyOutcome::Unchanged),
            Plan::Create(_) => {
                self.create(reconciler, &desired).await?;
                Ok(ApplyOutcome::Created)
            }
            Plan::Update(changes) => {
                let id = self.require_id()?;
                let prior = self.enter(Phase::Updating);
                let result = reconciler.update::<R>(&id, &desired).await;
                let observed = self.settle(prior, result)?;
                self.record(observed);
                Ok(ApplyOutcome::Updated(changes))
            }
            Plan::Replace(changes) => {
                info!(resource = R::NAME, id = ?self.id(), "replacing");
                self.destroy(reconciler).await?;
                self.create(reconciler, &desired).await?;
                Ok(ApplyOutcome::Replaced(changes))
            }
        }
    }

    /// Re-read the remote object. Returns `false` and clears the recorded
    /// state if it no longer exists.
    pub async fn refresh<T: Transport>(
        &mut self,
        reconciler: &Reconciler<T>,
    ) -> Result<bool, CoreError> {
        let Some(id) = self.id().map(str::to_owned) else {
            return Ok(false);
        };

        let prior = self.enter(Phase::Reading);
        let result = reconciler.read::<R>(&id).await;
        match self.settle(prior, result)? {
            Observed::Present(mut observed) => {
                if let Some(previous) = self.state.as_ref() {
                    R::schema().carry_write_only(previous, &mut observed);
                }
                self.record(observed);
                Ok(true)
            }
            Observed::Absent => {
                warn!(resource = R::NAME, id = %id, "deleted out of band; forgetting");
                self.clear();
                Ok(false)
            }
        }
    }

    /// Delete the remote object and clear the recorded state. A no-op when
    /// nothing is recorded.
    pub async fn destroy<T: Transport>(
        &mut self,
        reconciler: &Reconciler<T>,
    ) -> Result<(), CoreError> {
        let Some(id) = self.id().map(str::to_owned) else {
            return Ok(());
        };

        let prior = self.enter(Phase::Deleting);
        let result = reconciler.delete::<R>(&id).await;
        self.settle(prior, result)?;
        self.clear();
        Ok(())
    }

    /// Seed the recorded state from an existing remote object.
    pub async fn import<T: Transport>(
        &mut self,
        reconciler: &Reconciler<T>,
        id: &str,
    ) -> Result<(), CoreError> {
        if let Some(existing) = self.id() {
            return Err(CoreError::IdentityConflict {
                resource_type: R::NAME.into(),
                identifier: existing.to_owned(),
            });
        }

        let prior = self.enter(Phase::Reading);
        let result = reconciler.import::<R>(id).await;
        let observed = self.settle(prior, result)?;
        self.record(observed);
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn create<T: Transport>(
        &mut self,
        reconciler: &Reconciler<T>,
        desired: &AttributeBag,
    ) -> Result<(), CoreError> {
        let prior = self.enter(Phase::Creating);
        let result = reconciler.create::<R>(desired).await;
        let observed = self.settle(prior, result)?;
        self.record(observed);
        Ok(())
    }

    fn require_id(&self) -> Result<String, CoreError> {
        self.id()
            .map(str::to_owned)
            .ok_or_else(|| CoreError::validation(ID, "no identity recorded"))
    }

    fn enter(&mut self, phase: Phase) -> Phase {
        std::mem::replace(&mut self.phase, phase)
    }

    fn settle<T>(&mut self, prior: Phase, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if result.is_err() {
            self.phase = prior;
        }
        result
    }

    fn record(&mut self, observed: AttributeBag) {
        self.state = Some(observed);
        self.phase = Phase::Present;
    }

    fn clear(&mut self) {
        self.state = None;
        self.phase = Phase::Absent;
    }
}
