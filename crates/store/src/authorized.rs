//! The authorized repository wrapper and its unit of work.

use crate::error::StoreError;
use crate::storage::Storage;
use cardloom_auth::{AuthorizationGate, Operation, RequestContext};
use cardloom_core::{RelationSnapshot, ResourceRef};
use cardloom_domain::Resource;
use cardloom_propagation::{ClusterBus, Dispatcher, PropagationBag, PropagationError};
use tracing::debug;

/// One request-scoped transaction: the request context plus the propagation
/// bag collecting its changes.
///
/// Commit flushes the bag through the dispatcher exactly once; discard drops
/// it. An aborted request simply never commits: no compensation needed, no
/// message referencing its changes is ever emitted.
#[derive(Debug)]
pub struct UnitOfWork {
    ctx: RequestContext,
    bag: PropagationBag,
}

impl UnitOfWork {
    /// Begin a unit of work for the given request context.
    pub fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            bag: PropagationBag::new(),
        }
    }

    /// The request context driving authorization.
    pub fn ctx(&self) -> &RequestContext {
        &self.ctx
    }

    /// The collected changes.
    pub fn bag(&self) -> &PropagationBag {
        &self.bag
    }

    /// Commit: flush the collected changes cluster-wide. Returns the number
    /// of channels notified.
    pub fn commit(
        &mut self,
        dispatcher: &Dispatcher,
        snapshot: &dyn RelationSnapshot,
        bus: &ClusterBus,
    ) -> Result<usize, PropagationError> {
        dispatcher.flush(&mut self.bag, snapshot, bus)
    }

    /// Roll back: drop the bag, emit nothing.
    pub fn discard(&mut self) {
        self.bag.discard();
    }
}

/// Repository wrapper performing gate → storage → bag for every mutation.
#[derive(Debug)]
pub struct AuthorizedStore<S: Storage> {
    storage: S,
    gate: AuthorizationGate,
}

impl<S: Storage> AuthorizedStore<S> {
    /// Wrap a storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            gate: AuthorizationGate::new(),
        }
    }

    /// The wrapped backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load a resource, asserting read access on it.
    ///
    /// The resource is fetched first because its condition trees are
    /// parameterized per instance; a denied read never leaks the instance.
    pub fn load(
        &self,
        resource: ResourceRef,
        uow: &UnitOfWork,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<Option<Box<dyn Resource>>, StoreError> {
        let Some(loaded) = self.storage.fetch(resource)? else {
            return Ok(None);
        };
        self.gate.assert(
            Operation::Read,
            resource,
            &loaded.conditions(),
            uow.ctx(),
            snapshot,
        )?;
        Ok(Some(loaded))
    }

    /// Create a resource: assert, persist, register.
    pub fn insert(
        &mut self,
        resource: &dyn Resource,
        uow: &mut UnitOfWork,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<(), StoreError> {
        self.gate.assert(
            Operation::Create,
            resource.reference(),
            &resource.conditions(),
            uow.ctx(),
            snapshot,
        )?;
        self.storage.insert(resource)?;
        uow.bag.register_updated(resource.to_dto())?;
        debug!(resource = %resource.reference(), "inserted");
        Ok(())
    }

    /// Update a resource: assert, persist, register.
    pub fn update(
        &mut self,
        resource: &dyn Resource,
        uow: &mut UnitOfWork,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<(), StoreError> {
        self.gate.assert(
            Operation::Update,
            resource.reference(),
            &resource.conditions(),
            uow.ctx(),
            snapshot,
        )?;
        self.storage.update(resource)?;
        uow.bag.register_updated(resource.to_dto())?;
        debug!(resource = %resource.reference(), "updated");
        Ok(())
    }

    /// Delete a resource: assert, remove, register the reference.
    pub fn delete(
        &mut self,
        resource: &dyn Resource,
        uow: &mut UnitOfWork,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<(), StoreError> {
        let reference = resource.reference();
        self.gate.assert(
            Operation::Delete,
            reference,
            &resource.conditions(),
            uow.ctx(),
            snapshot,
        )?;
        self.storage.remove(reference)?;
        uow.bag.register_deleted(reference)?;
        debug!(resource = %reference, "deleted");
        Ok(())
    }

    /// Register an ephemeral resource (presence) without persisting it.
    ///
    /// Asserts update access, then feeds the bag directly: the indicator is
    /// propagated to the project channel but never stored or replayed.
    pub fn announce(
        &self,
        resource: &dyn Resource,
        uow: &mut UnitOfWork,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<(), StoreError> {
        self.gate.assert(
            Operation::Update,
            resource.reference(),
            &resource.conditions(),
            uow.ctx(),
            snapshot,
        )?;
        uow.bag.register_updated(resource.to_dto())?;
        Ok(())
    }
}
