//! Per-unit-of-work accumulator of pending change notifications.

use crate::error::PropagationError;
use cardloom_core::ResourceRef;
use cardloom_domain::{DeletedRef, ResourceDto};
use std::collections::BTreeMap;

/// Lifecycle of a propagation bag.
///
/// `Collecting → Flushed` on successful commit, `Collecting → Discarded` on
/// rollback. A closed bag accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagState {
    /// Accepting registrations.
    Collecting,
    /// Flushed by the dispatcher after commit.
    Flushed,
    /// Dropped on rollback; nothing was or will be emitted.
    Discarded,
}

/// Accumulates the resources touched by one unit of work.
///
/// Registration is idempotent per resource: touching the same resource twice
/// keeps the final state. A deletion supersedes earlier updates of the same
/// resource; an update after a deletion (delete and re-insert within one
/// transaction) supersedes the deletion.
#[derive(Debug)]
pub struct PropagationBag {
    state: BagState,
    updated: BTreeMap<ResourceRef, ResourceDto>,
    deleted: BTreeMap<ResourceRef, DeletedRef>,
}

impl PropagationBag {
    /// Fresh, collecting bag.
    pub fn new() -> Self {
        Self {
            state: BagState::Collecting,
            updated: BTreeMap::new(),
            deleted: BTreeMap::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BagState {
        self.state
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Updated resources, keyed by reference.
    pub fn updated(&self) -> impl Iterator<Item = (&ResourceRef, &ResourceDto)> {
        self.updated.iter()
    }

    /// Deleted resources, keyed by reference.
    pub fn deleted(&self) -> impl Iterator<Item = (&ResourceRef, &DeletedRef)> {
        self.deleted.iter()
    }

    /// Record a created or updated resource.
    pub fn register_updated(&mut self, dto: ResourceDto) -> Result<(), PropagationError> {
        self.ensure_collecting()?;
        let resource = dto.reference();
        self.deleted.remove(&resource);
        self.updated.insert(resource, dto);
        Ok(())
    }

    /// Record a deleted resource.
    pub fn register_deleted(&mut self, resource: ResourceRef) -> Result<(), PropagationError> {
        self.ensure_collecting()?;
        self.updated.remove(&resource);
        self.deleted.insert(resource, DeletedRef::of(resource));
        Ok(())
    }

    /// Close the bag after a successful flush.
    pub(crate) fn mark_flushed(&mut self) {
        self.state = BagState::Flushed;
    }

    /// Drop everything; called on rollback. No message referencing any bag
    /// entry will ever be emitted.
    pub fn discard(&mut self) {
        self.state = BagState::Discarded;
        self.updated.clear();
        self.deleted.clear();
    }

    pub(crate) fn ensure_collecting(&self) -> Result<(), PropagationError> {
        match self.state {
            BagState::Collecting => Ok(()),
            state => Err(PropagationError::BagClosed { state }),
        }
    }
}

impl Default for PropagationBag {
    fn default() -> Self {
        Self::new()
    }
}
