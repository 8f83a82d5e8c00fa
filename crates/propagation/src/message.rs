//! The per-channel update batch.

use cardloom_domain::{DeletedRef, ResourceDto};
use serde::{Deserialize, Serialize};

/// Everything one channel must hear about one committed unit of work.
///
/// Serialized to clients inside the `WsUpdateMessage` frame and carried
/// verbatim on the cluster bus, so remote nodes deliver without touching
/// storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateBatch {
    /// Resources created or updated, as polymorphic DTOs.
    pub updated: Vec<ResourceDto>,
    /// Resources deleted, as `{"@class", "id"}` references.
    pub deleted: Vec<DeletedRef>,
}

impl UpdateBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the batch carries nothing.
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }
}
