//! Commit-time dispatch of collected changes.

use crate::bag::PropagationBag;
use crate::cluster::ClusterBus;
use crate::error::PropagationError;
use crate::message::UpdateBatch;
use cardloom_channels::{Channel, ChannelComputer};
use cardloom_core::{RelationSnapshot, ResourceRef};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Turns a committed propagation bag into per-channel cluster events.
///
/// Runs strictly after commit: a broken reference chain can no longer abort
/// the mutation, so audience-computation failures degrade the affected entry
/// to "no delivery" and are logged.
#[derive(Debug, Default)]
pub struct Dispatcher {
    computer: ChannelComputer,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new() -> Self {
        Self {
            computer: ChannelComputer::new(),
        }
    }

    /// Flush a bag: compute audiences, group per channel, publish one event
    /// per affected channel. Returns the number of channels notified.
    ///
    /// The bag transitions to `Flushed`; flushing twice is a sequencing bug
    /// and fails with [`PropagationError::BagClosed`].
    pub fn flush(
        &self,
        bag: &mut PropagationBag,
        snapshot: &dyn RelationSnapshot,
        bus: &ClusterBus,
    ) -> Result<usize, PropagationError> {
        bag.ensure_collecting()?;

        let mut grouped: BTreeMap<Channel, UpdateBatch> = BTreeMap::new();

        for (resource, dto) in bag.updated() {
            for channel in self.audience_of(*resource, snapshot) {
                grouped.entry(channel).or_default().updated.push(dto.clone());
            }
        }
        for (resource, deleted) in bag.deleted() {
            for channel in self.audience_of(*resource, snapshot) {
                grouped
                    .entry(channel)
                    .or_default()
                    .deleted
                    .push(deleted.clone());
            }
        }

        let channels = grouped.len();
        for (channel, batch) in grouped {
            debug!(%channel, updated = batch.updated.len(), deleted = batch.deleted.len(), "publishing batch");
            bus.publish(&channel, batch);
        }

        bag.mark_flushed();
        Ok(channels)
    }

    fn audience_of(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
    ) -> Vec<Channel> {
        match self.computer.compute(resource, snapshot) {
            Ok(audience) => audience.into_iter().collect(),
            Err(e) => {
                // The mutation is already committed; degrade to no delivery.
                warn!(%resource, error = %e, "audience computation failed, skipping delivery");
                Vec::new()
            }
        }
    }
}
