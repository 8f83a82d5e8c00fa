//! Propagation error types.

use crate::bag::BagState;
use thiserror::Error;

/// Failures in the propagation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    /// A resource was registered, or a flush attempted, on a bag that is no
    /// longer collecting. This is a sequencing bug in the caller.
    #[error("Propagation bag is {state:?}, expected Collecting")]
    BagClosed {
        /// State the bag was found in.
        state: BagState,
    },
}
