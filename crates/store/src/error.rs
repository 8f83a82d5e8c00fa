//! Store error taxonomy.

use cardloom_auth::AuthError;
use cardloom_propagation::PropagationError;
use crate::storage::StorageError;
use thiserror::Error;

/// Anything that can fail while driving an authorized mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The gate denied the operation; nothing was persisted or registered.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Propagation sequencing bug (bag already closed).
    #[error(transparent)]
    Propagation(#[from] PropagationError),
}
