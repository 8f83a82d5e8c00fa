//! Channel computation errors.

use cardloom_core::ResourceRef;
use thiserror::Error;

/// Failures while computing an audience.
///
/// These never abort an already-committed mutation: the dispatcher logs them
/// and degrades the affected resource to "no delivery".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// A relational linkage required to compute the audience is missing or
    /// malformed.
    #[error("Broken linkage computing audience of {resource}: {detail}")]
    DataIntegrity {
        /// Resource whose audience was being computed.
        resource: ResourceRef,
        /// What was missing.
        detail: String,
    },
}
