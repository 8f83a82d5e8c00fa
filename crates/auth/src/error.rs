//! Authorization error taxonomy.

use crate::gate::Operation;
use cardloom_core::ResourceRef;
use thiserror::Error;

/// Authorization failures, surfaced to clients as standard HTTP errors with a
/// machine-readable code in the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No principal is present and the condition is not satisfied anonymously.
    #[error("Authentication required for {operation:?} on {resource}")]
    AuthenticationRequired {
        /// Attempted operation.
        operation: Operation,
        /// Resource the operation targeted.
        resource: ResourceRef,
    },

    /// A principal is present but the condition evaluated to false.
    #[error("Forbidden: {operation:?} on {resource}")]
    Forbidden {
        /// Attempted operation.
        operation: Operation,
        /// Resource the operation targeted.
        resource: ResourceRef,
    },
}

impl AuthError {
    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired { .. } => 401,
            AuthError::Forbidden { .. } => 403,
        }
    }

    /// Machine-readable error code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired { .. } => "authentication_required",
            AuthError::Forbidden { .. } => "forbidden",
        }
    }
}
