//! The fail-closed authorization gate.
//!
//! Every lifecycle event of a resource (load, insert, update, delete) must
//! pass through [`AuthorizationGate::assert`] exactly once. The check is
//! idempotent, so a duplicated call is harmless; an omitted call is a
//! security defect. The repository wrapper in `cardloom-store` makes the
//! sequencing explicit in source.

use crate::condition::ResourceConditions;
use crate::context::RequestContext;
use crate::error::AuthError;
use crate::evaluator::evaluate;
use cardloom_core::{RelationSnapshot, ResourceRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resource lifecycle operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Creating a new resource instance.
    Create,
    /// Reading an existing resource.
    Read,
    /// Updating an existing resource.
    Update,
    /// Deleting an existing resource.
    Delete,
}

/// Wraps condition evaluation with the fail-closed error taxonomy.
#[derive(Debug, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Create a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Assert that the context may perform `operation` on the resource
    /// guarded by `conditions`.
    ///
    /// On a false condition the failure is classified: no principal means the
    /// caller must authenticate (401), a present principal lacking rights is
    /// forbidden (403). On success this is a no-op and the mutation proceeds.
    pub fn assert(
        &self,
        operation: Operation,
        resource: ResourceRef,
        conditions: &ResourceConditions,
        ctx: &RequestContext,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<(), AuthError> {
        let tree = match operation {
            Operation::Create => &conditions.create,
            Operation::Read => &conditions.read,
            Operation::Update => &conditions.update,
            Operation::Delete => &conditions.delete,
        };

        if evaluate(tree, ctx, snapshot) {
            return Ok(());
        }

        let err = if ctx.principal().is_none() {
            AuthError::AuthenticationRequired {
                operation,
                resource,
            }
        } else {
            AuthError::Forbidden {
                operation,
                resource,
            }
        };
        debug!(%resource, ?operation, code = err.code(), "authorization denied");
        Err(err)
    }
}
