//! Cardloom Auth - condition-tree authorization for shared resources
//!
//! This crate decides whether a mutating principal is authorized. It handles:
//! - Boolean condition trees attached per resource operation
//! - A closed predicate set evaluated against the relational snapshot
//! - Admin short-circuit and the re-entrancy guard for nested resource loads
//! - The fail-closed authorization gate with the 401/403 error taxonomy
//!
//! # Architecture
//!
//! Every mutation flows through the following pipeline:
//! 1. The resource declares four [`ConditionTree`]s (create/read/update/delete)
//! 2. [`AuthorizationGate::assert`] resolves the tree for the operation
//! 3. [`evaluator::evaluate`] walks the tree (admins never descend into it)
//! 4. A `false` outcome becomes [`AuthError::AuthenticationRequired`] or
//!    [`AuthError::Forbidden`]; persistence is never reached on failure

#![warn(missing_docs)]

pub mod condition;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod gate;

pub use condition::{ConditionTree, Predicate, ResourceConditions};
pub use context::{Principal, RequestContext, SecurityTxGuard};
pub use error::AuthError;
pub use evaluator::evaluate;
pub use gate::{AuthorizationGate, Operation};
