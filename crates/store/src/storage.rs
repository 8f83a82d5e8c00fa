//! The external persistence collaborator.

use cardloom_core::ResourceRef;
use cardloom_domain::Resource;
use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The referenced resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(ResourceRef),

    /// Backend failure (connection, constraint violation, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Relational persistence, owned entirely outside this subsystem.
///
/// Entity merge semantics, schema, and transactions live behind this trait;
/// the propagation core only drives it through [`crate::AuthorizedStore`].
pub trait Storage {
    /// Fetch a resource by reference.
    fn fetch(&self, resource: ResourceRef) -> Result<Option<Box<dyn Resource>>, StorageError>;

    /// Persist a new resource.
    fn insert(&mut self, resource: &dyn Resource) -> Result<(), StorageError>;

    /// Persist changes to an existing resource.
    fn update(&mut self, resource: &dyn Resource) -> Result<(), StorageError>;

    /// Remove a resource.
    fn remove(&mut self, resource: ResourceRef) -> Result<(), StorageError>;
}
