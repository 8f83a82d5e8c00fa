//! Cardloom Store - the authorized repository wrapper
//!
//! The security-critical sequencing of every mutation is written out in
//! source here, not hidden in persistence callbacks: assert the operation at
//! the gate, delegate to storage, register with the unit of work's
//! propagation bag. Omitting the gate is impossible when all mutations go
//! through [`AuthorizedStore`].

#![warn(missing_docs)]

pub mod authorized;
pub mod error;
pub mod storage;

pub use authorized::{AuthorizedStore, UnitOfWork};
pub use error::StoreError;
pub use storage::{Storage, StorageError};
