//! Cardloom Domain - the shared resource model
//!
//! Concrete resource types edited collaboratively (projects, cards, card
//! types, documents, blocks, team members, user accounts, presence), their
//! per-operation condition declarations, and the polymorphic DTO layer with
//! the `"@class"` discriminant.
//!
//! The `"@class"` mapping is a closed, compile-time registry: a serde
//! internally-tagged enum. There is no runtime class lookup anywhere.

#![warn(missing_docs)]

pub mod dto;
pub mod model;

pub use dto::{kind_for_class, DeletedRef, ResourceDto};
pub use model::{
    Block, Card, CardType, Document, Presence, Project, Resource, TeamMember, UserAccount,
};
