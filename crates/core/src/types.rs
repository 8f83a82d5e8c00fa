//! Shared identifier and reference types.
//!
//! Every entity handled by the propagation core is addressed through these
//! small copyable values. Identifiers are u64 newtypes so that a project id
//! can never be passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new identifier from its raw value.
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw numeric value.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a user account.
    UserId
);
id_type!(
    /// Identifier of a project (or project model).
    ProjectId
);
id_type!(
    /// Identifier of a document block.
    BlockId
);
id_type!(
    /// Identifier of any persisted resource instance.
    ResourceId
);

/// Kind of a persisted resource.
///
/// The set is closed: audience computation and DTO encoding both dispatch on
/// it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A shared project.
    Project,
    /// A card on a project grid.
    Card,
    /// A card type, project-scoped or global.
    CardType,
    /// A rich-text document.
    Document,
    /// A block inside a document.
    Block,
    /// A team membership record (may be a pending invitation).
    TeamMember,
    /// A user account.
    UserAccount,
    /// An ephemeral presence / typing indicator.
    Presence,
}

impl ResourceKind {
    /// Wire-visible class discriminant for this kind, used in the
    /// `"@class"` field of propagation messages.
    pub fn class_name(&self) -> &'static str {
        match self {
            ResourceKind::Project => "Project",
            ResourceKind::Card => "Card",
            ResourceKind::CardType => "CardType",
            ResourceKind::Document => "Document",
            ResourceKind::Block => "Block",
            ResourceKind::TeamMember => "TeamMember",
            ResourceKind::UserAccount => "UserAccount",
            ResourceKind::Presence => "Presence",
        }
    }
}

/// Reference to a resource instance: kind plus id.
///
/// Used as the key of propagation bags, the node of the reference graph, and
/// the payload of deletion notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource id.
    pub id: ResourceId,
}

impl ResourceRef {
    /// Create a reference from kind and id.
    pub fn new(kind: ResourceKind, id: ResourceId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.class_name(), self.id)
    }
}

/// Role of a user within a project team, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May read project content.
    Reader,
    /// May read and edit project content.
    Editor,
    /// Full control, including team and project lifecycle.
    Owner,
}

impl Role {
    /// Whether this role grants read access.
    pub fn can_read(&self) -> bool {
        true
    }

    /// Whether this role grants write access to project content.
    pub fn can_write(&self) -> bool {
        *self >= Role::Editor
    }
}
