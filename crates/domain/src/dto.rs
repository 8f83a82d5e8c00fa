//! Polymorphic wire DTOs with the `"@class"` discriminant.
//!
//! The discriminant set is closed at compile time: serde's internally-tagged
//! enum is the registry, built once and checked by the compiler instead of
//! scanned lazily from a classpath.

use crate::model::{Block, Card, CardType, Document, Presence, Project, TeamMember, UserAccount};
use cardloom_core::{ResourceId, ResourceKind, ResourceRef};
use serde::{Deserialize, Serialize};

/// Wire form of an updated resource, discriminated by `"@class"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@class")]
pub enum ResourceDto {
    /// Updated project.
    Project(Project),
    /// Updated card.
    Card(Card),
    /// Updated card type.
    CardType(CardType),
    /// Updated document.
    Document(Document),
    /// Updated block.
    Block(Block),
    /// Updated team membership.
    TeamMember(TeamMember),
    /// Updated user account.
    UserAccount(UserAccount),
    /// Presence indicator.
    Presence(Presence),
}

impl ResourceDto {
    /// Kind of the resource carried by this DTO.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDto::Project(_) => ResourceKind::Project,
            ResourceDto::Card(_) => ResourceKind::Card,
            ResourceDto::CardType(_) => ResourceKind::CardType,
            ResourceDto::Document(_) => ResourceKind::Document,
            ResourceDto::Block(_) => ResourceKind::Block,
            ResourceDto::TeamMember(_) => ResourceKind::TeamMember,
            ResourceDto::UserAccount(_) => ResourceKind::UserAccount,
            ResourceDto::Presence(_) => ResourceKind::Presence,
        }
    }

    /// The `"@class"` string this DTO serializes under.
    pub fn class_name(&self) -> &'static str {
        self.kind().class_name()
    }

    /// Reference of the carried resource.
    pub fn reference(&self) -> ResourceRef {
        let id = match self {
            ResourceDto::Project(p) => ResourceId::new(p.id.raw()),
            ResourceDto::Card(c) => c.id,
            ResourceDto::CardType(t) => t.id,
            ResourceDto::Document(d) => d.id,
            ResourceDto::Block(b) => ResourceId::new(b.id.raw()),
            ResourceDto::TeamMember(m) => m.id,
            ResourceDto::UserAccount(u) => ResourceId::new(u.id.raw()),
            ResourceDto::Presence(p) => ResourceId::new(p.user.raw()),
        };
        ResourceRef::new(self.kind(), id)
    }
}

/// Resolve a `"@class"` discriminant back to a resource kind.
pub fn kind_for_class(class: &str) -> Option<ResourceKind> {
    match class {
        "Project" => Some(ResourceKind::Project),
        "Card" => Some(ResourceKind::Card),
        "CardType" => Some(ResourceKind::CardType),
        "Document" => Some(ResourceKind::Document),
        "Block" => Some(ResourceKind::Block),
        "TeamMember" => Some(ResourceKind::TeamMember),
        "UserAccount" => Some(ResourceKind::UserAccount),
        "Presence" => Some(ResourceKind::Presence),
        _ => None,
    }
}

/// Wire form of a deleted resource: `{"@class": <kind>, "id": <id>}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeletedRef {
    /// Class discriminant of the deleted resource.
    #[serde(rename = "@class")]
    pub class: String,
    /// Id of the deleted resource.
    pub id: ResourceId,
}

impl DeletedRef {
    /// Deleted-ref for a resource reference.
    pub fn of(resource: ResourceRef) -> Self {
        Self {
            class: resource.kind.class_name().to_string(),
            id: resource.id,
        }
    }

    /// Parse back into a typed reference, if the class is known.
    pub fn reference(&self) -> Option<ResourceRef> {
        kind_for_class(&self.class).map(|kind| ResourceRef::new(kind, self.id))
    }
}
