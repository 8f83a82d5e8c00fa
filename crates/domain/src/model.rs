//! Concrete resource types and their condition declarations.
//!
//! Each resource implements [`Resource`]: a stable reference, the four
//! condition trees guarding its lifecycle operations, and the DTO conversion
//! used by propagation messages. A kind that declares no conditions falls
//! back to the admin-only default.

use crate::dto::{DeletedRef, ResourceDto};
use cardloom_auth::{ConditionTree, Predicate, ResourceConditions};
use cardloom_core::{BlockId, ProjectId, ResourceId, ResourceKind, ResourceRef, Role, UserId};
use serde::{Deserialize, Serialize};

/// A domain entity subject to authorization and change propagation.
pub trait Resource {
    /// Stable reference (kind + id) of this instance.
    fn reference(&self) -> ResourceRef;

    /// Condition trees for create/read/update/delete, parameterized with this
    /// instance's ids.
    fn conditions(&self) -> ResourceConditions;

    /// Wire DTO carried in `updated` lists of propagation messages.
    fn to_dto(&self) -> ResourceDto;

    /// Wire reference carried in `deleted` lists of propagation messages.
    fn deleted_ref(&self) -> DeletedRef {
        DeletedRef::of(self.reference())
    }
}

/// Readable by any team member, or by anyone once the project is published.
fn project_readable(project: ProjectId) -> ConditionTree {
    ConditionTree::any([
        ConditionTree::leaf(Predicate::HasProjectRole(project, Role::Reader)),
        ConditionTree::leaf(Predicate::IsProjectPublished(project)),
    ])
}

/// Writable by editors and above.
fn project_writable(project: ProjectId) -> ConditionTree {
    ConditionTree::leaf(Predicate::HasProjectRole(project, Role::Editor))
}

/// A shared project: the unit of team collaboration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project id.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Whether the project is visible outside its team.
    pub published: bool,
    /// Whether the project is a model others may instantiate.
    pub is_model: bool,
}

impl Resource for Project {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Project, ResourceId::new(self.id.raw()))
    }

    fn conditions(&self) -> ResourceConditions {
        let mut readers = vec![
            ConditionTree::leaf(Predicate::HasProjectRole(self.id, Role::Reader)),
            ConditionTree::leaf(Predicate::IsProjectPublished(self.id)),
        ];
        if self.is_model {
            // Instance makers may inspect a model project before
            // instantiating it.
            readers.push(ConditionTree::leaf(Predicate::IsInstanceMaker(self.id)));
        }
        ResourceConditions {
            create: ConditionTree::authenticated(),
            read: ConditionTree::any(readers),
            update: ConditionTree::leaf(Predicate::HasProjectRole(self.id, Role::Owner)),
            delete: ConditionTree::leaf(Predicate::HasProjectRole(self.id, Role::Owner)),
        }
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::Project(self.clone())
    }
}

/// A card on a project grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card id.
    pub id: ResourceId,
    /// Owning project.
    pub project: ProjectId,
    /// Card type, if assigned.
    pub card_type: Option<ResourceId>,
    /// Card title.
    pub title: String,
}

impl Resource for Card {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Card, self.id)
    }

    fn conditions(&self) -> ResourceConditions {
        ResourceConditions::read_write(project_readable(self.project), project_writable(self.project))
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::Card(self.clone())
    }
}

/// A card type, either scoped to a project or global to the installation.
///
/// A card type may be a reference to another card type; audiences propagate
/// along that chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardType {
    /// Card type id.
    pub id: ResourceId,
    /// Owning project; `None` for global card types.
    pub project: Option<ProjectId>,
    /// Display name.
    pub name: String,
    /// Publication flag (project-wide for scoped types, installation-wide for
    /// global ones).
    pub published: bool,
    /// Referenced card type, if this is a reference.
    pub references: Option<ResourceId>,
}

impl Resource for CardType {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::CardType, self.id)
    }

    fn conditions(&self) -> ResourceConditions {
        match self.project {
            Some(project) => ResourceConditions::read_write(
                project_readable(project),
                project_writable(project),
            ),
            // Global card types: readable when published, mutable by
            // operators only.
            None => ResourceConditions {
                create: ConditionTree::admin_only(),
                read: ConditionTree::leaf(Predicate::IsPublished(self.reference())),
                update: ConditionTree::admin_only(),
                delete: ConditionTree::admin_only(),
            },
        }
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::CardType(self.clone())
    }
}

/// A rich-text document belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id.
    pub id: ResourceId,
    /// Owning project.
    pub project: ProjectId,
    /// Document title.
    pub title: String,
}

impl Resource for Document {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Document, self.id)
    }

    fn conditions(&self) -> ResourceConditions {
        ResourceConditions::read_write(project_readable(self.project), project_writable(self.project))
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::Document(self.clone())
    }
}

/// A block inside a document; the unit subscribed to by collaborative text
/// editing sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block id.
    pub id: BlockId,
    /// Owning document.
    pub document: ResourceId,
    /// Owning project.
    pub project: ProjectId,
}

impl Resource for Block {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Block, ResourceId::new(self.id.raw()))
    }

    fn conditions(&self) -> ResourceConditions {
        ResourceConditions::read_write(project_readable(self.project), project_writable(self.project))
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::Block(self.clone())
    }
}

/// A team membership record. Until the invitation is accepted no user is
/// attached, only the invitation mail address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Membership record id.
    pub id: ResourceId,
    /// Project the membership belongs to.
    pub project: ProjectId,
    /// The member, once the invitation is accepted.
    pub user: Option<UserId>,
    /// Role granted by this membership.
    pub role: Role,
    /// Invitation mail address while pending.
    pub invite_mail: Option<String>,
}

impl Resource for TeamMember {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::TeamMember, self.id)
    }

    fn conditions(&self) -> ResourceConditions {
        let owner = ConditionTree::leaf(Predicate::HasProjectRole(self.project, Role::Owner));
        // A member may always remove or adjust their own record (leave the
        // team); everything else is owner territory.
        let self_or_owner = match self.user {
            Some(user) => ConditionTree::any([
                owner.clone(),
                ConditionTree::leaf(Predicate::IsUser(user)),
            ]),
            None => owner.clone(),
        };
        ResourceConditions {
            create: owner,
            read: project_readable(self.project),
            update: self_or_owner.clone(),
            delete: self_or_owner,
        }
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::TeamMember(self.clone())
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login mail address.
    pub mail: String,
    /// Operator flag.
    pub admin: bool,
}

impl Resource for UserAccount {
    fn reference(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::UserAccount, ResourceId::new(self.id.raw()))
    }

    fn conditions(&self) -> ResourceConditions {
        ResourceConditions {
            // Registration is open.
            create: ConditionTree::anyone(),
            read: ConditionTree::leaf(Predicate::IsUser(self.id)),
            update: ConditionTree::leaf(Predicate::IsUser(self.id)),
            delete: ConditionTree::admin_only(),
        }
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::UserAccount(self.clone())
    }
}

/// Ephemeral liveness / typing indicator. Never persisted, never replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    /// User the indicator belongs to.
    pub user: UserId,
    /// Project being edited.
    pub project: ProjectId,
    /// Card being edited, if any.
    pub card: Option<ResourceId>,
}

impl Resource for Presence {
    fn reference(&self) -> ResourceRef {
        // Presence is keyed by user; two indicators from the same user
        // coalesce within one unit of work.
        ResourceRef::new(ResourceKind::Presence, ResourceId::new(self.user.raw()))
    }

    fn conditions(&self) -> ResourceConditions {
        ResourceConditions::uniform(project_readable(self.project))
    }

    fn to_dto(&self) -> ResourceDto {
        ResourceDto::Presence(self.clone())
    }
}
