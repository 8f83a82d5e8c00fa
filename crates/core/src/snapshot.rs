//! Read interface over the relational neighborhood of a resource.
//!
//! Authorization predicates and channel computation both need a consistent
//! view of team membership, publication flags, and the reference graph. That
//! view is supplied by the persistence collaborator through this trait; the
//! propagation core never reaches into storage directly.

use crate::types::{BlockId, ProjectId, ResourceRef, Role, UserId};

/// Snapshot of the relational state surrounding the resources touched by one
/// unit of work.
///
/// Implementations must be cheap in-memory or cache-backed reads: condition
/// evaluation and audience computation run on the request path and perform no
/// external I/O. All methods answer from the *current* state; historical
/// values (e.g. a card type that used to be global) must not leak through.
pub trait RelationSnapshot {
    /// All administrator user ids.
    fn admins(&self) -> Vec<UserId>;

    /// Role a user holds in a project, if any.
    fn role_of(&self, user: UserId, project: ProjectId) -> Option<Role>;

    /// Accepted team members of a project. Pending invitations have no user
    /// attached yet and are never included.
    fn team_members(&self, project: ProjectId) -> Vec<UserId>;

    /// The user attached to a team-member record, or `None` while the
    /// invitation is pending.
    fn member_user(&self, member: ResourceRef) -> Option<UserId>;

    /// The project owning a resource, or `None` for global resources.
    fn owning_project(&self, resource: ResourceRef) -> Option<ProjectId>;

    /// Publication flag of a resource (project-wide or global visibility).
    fn is_published(&self, resource: ResourceRef) -> bool;

    /// Publication flag of a project itself.
    fn is_project_published(&self, project: ProjectId) -> bool;

    /// Resources holding a direct reference to the given resource.
    ///
    /// References form a DAG rooted at concrete resources; the audience of a
    /// referenced resource includes the audiences of all its referrers.
    fn referrers(&self, resource: ResourceRef) -> Vec<ResourceRef>;

    /// Users allowed to instantiate the given project model.
    fn instance_makers(&self, model: ProjectId) -> Vec<UserId>;

    /// Models a user is an instance-maker of.
    fn instance_maker_of(&self, user: UserId) -> Vec<ProjectId>;

    /// All users sharing at least one project team with the given user.
    fn teammates_of(&self, user: UserId) -> Vec<UserId>;

    /// The document block a resource belongs to, if it is block content.
    fn block_of(&self, resource: ResourceRef) -> Option<BlockId>;
}
