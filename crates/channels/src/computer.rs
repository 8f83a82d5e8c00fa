//! Per-kind audience computation strategies.

use crate::channel::Channel;
use crate::error::ChannelError;
use cardloom_core::{BlockId, ProjectId, RelationSnapshot, ResourceKind, ResourceRef, UserId};
use std::collections::BTreeSet;
use tracing::warn;

/// Computes the set of channels that must receive the update of a mutated
/// resource.
///
/// Stateless: every call recomputes from the snapshot, so a resource that
/// changed scope (global to project-scoped or back) is always attributed by
/// its current state.
#[derive(Debug, Default)]
pub struct ChannelComputer;

impl ChannelComputer {
    /// Create a new computer.
    pub fn new() -> Self {
        Self
    }

    /// Compute the audience of a resource.
    ///
    /// The result is deterministic and side-effect-free for a fixed
    /// snapshot. An empty audience is valid and yields no delivery.
    pub fn compute(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<BTreeSet<Channel>, ChannelError> {
        let mut audience = BTreeSet::new();
        let mut visited = BTreeSet::new();
        self.collect(resource, snapshot, &mut visited, &mut audience)?;
        Ok(audience)
    }

    /// Union the audience of `resource` (and its referrers) into `audience`.
    ///
    /// References form a DAG rooted at concrete resources, so the walk is
    /// bounded; the visited set additionally cuts malformed cycles instead of
    /// recursing forever.
    fn collect(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
        visited: &mut BTreeSet<ResourceRef>,
        audience: &mut BTreeSet<Channel>,
    ) -> Result<(), ChannelError> {
        if !visited.insert(resource) {
            warn!(%resource, "reference cycle during audience computation, cutting walk");
            return Ok(());
        }

        match resource.kind {
            ResourceKind::Presence => self.presence_channels(resource, snapshot, audience)?,
            ResourceKind::UserAccount => {
                self.user_identity_channels(UserId::new(resource.id.raw()), snapshot, audience)
            }
            ResourceKind::Block => {
                audience.insert(Channel::Block(BlockId::new(resource.id.raw())));
                self.content_channels(resource, snapshot, audience);
            }
            ResourceKind::TeamMember => {
                self.content_channels(resource, snapshot, audience);
                // An accepted member hears about their own membership even
                // when not currently subscribed to the project. Pending
                // invitations have no user and produce no user channel.
                if let Some(member) = snapshot.member_user(resource) {
                    audience.insert(Channel::User(member));
                }
            }
            _ => self.content_channels(resource, snapshot, audience),
        }

        // Content living inside a document block also notifies the block's
        // collaborative editing sessions.
        if resource.kind != ResourceKind::Block {
            if let Some(block) = snapshot.block_of(resource) {
                audience.insert(Channel::Block(block));
            }
        }

        // Reference propagation: whoever sees a referrer must see the
        // referenced resource change as well.
        for referrer in snapshot.referrers(resource) {
            self.collect(referrer, snapshot, visited, audience)?;
        }
        Ok(())
    }

    /// Project-content strategy with the global fallback.
    ///
    /// Project-scoped: the project channel, plus one user channel per
    /// accepted team member when the resource is published, plus operator
    /// channels when it is not. Global: broadcast when published, operators
    /// only when not.
    fn content_channels(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
        audience: &mut BTreeSet<Channel>,
    ) {
        match snapshot.owning_project(resource) {
            Some(project) => {
                audience.insert(Channel::ProjectContent(project));
                if snapshot.is_published(resource) {
                    for member in snapshot.team_members(project) {
                        audience.insert(Channel::User(member));
                    }
                } else {
                    for admin in snapshot.admins() {
                        audience.insert(Channel::User(admin));
                    }
                }
            }
            None => {
                if snapshot.is_published(resource) {
                    audience.insert(Channel::Broadcast);
                } else {
                    for admin in snapshot.admins() {
                        audience.insert(Channel::User(admin));
                    }
                }
            }
        }
    }

    /// User-identity strategy: the user, everyone sharing a team with them,
    /// operators, and the instance-maker audience of models the user may
    /// instantiate.
    fn user_identity_channels(
        &self,
        user: UserId,
        snapshot: &dyn RelationSnapshot,
        audience: &mut BTreeSet<Channel>,
    ) {
        audience.insert(Channel::User(user));
        for teammate in snapshot.teammates_of(user) {
            audience.insert(Channel::User(teammate));
        }
        for admin in snapshot.admins() {
            audience.insert(Channel::User(admin));
        }
        for model in snapshot.instance_maker_of(user) {
            for maker in snapshot.instance_makers(model) {
                audience.insert(Channel::User(maker));
            }
        }
    }

    /// Presence strategy: the project channel only.
    fn presence_channels(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
        audience: &mut BTreeSet<Channel>,
    ) -> Result<(), ChannelError> {
        let project = self.require_project(resource, snapshot)?;
        audience.insert(Channel::ProjectContent(project));
        Ok(())
    }

    fn require_project(
        &self,
        resource: ResourceRef,
        snapshot: &dyn RelationSnapshot,
    ) -> Result<ProjectId, ChannelError> {
        snapshot
            .owning_project(resource)
            .ok_or_else(|| ChannelError::DataIntegrity {
                resource,
                detail: "no owning project".to_string(),
            })
    }
}
