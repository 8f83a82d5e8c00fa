//! Condition trees and the closed predicate set.
//!
//! A condition tree is an immutable boolean expression attached to one
//! resource operation. Trees are built once per resource class and
//! parameterized per instance: the ids a predicate needs are resolved into it
//! at construction time, so evaluation is a pure walk over resolved values.

use cardloom_core::{ProjectId, ResourceRef, Role, UserId};
use serde::{Deserialize, Serialize};

/// Named boolean predicate over the request context and relational snapshot.
///
/// The set is closed by design: evaluation is a single `match`, there is no
/// way to hook foreign code into an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Always true, even for anonymous requests.
    Anyone,
    /// True iff a principal is present.
    Authenticated,
    /// Principal is exactly this user.
    IsUser(UserId),
    /// Principal holds at least the given role in the project.
    HasProjectRole(ProjectId, Role),
    /// The project itself is published.
    IsProjectPublished(ProjectId),
    /// The resource carries the publication flag.
    IsPublished(ResourceRef),
    /// Principal may instantiate the given project model.
    IsInstanceMaker(ProjectId),
    /// Always false; combined with the evaluator's admin short-circuit this
    /// means "admin only".
    Never,
}

/// Boolean expression node: a leaf predicate or an and/or combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionTree {
    /// Single predicate.
    Leaf(Predicate),
    /// True iff every child is true (short-circuits at the first false).
    All(Vec<ConditionTree>),
    /// True iff any child is true (short-circuits at the first true).
    Any(Vec<ConditionTree>),
}

impl ConditionTree {
    /// Tree satisfied by administrators only.
    pub fn admin_only() -> Self {
        ConditionTree::Leaf(Predicate::Never)
    }

    /// Tree satisfied by everyone, including anonymous requests.
    pub fn anyone() -> Self {
        ConditionTree::Leaf(Predicate::Anyone)
    }

    /// Tree satisfied by any authenticated principal.
    pub fn authenticated() -> Self {
        ConditionTree::Leaf(Predicate::Authenticated)
    }

    /// Leaf node for a single predicate.
    pub fn leaf(predicate: Predicate) -> Self {
        ConditionTree::Leaf(predicate)
    }

    /// Conjunction of child trees.
    pub fn all(children: impl IntoIterator<Item = ConditionTree>) -> Self {
        ConditionTree::All(children.into_iter().collect())
    }

    /// Disjunction of child trees.
    pub fn any(children: impl IntoIterator<Item = ConditionTree>) -> Self {
        ConditionTree::Any(children.into_iter().collect())
    }
}

/// The four condition trees of one resource instance.
///
/// A resource kind that declares nothing gets the fail-closed default:
/// admin only for every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConditions {
    /// Condition for creating the resource.
    pub create: ConditionTree,
    /// Condition for reading the resource.
    pub read: ConditionTree,
    /// Condition for updating the resource.
    pub update: ConditionTree,
    /// Condition for deleting the resource.
    pub delete: ConditionTree,
}

impl ResourceConditions {
    /// Fail-closed default: every operation requires an administrator.
    pub fn admin_only() -> Self {
        Self {
            create: ConditionTree::admin_only(),
            read: ConditionTree::admin_only(),
            update: ConditionTree::admin_only(),
            delete: ConditionTree::admin_only(),
        }
    }

    /// Same tree for all four operations.
    pub fn uniform(tree: ConditionTree) -> Self {
        Self {
            create: tree.clone(),
            read: tree.clone(),
            update: tree.clone(),
            delete: tree,
        }
    }

    /// Common split: one tree gates reads, another gates all mutations.
    pub fn read_write(read: ConditionTree, write: ConditionTree) -> Self {
        Self {
            create: write.clone(),
            read,
            update: write.clone(),
            delete: write,
        }
    }
}

impl Default for ResourceConditions {
    fn default() -> Self {
        Self::admin_only()
    }
}
