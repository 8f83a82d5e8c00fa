//! Condition tree evaluation.
//!
//! Evaluation is pure with respect to the supplied snapshot and never fails:
//! `false` is a value, not an error. Turning `false` into an HTTP error is
//! the gate's job.

use crate::condition::{ConditionTree, Predicate};
use crate::context::RequestContext;
use cardloom_core::RelationSnapshot;
use tracing::trace;

/// Evaluate a condition tree against the request context and snapshot.
///
/// Short-circuit order matters:
/// 1. Administrators satisfy every tree without the tree being touched.
/// 2. A check already running on this context (re-entrant resource load
///    during predicate evaluation) is bypassed wholesale.
/// 3. Otherwise the tree is walked under the security-transaction guard, so
///    any resource access a predicate triggers hits case 2 instead of
///    recursing forever.
pub fn evaluate(
    tree: &ConditionTree,
    ctx: &RequestContext,
    snapshot: &dyn RelationSnapshot,
) -> bool {
    if ctx.is_admin() {
        return true;
    }
    if ctx.in_security_tx() {
        trace!("re-entrant authorization check bypassed");
        return true;
    }

    let _guard = ctx.enter_security_tx();
    walk(tree, ctx, snapshot)
}

fn walk(tree: &ConditionTree, ctx: &RequestContext, snapshot: &dyn RelationSnapshot) -> bool {
    match tree {
        ConditionTree::Leaf(predicate) => leaf(predicate, ctx, snapshot),
        ConditionTree::All(children) => children.iter().all(|c| walk(c, ctx, snapshot)),
        ConditionTree::Any(children) => children.iter().any(|c| walk(c, ctx, snapshot)),
    }
}

fn leaf(predicate: &Predicate, ctx: &RequestContext, snapshot: &dyn RelationSnapshot) -> bool {
    let user = ctx.principal().map(|p| p.user);
    match predicate {
        Predicate::Anyone => true,
        Predicate::Authenticated => user.is_some(),
        Predicate::Never => false,
        Predicate::IsUser(expected) => user == Some(*expected),
        Predicate::HasProjectRole(project, required) => match user {
            Some(user) => snapshot
                .role_of(user, *project)
                .map(|role| role >= *required)
                .unwrap_or(false),
            None => false,
        },
        Predicate::IsProjectPublished(project) => snapshot.is_project_published(*project),
        Predicate::IsPublished(resource) => snapshot.is_published(*resource),
        Predicate::IsInstanceMaker(model) => match user {
            Some(user) => snapshot.instance_makers(*model).contains(&user),
            None => false,
        },
    }
}
