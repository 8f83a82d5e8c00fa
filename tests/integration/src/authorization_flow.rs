//! Authorization outcomes across the anonymous/user/operator spectrum, and
//! the rollback guarantee that a never-committed unit of work emits nothing.

use crate::test_utils::{drain_events, MemoryStorage, World};
use cardloom_auth::{evaluate, AuthError, ConditionTree, RequestContext};
use cardloom_core::{ProjectId, ResourceId, Role, UserId};
use cardloom_domain::{Card, CardType, Resource, UserAccount};
use cardloom_propagation::{ClusterBus, Dispatcher};
use cardloom_store::{AuthorizedStore, StoreError, UnitOfWork};

fn card(id: u64, project: ProjectId) -> Card {
    Card {
        id: ResourceId::new(id),
        project,
        card_type: None,
        title: "card".to_string(),
    }
}

fn team_world() -> World {
    World::new()
        .with_admin(UserId::new(99))
        .with_role(UserId::new(1), ProjectId::new(1), Role::Editor)
        .with_role(UserId::new(2), ProjectId::new(1), Role::Reader)
}

#[test]
fn test_anonymous_mutation_is_authentication_required() {
    let world = team_world();
    let mut store = AuthorizedStore::new(MemoryStorage::default());
    let mut uow = UnitOfWork::new(RequestContext::anonymous());

    let err = store
        .insert(&card(10, ProjectId::new(1)), &mut uow, &world)
        .unwrap_err();
    let StoreError::Auth(auth) = err else {
        panic!("expected auth error, got {err:?}");
    };
    assert!(matches!(auth, AuthError::AuthenticationRequired { .. }));
    assert_eq!(auth.http_status(), 401);
    assert_eq!(auth.code(), "authentication_required");
}

#[test]
fn test_unauthorized_user_is_forbidden() {
    let world = team_world();
    let mut store = AuthorizedStore::new(MemoryStorage::default());
    // A reader may see the project but not write cards into it.
    let mut uow = UnitOfWork::new(RequestContext::for_user(UserId::new(2)));

    let err = store
        .insert(&card(10, ProjectId::new(1)), &mut uow, &world)
        .unwrap_err();
    let StoreError::Auth(auth) = err else {
        panic!("expected auth error, got {err:?}");
    };
    assert!(matches!(auth, AuthError::Forbidden { .. }));
    assert_eq!(auth.http_status(), 403);
    assert_eq!(auth.code(), "forbidden");
}

#[test]
fn test_operator_bypasses_every_condition_tree() {
    let world = team_world();
    let mut store = AuthorizedStore::new(MemoryStorage::default());
    let mut uow = UnitOfWork::new(RequestContext::for_admin(UserId::new(99)));

    // Global card types are operator territory; a foreign account is
    // untouchable even for its owner's teammates.
    let global = CardType {
        id: ResourceId::new(20),
        project: None,
        name: "Task".to_string(),
        published: false,
        references: None,
    };
    let account = UserAccount {
        id: UserId::new(1),
        name: "Someone".to_string(),
        mail: "someone@cardloom.example".to_string(),
        admin: false,
    };
    store.insert(&global, &mut uow, &world).unwrap();
    store.update(&account, &mut uow, &world).unwrap();
    assert_eq!(store.storage().len(), 2);
}

#[test]
fn test_security_tx_bypass_covers_the_whole_dynamic_extent() {
    let world = World::new();
    let ctx = RequestContext::anonymous();
    let tree = ConditionTree::admin_only();
    assert!(!evaluate(&tree, &ctx, &world));

    {
        let _guard = ctx.enter_security_tx();
        assert!(evaluate(&tree, &ctx, &world));
        // Nested entry keeps the bypass active after the inner guard drops.
        {
            let _inner = ctx.enter_security_tx();
        }
        assert!(evaluate(&tree, &ctx, &world));
    }
    assert!(!evaluate(&tree, &ctx, &world));
}

#[test]
fn test_denied_mutation_leaves_storage_and_bag_untouched() {
    let world = team_world();
    let mut store = AuthorizedStore::new(MemoryStorage::default());
    let mut uow = UnitOfWork::new(RequestContext::for_user(UserId::new(2)));

    let _ = store.insert(&card(10, ProjectId::new(1)), &mut uow, &world);
    assert!(store.storage().is_empty());
    assert!(uow.bag().is_empty());
}

#[test]
fn test_rolled_back_unit_of_work_emits_nothing() {
    let editor = UserId::new(1);
    let project = ProjectId::new(1);
    let c = card(10, project);
    let world = team_world().with_owner(c.reference(), project);

    let mut store = AuthorizedStore::new(MemoryStorage::default());
    let dispatcher = Dispatcher::new();
    let bus = ClusterBus::new("node-a", 16);
    let mut rx = bus.subscribe();

    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    uow.discard();

    assert!(uow.commit(&dispatcher, &world, &bus).is_err());
    assert!(drain_events(&mut rx).is_empty());
}

#[test]
fn test_commit_is_not_repeatable() {
    let editor = UserId::new(1);
    let project = ProjectId::new(1);
    let c = card(10, project);
    let world = team_world().with_owner(c.reference(), project);

    let mut store = AuthorizedStore::new(MemoryStorage::default());
    let dispatcher = Dispatcher::new();
    let bus = ClusterBus::new("node-a", 16);
    let mut rx = bus.subscribe();

    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();
    assert!(uow.commit(&dispatcher, &world, &bus).is_err());

    // Exactly one delivery per channel despite the second attempt.
    assert_eq!(drain_events(&mut rx).len(), 2);
}
