//! Full-path audience tests: mutation through the authorized store, commit
//! through the dispatcher, delivery observed on the cluster bus.

use crate::test_utils::{channel_keys, drain_events, MemoryStorage, World};
use cardloom_auth::RequestContext;
use cardloom_core::{ProjectId, ResourceId, Role, UserId};
use cardloom_domain::{Card, CardType, Presence, Resource};
use cardloom_propagation::{ClusterBus, Dispatcher};
use cardloom_store::{AuthorizedStore, UnitOfWork};
use std::collections::BTreeSet;

fn keys(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pipeline() -> (AuthorizedStore<MemoryStorage>, Dispatcher, ClusterBus) {
    (
        AuthorizedStore::new(MemoryStorage::default()),
        Dispatcher::new(),
        ClusterBus::new("node-a", 64),
    )
}

fn card(id: u64, project: ProjectId) -> Card {
    Card {
        id: ResourceId::new(id),
        project,
        card_type: None,
        title: "card".to_string(),
    }
}

#[test]
fn test_unpublished_project_card_reaches_project_and_operators() {
    let project = ProjectId::new(1);
    let editor = UserId::new(1);
    let operator = UserId::new(99);
    let c = card(10, project);
    let world = World::new()
        .with_admin(operator)
        .with_role(editor, project, Role::Editor)
        .with_owner(c.reference(), project);

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    let notified = uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(notified, 2);
    assert_eq!(channel_keys(&events), keys(&["project/1", "user/99"]));
}

#[test]
fn test_published_card_reaches_team_members_instead_of_operators() {
    let project = ProjectId::new(1);
    let editor = UserId::new(1);
    let reader = UserId::new(2);
    let c = card(10, project);
    let world = World::new()
        .with_admin(UserId::new(99))
        .with_role(editor, project, Role::Editor)
        .with_role(reader, project, Role::Reader)
        .with_owner(c.reference(), project)
        .with_published(c.reference());

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(
        channel_keys(&events),
        keys(&["project/1", "user/1", "user/2"])
    );
}

#[test]
fn test_unpublished_global_card_type_reaches_operators_only() {
    let operator = UserId::new(99);
    let card_type = CardType {
        id: ResourceId::new(20),
        project: None,
        name: "Task".to_string(),
        published: false,
        references: None,
    };
    let world = World::new().with_admin(operator);

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_admin(operator));
    store.insert(&card_type, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(channel_keys(&events), keys(&["user/99"]));
}

#[test]
fn test_published_global_card_type_is_broadcast() {
    let operator = UserId::new(99);
    let card_type = CardType {
        id: ResourceId::new(20),
        project: None,
        name: "Task".to_string(),
        published: true,
        references: None,
    };
    let world = World::new()
        .with_admin(operator)
        .with_published(card_type.reference());

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_admin(operator));
    store.insert(&card_type, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(channel_keys(&events), keys(&["broadcast"]));
}

#[test]
fn test_reference_chain_extends_the_audience() {
    // A global card type in project 1 is referenced by a card type owned by
    // project 2: updating the first must notify both project audiences.
    let project_a = ProjectId::new(1);
    let project_b = ProjectId::new(2);
    let editor = UserId::new(1);
    let referenced = CardType {
        id: ResourceId::new(20),
        project: Some(project_a),
        name: "Base".to_string(),
        published: false,
        references: None,
    };
    let referring = CardType {
        id: ResourceId::new(21),
        project: Some(project_b),
        name: "Alias".to_string(),
        published: false,
        references: Some(referenced.id),
    };
    let world = World::new()
        .with_role(editor, project_a, Role::Editor)
        .with_owner(referenced.reference(), project_a)
        .with_owner(referring.reference(), project_b)
        .with_referrer(referenced.reference(), referring.reference());

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&referenced, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(channel_keys(&events), keys(&["project/1", "project/2"]));
}

#[test]
fn test_presence_stays_on_the_project_channel() {
    let project = ProjectId::new(1);
    let editor = UserId::new(1);
    let presence = Presence {
        user: editor,
        project,
        card: None,
    };
    let world = World::new()
        .with_admin(UserId::new(99))
        .with_role(editor, project, Role::Reader)
        .with_owner(presence.reference(), project);

    let (store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.announce(&presence, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(channel_keys(&events), keys(&["project/1"]));
    // Ephemeral: announced, never persisted.
    assert!(store.storage().is_empty());
}

#[test]
fn test_delete_within_same_unit_supersedes_the_update() {
    let project = ProjectId::new(1);
    let editor = UserId::new(1);
    let c = card(10, project);
    let world = World::new()
        .with_role(editor, project, Role::Editor)
        .with_owner(c.reference(), project);

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    store.delete(&c, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(events[0].batch.updated.is_empty());
    assert_eq!(events[0].batch.deleted.len(), 1);
    assert_eq!(events[0].batch.deleted[0].class, "Card");
}

#[test]
fn test_commit_payload_carries_the_dto() {
    let project = ProjectId::new(1);
    let editor = UserId::new(1);
    let c = card(10, project);
    let world = World::new()
        .with_role(editor, project, Role::Editor)
        .with_owner(c.reference(), project);

    let (mut store, dispatcher, bus) = pipeline();
    let mut rx = bus.subscribe();
    let mut uow = UnitOfWork::new(RequestContext::for_user(editor));
    store.insert(&c, &mut uow, &world).unwrap();
    uow.commit(&dispatcher, &world, &bus).unwrap();

    let events = drain_events(&mut rx);
    assert_eq!(events.len(), 1);
    let json = serde_json::to_value(&events[0].batch.updated[0]).unwrap();
    assert_eq!(json["@class"], "Card");
    assert_eq!(json["id"], 10);
}
