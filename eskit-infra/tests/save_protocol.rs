mod common;

use common::{Harness, Note, Order, Spy, SpyEvent};
use eskit_domain::aggregate::Aggregate;
use eskit_domain::aggregate_root::AggregateRoot;
use eskit_domain::class_id::{ClassId, ClassIdEntity};
use eskit_domain::entity::Entity;
use eskit_domain::entity_type::EntityTypeKey;
use eskit_domain::error::DomainError;
use eskit_domain::eventing::{PublishEventBuffer, metadata};
use eskit_infra::{AggregateStore, StoreError};
use uuid::Uuid;

#[test]
fn created_order_is_inserted_and_its_events_buffered_in_order() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (mut store, buffer) = harness.session();

    let mut order = Order::create("ada");
    order.add_item("sku-1");
    let id = order.id();
    store.add(order)?;

    let summary = store.save_changes()?;
    assert_eq!(summary.written, 1);
    assert_eq!(
        harness.database.row_count(EntityTypeKey::of::<Order>())?,
        1
    );

    let messages = buffer.events();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].event_type(), "OrderEvent.Created");
    assert_eq!(messages[1].event_type(), "OrderEvent.ItemAdded");
    let expected = harness.order_class_id.to_string();
    for message in &messages {
        assert_eq!(message.aggregate_id(), id);
        assert_eq!(
            message.metadata_value(metadata::AGGREGATE_CLASS_ID),
            Some(expected.as_str())
        );
    }

    let order = store.get::<Order>(id)?;
    assert!(!order.is_changed());
    assert!(order.uncommitted_events().is_empty());
    assert_eq!(order.class_id(), Some(harness.order_class_id));
    Ok(())
}

#[test]
fn find_missing_is_absent_and_get_missing_is_not_found() {
    let harness = Harness::new();
    let (mut store, _) = harness.session();
    let missing = Uuid::new_v4();

    assert!(store.find::<Order>(missing).unwrap().is_none());

    let err = store.get::<Order>(missing).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.report().is_none());
}

#[test]
fn unchanged_aggregate_contributes_no_messages_and_is_not_committed() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (mut store, buffer) = harness.session();

    let quiet = Spy::new(Uuid::new_v4(), 0);
    let quiet_id = quiet.id();
    let mut noisy = Spy::new(Uuid::new_v4(), 0);
    noisy.raise(SpyEvent::Pinged);
    let noisy_id = noisy.id();

    store.add(quiet)?;
    store.add(noisy)?;
    let summary = store.save_changes()?;

    assert_eq!(summary.written, 2);
    assert_eq!(summary.committed, 1);
    let messages = buffer.events();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].aggregate_id(), noisy_id);

    assert_eq!(store.get::<Spy>(quiet_id)?.commits(), 0);
    assert_eq!(store.get::<Spy>(noisy_id)?.commits(), 1);
    Ok(())
}

#[test]
fn message_count_is_the_sum_of_uncommitted_events() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (mut store, buffer) = harness.session();

    let mut first = Order::create("ada");
    first.add_item("a");
    let mut second = Order::create("grace");
    second.add_item("b");
    second.add_item("c");
    let (first_id, second_id) = (first.id(), second.id());

    store.add(first)?;
    store.add(second)?;
    store.add(Spy::new(Uuid::new_v4(), 0))?;
    let expected: usize = store
        .tracked_aggregates()
        .iter()
        .filter(|root| root.is_changed())
        .map(|root| root.uncommitted_events().len())
        .sum();

    let summary = store.save_changes()?;
    assert_eq!(expected, 5);
    assert_eq!(summary.published, expected);

    let messages = buffer.events();
    let per_aggregate: Vec<(Uuid, usize)> = messages
        .iter()
        .map(|m| (m.aggregate_id(), m.aggregate_version()))
        .collect();
    assert_eq!(
        per_aggregate,
        vec![
            (first_id, 1),
            (first_id, 2),
            (second_id, 1),
            (second_id, 2),
            (second_id, 3),
        ]
    );
    Ok(())
}

#[test]
fn unregistered_aggregate_messages_carry_no_class_id() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (mut store, buffer) = harness.session();
    assert!(harness.registry.class_id_of::<Note>().is_none());

    store.add(Note::written("hello"))?;
    store.add(Order::create("ada"))?;
    store.save_changes()?;

    let messages = buffer.events();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].event_type(), "NoteEvent.Written");
    assert!(
        messages[0]
            .metadata_value(metadata::AGGREGATE_CLASS_ID)
            .is_none()
    );
    assert!(
        messages[1]
            .metadata_value(metadata::AGGREGATE_CLASS_ID)
            .is_some()
    );
    Ok(())
}

#[test]
fn class_id_assignment_is_idempotent() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (mut store, _) = harness.session();

    let order = Order::create("ada");
    let id = order.id();
    let preset = ClassId::new(Uuid::new_v4())?;
    let mut tagged = Order::create("grace");
    tagged.set_class_id(preset);
    let tagged_id = tagged.id();

    store.add(order)?;
    store.add(tagged)?;
    assert_eq!(store.save_changes()?.tagged, 1);

    store.get::<Order>(id)?.add_item("sku-1");
    let second = store.save_changes()?;
    assert_eq!(second.tagged, 0);
    assert_eq!(second.written, 1);

    assert_eq!(store.get::<Order>(id)?.class_id(), Some(harness.order_class_id));
    assert_eq!(store.get::<Order>(tagged_id)?.class_id(), Some(preset));

    let (mut reader, _) = harness.session();
    assert_eq!(
        reader.get::<Order>(id)?.class_id(),
        Some(harness.order_class_id)
    );
    Ok(())
}

#[test]
fn stored_nil_class_id_is_treated_as_unset() -> anyhow::Result<()> {
    use eskit_infra::in_memory::RowChange;

    let harness = Harness::new();
    let order = Order::create("ada");
    let id = order.id();
    let mut data = serde_json::to_value(&order)?;
    data["class_id"] = serde_json::json!(Uuid::nil());
    harness.database.apply(vec![RowChange::Insert {
        key: EntityTypeKey::of::<Order>(),
        id,
        data,
    }])?;

    let (mut store, buffer) = harness.session();
    let loaded = store.get::<Order>(id)?;
    assert_eq!(loaded.class_id(), None);
    loaded.add_item("sku-1");

    let summary = store.save_changes()?;
    assert_eq!(summary.tagged, 1);
    assert_eq!(store.get::<Order>(id)?.class_id(), Some(harness.order_class_id));

    let expected = harness.order_class_id.to_string();
    assert_eq!(
        buffer.events()[0].metadata_value(metadata::AGGREGATE_CLASS_ID),
        Some(expected.as_str())
    );

    let (mut reader, _) = harness.session();
    assert_eq!(
        reader.get::<Order>(id)?.class_id(),
        Some(harness.order_class_id)
    );
    Ok(())
}

#[test]
fn persist_conflict_pushes_nothing_and_commits_nothing() -> anyhow::Result<()> {
    let harness = Harness::new();
    let seeded = Order::create("ada");
    let id = seeded.id();
    harness.seed_orders(vec![seeded]);

    let (mut winner, _) = harness.session();
    let (mut loser, loser_buffer) = harness.session();
    winner.get::<Order>(id)?.add_item("winner");
    loser.get::<Order>(id)?.add_item("loser");
    let fresh = Order::create("grace");
    let fresh_id = fresh.id();
    loser.add(fresh)?;

    winner.save_changes()?;
    let err = loser.save_changes().unwrap_err();

    assert!(err.is_persistence());
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::VersionConflict { .. })
    ));
    assert!(loser_buffer.is_empty());
    assert!(loser.get::<Order>(id)?.is_changed());
    assert_eq!(loser.get::<Order>(fresh_id)?.uncommitted_events().len(), 1);
    assert!(
        loser
            .tracked_aggregates()
            .iter()
            .all(|root| root.is_changed())
    );

    let (mut reader, _) = harness.session();
    assert_eq!(reader.get::<Order>(id)?.items, vec!["winner"]);
    assert!(reader.find::<Order>(fresh_id)?.is_none());
    Ok(())
}

#[test]
fn duplicate_insert_aborts_before_the_commit_phase() -> anyhow::Result<()> {
    let harness = Harness::new();
    let existing = Order::create("ada");
    let duplicate = existing.clone();
    harness.seed_orders(vec![existing]);

    let (mut store, buffer) = harness.session();
    store.add(duplicate)?;
    store.add(Order::create("grace"))?;

    let err = store.save_changes().unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(buffer.len(), 0);
    assert_eq!(
        store
            .tracked_aggregates()
            .iter()
            .filter(|root| root.is_changed())
            .count(),
        2
    );
    Ok(())
}

#[test]
fn unregistered_type_with_class_id_aborts_before_persisting() -> anyhow::Result<()> {
    use eskit_domain::entity_type::EntityTypeRegistry;
    use eskit_domain::eventing::{DefaultEventMessageFactory, InMemoryPublishEventBuffer};
    use eskit_infra::{CrudAggregateStore, InMemoryCrudRepository};
    use std::sync::Arc;

    let harness = Harness::new();
    let buffer = Arc::new(InMemoryPublishEventBuffer::new());
    let mut store = CrudAggregateStore::new(
        InMemoryCrudRepository::new(harness.database.clone()),
        Arc::new(EntityTypeRegistry::builder().build()),
        Arc::new(DefaultEventMessageFactory::new()),
        buffer.clone(),
    );

    store.add(Order::create("ada"))?;
    let err = store.save_changes().unwrap_err();

    assert!(matches!(
        err.domain(),
        Some(DomainError::UnknownType { .. })
    ));
    assert_eq!(harness.database.row_count(EntityTypeKey::of::<Order>())?, 0);
    assert!(buffer.is_empty());
    Ok(())
}

#[test]
fn removed_aggregate_still_publishes_its_pending_events() -> anyhow::Result<()> {
    let harness = Harness::new();
    let seeded = Order::create("ada");
    let id = seeded.id();
    harness.seed_orders(vec![seeded]);

    let (mut store, buffer) = harness.session();
    store.get::<Order>(id)?.add_item("last");
    store.remove::<Order>(id)?;
    assert!(store.find::<Order>(id)?.is_none());

    let summary = store.save_changes()?;
    assert_eq!(summary.written, 1);
    assert_eq!(summary.published, 1);
    assert_eq!(buffer.events()[0].event_type(), "OrderEvent.ItemAdded");
    assert_eq!(harness.database.row_count(EntityTypeKey::of::<Order>())?, 0);
    assert!(store.tracked_aggregates().iter().all(|root| !root.is_changed()));
    Ok(())
}
